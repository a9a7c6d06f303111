//! Canonical event log (§4.7, §6).
//!
//! This is the simulator's primary output stream, not a debugging side
//! channel — distinct from the `tracing` spans the engine also emits for
//! operator observability (see `engine::mod`).

use crate::domain::tank::TankState;
use crate::time::{format_instant, Instant};
use serde::{Deserialize, Serialize};

/// Severity of an event record (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl EventLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Info => "Info",
            EventLevel::Success => "Success",
            EventLevel::Warning => "Warning",
            EventLevel::Danger => "Danger",
        }
    }
}

/// Canonical event names (§6). Five of these get a `_<cycle_index>` suffix
/// when a tank's current cycle is known at emission time (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SimStart,
    Config,
    FeedStart,
    Arrival,
    FillStart,
    FillStartFirst,
    FillEnd,
    FillFinalEnd,
    SettlingStart,
    SettlingEnd,
    Ready,
    TankEmpty,
    EmptyStart,
    FeedChangeover,
    TankGapStart,
    DischargeComplete,
    ProcessingHalt,
    ProcessingResume,
    DailyStatus,
    DailyEnd,
    /// Defensive path (§4.8, §10.6): feeding was attempted on an empty tank.
    FeedError,
    /// Logged once when the feeding controller first fails to find a READY
    /// tank, immediately preceding the eventual `PROCESSING_HALT` (§10.6).
    NoFeedAvailable,
}

impl EventKind {
    fn base_name(&self) -> &'static str {
        match self {
            EventKind::SimStart => "SIM_START",
            EventKind::Config => "CONFIG",
            EventKind::FeedStart => "FEED_START",
            EventKind::Arrival => "ARRIVAL",
            EventKind::FillStart => "FILL_START",
            EventKind::FillStartFirst => "FILL_START_FIRST",
            EventKind::FillEnd => "FILL_END",
            EventKind::FillFinalEnd => "FILL_FINAL_END",
            EventKind::SettlingStart => "SETTLING_START",
            EventKind::SettlingEnd => "SETTLING_END",
            EventKind::Ready => "READY",
            EventKind::TankEmpty => "TANK_EMPTY",
            EventKind::EmptyStart => "EMPTY_START",
            EventKind::FeedChangeover => "FEED_CHANGEOVER",
            EventKind::TankGapStart => "TANK_GAP_START",
            EventKind::DischargeComplete => "DISCHARGE_COMPLETE",
            EventKind::ProcessingHalt => "PROCESSING_HALT",
            EventKind::ProcessingResume => "PROCESSING_RESUME",
            EventKind::DailyStatus => "DAILY_STATUS",
            EventKind::DailyEnd => "DAILY_END",
            EventKind::FeedError => "FEED_ERROR",
            EventKind::NoFeedAvailable => "NO_FEED_AVAILABLE",
        }
    }

    /// Whether this event name is cycle-suffixed when a cycle index is known (§4.7).
    fn is_cycle_suffixed(&self) -> bool {
        matches!(
            self,
            EventKind::FillStartFirst
                | EventKind::FillFinalEnd
                | EventKind::SettlingStart
                | EventKind::SettlingEnd
                | EventKind::Ready
        )
    }
}

/// A per-tank state label at an event's instant (§4.7's "per-tank state snapshot").
#[derive(Debug, Clone, PartialEq)]
pub struct TankStatusEntry {
    pub tank_id: u32,
    pub state: TankState,
}

/// One canonical event record (§4.7).
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub timestamp: Instant,
    pub level: EventLevel,
    pub kind: EventKind,
    /// The tank's cycle index at emission time, recorded so that the rendered
    /// name is a pure function of the record (§9 design note).
    pub cycle_index: Option<u32>,
    pub tank: Option<u32>,
    pub cargo: Option<String>,
    pub message: String,
    pub tank_status: Vec<TankStatusEntry>,
}

impl EventRecord {
    /// The event name as it appears in the external contract, with the
    /// cycle-index suffix applied when applicable (§4.7).
    pub fn rendered_name(&self) -> String {
        match (self.kind.is_cycle_suffixed(), self.cycle_index) {
            (true, Some(cycle)) => format!("{}_{cycle}", self.kind.base_name()),
            _ => self.kind.base_name().to_string(),
        }
    }

    pub fn timestamp_str(&self) -> String {
        format_instant(self.timestamp)
    }

    pub fn tank_label(&self) -> String {
        self.tank.map(|t| format!("Tank {t}")).unwrap_or_default()
    }
}

/// Consumes event records as they're emitted: a minimal trait with swappable
/// implementations for production vs. tests.
pub trait EventSink {
    fn record(&mut self, event: EventRecord);
}

/// Collects every event in order; the default sink for a production run,
/// since the event log is this simulator's primary output (§4.7/§6).
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: Vec<EventRecord>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn into_events(self) -> Vec<EventRecord> {
        self.events
    }
}

impl EventSink for CollectingEventSink {
    fn record(&mut self, event: EventRecord) {
        self.events.push(event);
    }
}

/// Discards every event. Useful for throughput-sensitive callers (e.g. a
/// parameter sweep) that only need the final reports, not the full log.
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    #[inline]
    fn record(&mut self, _event: EventRecord) {}
}
