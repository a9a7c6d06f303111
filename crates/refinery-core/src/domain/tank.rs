//! Tank state machine (§3 "Tank", §4.2).

use crate::time::Instant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tank's lifecycle state (§4.2 transition table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TankState {
    Ready,
    Feeding,
    Filling,
    Filled,
    Settling,
    Lab,
    Suspended,
    Empty,
}

impl TankState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TankState::Ready => "READY",
            TankState::Feeding => "FEEDING",
            TankState::Filling => "FILLING",
            TankState::Filled => "FILLED",
            TankState::Settling => "SETTLING",
            TankState::Lab => "LAB",
            TankState::Suspended => "SUSPENDED",
            TankState::Empty => "EMPTY",
        }
    }
}

impl std::fmt::Display for TankState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Barrels of each crude contributed to a tank's current fill cycle (§3 "mix").
pub type CrudeMix = HashMap<String, f64>;

/// A single tank's full record (§3 "Tank").
#[derive(Debug, Clone)]
pub struct Tank {
    pub id: u32,
    pub state: TankState,
    /// Usable-only volume (gross minus heel); `0 <= volume <= usable_per_tank`.
    pub volume: f64,
    /// Increments each time the tank completes a READY promotion. Starts at 1.
    pub cycle_index: u32,

    pub settle_end_at: Option<Instant>,
    pub lab_start_at: Option<Instant>,
    pub ready_at: Option<Instant>,
    pub ready_for_fill_at: Option<Instant>,

    pub feed_start_volume: f64,
    pub feed_start_time: Option<Instant>,

    pub mix: CrudeMix,
    pub mix_pct: CrudeMix,

    /// Whether the tank's current cycle has already logged its first fill
    /// (`FILL_START_FIRST` vs `FILL_START`, §3/§4.5).
    pub first_fill_done: bool,
}

impl Tank {
    pub fn new(id: u32, initial_volume: f64, usable_per_tank: f64) -> Self {
        let volume = initial_volume.clamp(0.0, usable_per_tank);
        let state = if volume <= 0.0 {
            TankState::Empty
        } else {
            TankState::Ready
        };
        Self {
            id,
            state,
            volume,
            cycle_index: 1,
            settle_end_at: None,
            lab_start_at: None,
            ready_at: None,
            ready_for_fill_at: None,
            feed_start_volume: 0.0,
            feed_start_time: None,
            mix: HashMap::new(),
            mix_pct: HashMap::new(),
            first_fill_done: false,
        }
    }

    pub fn is_eligible_for_fill(&self, now: Instant) -> bool {
        matches!(self.state, TankState::Empty | TankState::Suspended)
            && self.ready_for_fill_at.map(|t| now >= t).unwrap_or(true)
    }

    /// Add `volume` barrels of `crude` to this tank's running mix (during FILLING).
    pub fn add_to_mix(&mut self, crude: &str, volume: f64) {
        *self.mix.entry(crude.to_string()).or_insert(0.0) += volume;
    }

    /// Freeze `mix_pct` from the current `mix` (called at `FILL_FINAL_END`).
    pub fn freeze_mix_pct(&mut self) {
        let total: f64 = self.mix.values().sum();
        self.mix_pct.clear();
        if total > 0.0 {
            for (crude, vol) in &self.mix {
                self.mix_pct.insert(crude.clone(), vol / total * 100.0);
            }
        }
    }

    /// Reset the running mix at the start of a new fill cycle.
    pub fn reset_mix(&mut self) {
        self.mix.clear();
        self.mix_pct.clear();
    }

    /// Human-readable mix summary, e.g. `"A: 50.0%, B: 50.0%"`, or `"Unknown"`.
    pub fn mix_summary(&self) -> String {
        if self.mix_pct.is_empty() {
            return "Unknown".to_string();
        }
        let mut parts: Vec<String> = self
            .mix_pct
            .iter()
            .map(|(crude, pct)| format!("{crude}: {pct:.1}%"))
            .collect();
        parts.sort();
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// One row per `TankState` (§4.2): only EMPTY and SUSPENDED are ever
    /// eligible for a fill; every other state must refuse regardless of
    /// `ready_for_fill_at`.
    #[rstest]
    #[case(TankState::Ready, false)]
    #[case(TankState::Feeding, false)]
    #[case(TankState::Filling, false)]
    #[case(TankState::Filled, false)]
    #[case(TankState::Settling, false)]
    #[case(TankState::Lab, false)]
    #[case(TankState::Suspended, true)]
    #[case(TankState::Empty, true)]
    fn fill_eligibility_matches_state(#[case] state: TankState, #[case] expected: bool) {
        use chrono::{TimeZone, Utc};
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut t = Tank::new(1, 0.0, 600_000.0);
        t.state = state;
        assert_eq!(t.is_eligible_for_fill(now), expected, "state {state:?}");
    }

    #[test]
    fn new_tank_with_volume_is_ready() {
        let t = Tank::new(1, 600_000.0, 600_000.0);
        assert_eq!(t.state, TankState::Ready);
        assert_eq!(t.cycle_index, 1);
    }

    #[test]
    fn new_tank_with_zero_volume_is_empty() {
        let t = Tank::new(1, 0.0, 600_000.0);
        assert_eq!(t.state, TankState::Empty);
    }

    #[test]
    fn eligible_for_fill_respects_ready_for_fill_at() {
        use chrono::{TimeZone, Utc};
        let mut t = Tank::new(1, 0.0, 600_000.0);
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let later = now + chrono::Duration::hours(5);
        t.ready_for_fill_at = Some(later);
        assert!(!t.is_eligible_for_fill(now));
        assert!(t.is_eligible_for_fill(later));
    }

    #[test]
    fn freeze_mix_pct_normalizes_to_100() {
        let mut t = Tank::new(1, 0.0, 600_000.0);
        t.add_to_mix("A", 300_000.0);
        t.add_to_mix("B", 300_000.0);
        t.freeze_mix_pct();
        assert!((t.mix_pct["A"] - 50.0).abs() < 1e-9);
        assert!((t.mix_pct["B"] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn mix_summary_unknown_when_empty() {
        let t = Tank::new(1, 0.0, 600_000.0);
        assert_eq!(t.mix_summary(), "Unknown");
    }
}
