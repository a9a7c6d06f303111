//! Append-only tank state history with point-in-time lookup (§4.7, §9:
//! "keep the state history as an append-only vector and binary-search;
//! do not rescan from start").

use crate::domain::tank::TankState;
use crate::events::TankStatusEntry;
use crate::time::Instant;

#[derive(Debug, Clone, Copy)]
struct StateChange {
    instant: Instant,
    tank_id: u32,
    state: TankState,
}

/// Records every tank state transition in the order it occurred. Point-in-time
/// queries binary-search the timestamp boundary, then scan backward for the
/// tank in question — the last entry at or before `ts` wins, and ties break
/// by insertion order (§4.7).
#[derive(Debug, Default)]
pub struct StateHistory {
    changes: Vec<StateChange>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition. Callers must record changes in non-decreasing
    /// timestamp order (the step driver guarantees this).
    pub fn record(&mut self, instant: Instant, tank_id: u32, state: TankState) {
        debug_assert!(
            self.changes.last().map(|c| c.instant <= instant).unwrap_or(true),
            "state history must be appended in non-decreasing timestamp order"
        );
        self.changes.push(StateChange {
            instant,
            tank_id,
            state,
        });
    }

    /// The state of `tank_id` as of `ts`, or `None` if it has no recorded
    /// transition at or before `ts`.
    pub fn state_at(&self, tank_id: u32, ts: Instant) -> Option<TankState> {
        let cutoff = self.changes.partition_point(|c| c.instant <= ts);
        self.changes[..cutoff]
            .iter()
            .rev()
            .find(|c| c.tank_id == tank_id)
            .map(|c| c.state)
    }

    /// A per-tank state snapshot at `ts`, for every id in `tank_ids`, in the
    /// order given. Tanks with no history yet are omitted.
    pub fn snapshot(&self, tank_ids: &[u32], ts: Instant) -> Vec<TankStatusEntry> {
        tank_ids
            .iter()
            .filter_map(|&id| {
                self.state_at(id, ts).map(|state| TankStatusEntry {
                    tank_id: id,
                    state,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn dt(h: u32) -> Instant {
        Utc.with_ymd_and_hms(2026, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn returns_last_state_at_or_before_ts() {
        let mut h = StateHistory::new();
        h.record(dt(0), 1, TankState::Ready);
        h.record(dt(2), 1, TankState::Feeding);
        h.record(dt(4), 1, TankState::Empty);

        assert_eq!(h.state_at(1, dt(1)), Some(TankState::Ready));
        assert_eq!(h.state_at(1, dt(2)), Some(TankState::Feeding));
        assert_eq!(h.state_at(1, dt(3)), Some(TankState::Feeding));
        assert_eq!(h.state_at(1, dt(10)), Some(TankState::Empty));
    }

    #[test]
    fn returns_none_before_first_record() {
        let mut h = StateHistory::new();
        h.record(dt(5), 1, TankState::Ready);
        assert_eq!(h.state_at(1, dt(0)), None);
    }

    #[test]
    fn tied_timestamp_later_insertion_wins() {
        let mut h = StateHistory::new();
        h.record(dt(4), 7, TankState::Settling);
        h.record(dt(4), 7, TankState::Lab);
        assert_eq!(h.state_at(7, dt(4)), Some(TankState::Lab));
    }

    #[test]
    fn distinguishes_tanks() {
        let mut h = StateHistory::new();
        h.record(dt(0), 1, TankState::Ready);
        h.record(dt(0), 2, TankState::Empty);
        assert_eq!(h.state_at(1, dt(0)), Some(TankState::Ready));
        assert_eq!(h.state_at(2, dt(0)), Some(TankState::Empty));
    }

    #[test]
    fn snapshot_preserves_requested_order() {
        let mut h = StateHistory::new();
        h.record(dt(0), 1, TankState::Ready);
        h.record(dt(0), 2, TankState::Empty);
        let snap = h.snapshot(&[2, 1], dt(1));
        assert_eq!(snap[0].tank_id, 2);
        assert_eq!(snap[1].tank_id, 1);
    }
}
