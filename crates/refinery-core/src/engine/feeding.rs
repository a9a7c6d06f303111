//! Feeding controller (§4.3): single active feeding tank, fixed hourly rate,
//! sequential handover at empty, halt/resume on starvation.

use super::Engine;
use crate::domain::tank::TankState;
use crate::events::{EventKind, EventLevel};
use crate::time::{add_hours, hours_between, Instant};

impl Engine {
    pub(crate) fn ensure_feeding(&mut self, now: Instant) {
        if let Some(active) = self.tables.active_feeding_tank {
            if self.tables.tank(active).state == TankState::Feeding {
                return;
            }
        }

        let start_from = self.tables.active_feeding_tank.unwrap_or(0);
        if let Some(next) = self.find_next_ready_sequential(start_from) {
            let was_halted = self.tables.halted;
            self.tables.active_feeding_tank = Some(next);
            self.change_state(next, TankState::Feeding, now);
            let capped = self.tables.tank(next).volume.min(self.config.usable_per_tank);
            {
                let tank = self.tables.tank_mut(next);
                tank.volume = capped;
                tank.feed_start_volume = capped;
                tank.feed_start_time = Some(now);
            }
            if was_halted {
                self.log(
                    now,
                    EventLevel::Success,
                    EventKind::ProcessingResume,
                    None,
                    None,
                    "Processing resumed after halt".into(),
                );
                self.tables.halted = false;
            }
            self.log(
                now,
                EventLevel::Success,
                EventKind::FeedStart,
                Some(next),
                None,
                format!("Tank {next} now starts feeding with {capped:.0} bbl available"),
            );
        } else if !self.tables.halted {
            let ready = self.tables.ready_count();
            let feeding = self
                .tables
                .tank_order
                .iter()
                .filter(|&&id| self.tables.tank(id).state == TankState::Feeding)
                .count();
            self.log(
                now,
                EventLevel::Danger,
                EventKind::NoFeedAvailable,
                None,
                None,
                format!("No tanks available for feeding. READY: {ready}, FEEDING: {feeding}"),
            );
            self.tables.halted = true;
        }
    }

    /// Consume inventory over `[now, step_end]` at a fixed hourly ceiling,
    /// handing over to the next READY tank mid-step if the active tank
    /// empties first (§4.3).
    pub(crate) fn consume_step(&mut self, now: Instant, step_end: Instant) -> f64 {
        let mut processed = 0.0;

        let Some(active) = self.tables.active_feeding_tank else {
            return processed;
        };
        if self.tables.tank(active).state != TankState::Feeding {
            return processed;
        }

        let rate = self.config.rate_per_hour();
        if rate <= 0.0 {
            return processed;
        }

        let available = self.tables.tank(active).volume;
        if available <= 0.0 {
            // Unreachable in a correct run, but the source guards it (§4.8).
            self.change_state(active, TankState::Empty, now);
            let ready_for_fill_at = add_hours(now, self.config.tank_gap_hours);
            self.tables.tank_mut(active).ready_for_fill_at = Some(ready_for_fill_at);
            self.log(
                now,
                EventLevel::Warning,
                EventKind::FeedError,
                Some(active),
                None,
                format!("Tank {active} marked as FEEDING but has no usable volume"),
            );
            self.tables.active_feeding_tank = None;
            return processed;
        }

        let time_to_empty_h = available / rate;
        let hour_len_h = hours_between(now, step_end);

        if time_to_empty_h > hour_len_h {
            let take = rate * hour_len_h;
            self.tables.tank_mut(active).volume = (self.tables.tank(active).volume - take).max(0.0);
            processed += take;
            self.tables.add_daily_consumption(active, take);
            return processed;
        }

        let t_empty = add_hours(now, time_to_empty_h);
        let total_draw = self.tables.tank(active).feed_start_volume;
        processed += available;
        self.tables.tank_mut(active).volume = 0.0;
        self.tables.add_daily_consumption(active, available);
        self.tables.tank_mut(active).first_fill_done = false;

        self.change_state(active, TankState::Empty, t_empty);
        let ready_for_fill_at = add_hours(t_empty, self.config.tank_gap_hours);
        self.tables.tank_mut(active).ready_for_fill_at = Some(ready_for_fill_at);

        self.log(
            t_empty,
            EventLevel::Warning,
            EventKind::TankEmpty,
            Some(active),
            None,
            format!("Tank {active} emptied. Total draw {total_draw:.0} bbl."),
        );
        if self.config.tank_gap_hours > 0.0 {
            self.log(
                t_empty,
                EventLevel::Info,
                EventKind::EmptyStart,
                Some(active),
                None,
                format!(
                    "Tank {active} emptied. Preparation time of {:.0}h required. Ready for fill at {}",
                    self.config.tank_gap_hours,
                    crate::time::format_instant(ready_for_fill_at)
                ),
            );
        }

        self.tables.active_feeding_tank = None;

        if let Some(next) = self.find_next_ready_sequential(active) {
            let was_halted = self.tables.halted;
            self.tables.active_feeding_tank = Some(next);
            let capped = self.tables.tank(next).volume.min(self.config.usable_per_tank);
            {
                let tank = self.tables.tank_mut(next);
                tank.volume = capped;
                tank.feed_start_volume = capped;
                tank.feed_start_time = Some(t_empty);
            }
            if was_halted {
                self.log(
                    t_empty,
                    EventLevel::Success,
                    EventKind::ProcessingResume,
                    None,
                    None,
                    "Processing resumed after halt".into(),
                );
                self.tables.halted = false;
            }
            self.change_state(next, TankState::Feeding, t_empty);
            self.log(
                t_empty,
                EventLevel::Success,
                EventKind::FeedChangeover,
                Some(next),
                None,
                format!("Tank {next} starts feeding with {capped:.0} bbl"),
            );

            let remaining_hour = hour_len_h - time_to_empty_h;
            if remaining_hour > 0.0 {
                let additional = (rate * remaining_hour).min(self.tables.tank(next).volume);
                if additional > 0.0 {
                    self.tables.tank_mut(next).volume -= additional;
                    processed += additional;
                    self.tables.add_daily_consumption(next, additional);
                }
            }
        } else if !self.tables.halted {
            let ready = self.tables.ready_count();
            self.log(
                t_empty,
                EventLevel::Danger,
                EventKind::ProcessingHalt,
                None,
                None,
                format!("Processing stopped - no READY tanks available (READY: {ready})"),
            );
            self.tables.halted = true;
        }

        processed
    }
}
