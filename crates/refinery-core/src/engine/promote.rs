//! Tank promotion timers: SETTLING → LAB → READY, or SETTLING → READY
//! directly when no lab testing is configured (§4.2).

use super::Engine;
use crate::domain::tank::TankState;
use crate::events::{EventKind, EventLevel};
use crate::time::{format_instant, one_second_after, Instant};

impl Engine {
    /// Advance any tank whose settling/lab timer has elapsed. Returns the
    /// number of tanks that became READY this call.
    pub(crate) fn promote_tanks(&mut self, now: Instant) -> u32 {
        let mut newly_ready = 0;

        for tank_id in self.tables.tank_order.clone() {
            match self.tables.tank(tank_id).state {
                TankState::Settling => {
                    let Some(settle_end) = self.tables.tank(tank_id).settle_end_at else {
                        continue;
                    };
                    if settle_end > now {
                        continue;
                    }

                    let lab_due = self
                        .tables
                        .tank(tank_id)
                        .lab_start_at
                        .map(|t| t <= now)
                        .unwrap_or(false);

                    if self.config.lab_hours > 0.0 && lab_due {
                        self.tables.tank_mut(tank_id).settle_end_at = None;
                        let lab_end_str = self
                            .tables
                            .tank(tank_id)
                            .ready_at
                            .map(format_instant)
                            .unwrap_or_else(|| "Unknown".into());
                        self.log(
                            settle_end,
                            EventLevel::Info,
                            EventKind::SettlingEnd,
                            Some(tank_id),
                            None,
                            format!(
                                "Settling ends. Lab testing starts for {:.0} hours (ready at {lab_end_str})",
                                self.config.lab_hours
                            ),
                        );
                        self.change_state(tank_id, TankState::Lab, one_second_after(settle_end));
                    } else if self.config.lab_hours <= 0.0 {
                        let Some(ready_time) = self.tables.tank(tank_id).ready_at else {
                            continue;
                        };
                        if ready_time > now {
                            continue;
                        }
                        self.tables.tank_mut(tank_id).volume = self.config.usable_per_tank;
                        {
                            let tank = self.tables.tank_mut(tank_id);
                            tank.ready_at = None;
                            tank.settle_end_at = None;
                            tank.lab_start_at = None;
                        }
                        newly_ready += 1;

                        self.log(
                            settle_end,
                            EventLevel::Info,
                            EventKind::SettlingEnd,
                            Some(tank_id),
                            None,
                            "Settling ends".into(),
                        );
                        let mix_str = self.tables.tank(tank_id).mix_summary();
                        self.log(
                            ready_time,
                            EventLevel::Success,
                            EventKind::Ready,
                            Some(tank_id),
                            None,
                            format!("Tank {tank_id} now READY - Mix: [{mix_str}]"),
                        );
                        self.change_state(tank_id, TankState::Ready, one_second_after(ready_time));
                        self.tables.tank_mut(tank_id).cycle_index += 1;
                    }
                }
                TankState::Lab => {
                    let Some(ready_time) = self.tables.tank(tank_id).ready_at else {
                        continue;
                    };
                    if ready_time > now {
                        continue;
                    }
                    self.tables.tank_mut(tank_id).volume = self.config.usable_per_tank;
                    {
                        let tank = self.tables.tank_mut(tank_id);
                        tank.ready_at = None;
                        tank.lab_start_at = None;
                        tank.settle_end_at = None;
                    }
                    newly_ready += 1;

                    let mix_str = self.tables.tank(tank_id).mix_summary();
                    self.log(
                        ready_time,
                        EventLevel::Success,
                        EventKind::Ready,
                        Some(tank_id),
                        None,
                        format!("Tank {tank_id} now READY - Mix: [{mix_str}]"),
                    );
                    self.change_state(tank_id, TankState::Ready, one_second_after(ready_time));
                    self.tables.tank_mut(tank_id).cycle_index += 1;
                }
                _ => {}
            }
        }

        newly_ready
    }
}
