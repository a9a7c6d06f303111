//! Fill controller (§4.5): per-cargo target selection, fill-duration
//! bookkeeping, and completion into FILLED→SETTLING or SUSPENDED.

use super::tables::ActiveFill;
use super::Engine;
use crate::domain::cargo::TankFill;
use crate::domain::tank::TankState;
use crate::events::{EventKind, EventLevel};
use crate::time::{add_hours, format_instant, one_second_after, Instant};

impl Engine {
    fn tank_has_active_fill(&self, tank_id: u32) -> bool {
        self.tables.active_fills.values().any(|f| f.tank_id == tank_id)
    }

    /// Solver mode: walk the cargo's assignment list for the first actionable
    /// slice (§4.5, §4.6 "it never forces a start; it only biases selection").
    fn find_solver_target(&self, vessel_name: &str, now: Instant) -> Option<(u32, usize)> {
        let assigns = self.tables.assignments.get(vessel_name)?;
        for (idx, a) in assigns.iter().enumerate() {
            if a.remaining() <= 1.0 {
                continue;
            }
            if self.tank_has_active_fill(a.tank_id) {
                continue;
            }
            if self.tables.tank(a.tank_id).is_eligible_for_fill(now) {
                return Some((a.tank_id, idx));
            }
        }
        None
    }

    /// Standard mode: prefer the initially-empty set (order-preserving), then
    /// any other eligible tank in tank-id order (§4.5).
    fn find_standard_target(&mut self, now: Instant) -> Option<u32> {
        if let Some(pos) = self
            .tables
            .initially_empty
            .iter()
            .position(|&id| self.tables.tank(id).is_eligible_for_fill(now) && !self.tank_has_active_fill(id))
        {
            return Some(self.tables.initially_empty.remove(pos));
        }
        self.tables
            .tank_order
            .iter()
            .copied()
            .find(|&id| self.tables.tank(id).is_eligible_for_fill(now) && !self.tank_has_active_fill(id))
    }

    pub(crate) fn maybe_start_fill(&mut self, now: Instant) {
        let solver_mode = self.config.solver_plan.is_some();

        for name in self.tables.cargo_order.clone() {
            let (remaining, has_fill, dispatched, fill_start_at, next_fill_available_at, crude_type) = {
                let cargo = &self.tables.cargos[&name];
                (
                    cargo.remaining_volume,
                    self.tables.active_fills.contains_key(&name),
                    cargo.dispatched,
                    cargo.fill_start_at,
                    cargo.next_fill_available_at,
                    cargo.crude_type.clone(),
                )
            };

            if remaining <= 1.0 || has_fill {
                continue;
            }
            if solver_mode && !dispatched {
                continue;
            }
            if now < fill_start_at {
                continue;
            }
            if let Some(next_avail) = next_fill_available_at {
                if now < next_avail {
                    continue;
                }
            }

            let target = if solver_mode {
                self.find_solver_target(&name, now).map(|(t, i)| (t, Some(i)))
            } else {
                self.find_standard_target(now).map(|t| (t, None))
            };

            let Some((tank_id, assignment_idx)) = target else {
                continue;
            };

            let tank_volume = self.tables.tank(tank_id).volume;
            let room = (self.config.usable_per_tank - tank_volume).max(0.0);

            let (volume_to_fill, crude_name) = if let Some(idx) = assignment_idx {
                let a = &self.tables.assignments[&name][idx];
                (a.remaining().min(remaining).min(room), a.crude_name.clone())
            } else {
                (remaining.min(room), crude_type)
            };

            if volume_to_fill <= 0.0 {
                continue;
            }

            let rate = self.config.discharge_rate;
            let duration_h = if rate > 0.0 { volume_to_fill / rate } else { 0.0 };
            let end_at = add_hours(now, duration_h);

            self.tables.active_fills.insert(
                name.clone(),
                ActiveFill {
                    tank_id,
                    start_at: now,
                    end_at,
                    volume: volume_to_fill,
                },
            );

            if let Some(idx) = assignment_idx {
                self.tables.assignments.get_mut(&name).unwrap()[idx].filled_so_far += volume_to_fill;
            }
            self.tables.tank_mut(tank_id).add_to_mix(&crude_name, volume_to_fill);

            let first = !self.tables.tank(tank_id).first_fill_done;
            self.tables.tank_mut(tank_id).first_fill_done = true;

            {
                let cargo = self.tables.cargos.get_mut(&name).unwrap();
                if cargo.discharge_start_at.is_none() {
                    cargo.discharge_start_at = Some(now);
                }
            }

            self.change_state(tank_id, TankState::Filling, now);

            let (kind, message) = if first {
                (
                    EventKind::FillStartFirst,
                    format!("Tank {tank_id} starts FIRST fill from {name}: {volume_to_fill:.0} bbl"),
                )
            } else {
                (
                    EventKind::FillStart,
                    format!("Tank {tank_id} starts fill from {name}: {volume_to_fill:.0} bbl"),
                )
            };
            self.log(now, EventLevel::Info, kind, Some(tank_id), Some(name.clone()), message);
        }
    }

    pub(crate) fn maybe_finish_fill(&mut self, now: Instant) {
        let due: Vec<String> = self
            .tables
            .active_fills
            .iter()
            .filter(|(_, f)| f.end_at <= now)
            .map(|(name, _)| name.clone())
            .collect();

        for name in due {
            let fill = self.tables.active_fills.remove(&name).unwrap();
            let tank_id = fill.tank_id;
            let end_at = fill.end_at;
            let volume = fill.volume;

            let new_volume = (self.tables.tank(tank_id).volume + volume).min(self.config.usable_per_tank);
            self.tables.tank_mut(tank_id).volume = new_volume;

            {
                let cargo = self.tables.cargos.get_mut(&name).unwrap();
                cargo.remaining_volume = (cargo.remaining_volume - volume).max(0.0);
                cargo.tank_fills.push(TankFill {
                    tank_id,
                    start: fill.start_at,
                    end: end_at,
                    volume,
                });
            }

            let total_gross_capacity = self.config.usable_per_tank + self.config.unusable_per_tank();
            let gross = new_volume + self.config.unusable_per_tank();
            let is_full = gross >= total_gross_capacity - 100.0;
            let cargo_done = self.tables.cargos[&name].is_fully_discharged();

            if is_full {
                self.tables.tank_mut(tank_id).freeze_mix_pct();
                let settle_end = add_hours(end_at, self.config.settling_hours());
                let ready_at = if self.config.lab_hours > 0.0 {
                    add_hours(settle_end, self.config.lab_hours)
                } else {
                    settle_end
                };
                {
                    let tank = self.tables.tank_mut(tank_id);
                    tank.settle_end_at = Some(settle_end);
                    tank.lab_start_at = if self.config.lab_hours > 0.0 { Some(settle_end) } else { None };
                    tank.ready_at = Some(ready_at);
                }

                let mix_str = self.tables.tank(tank_id).mix_summary();
                self.log(
                    end_at,
                    EventLevel::Success,
                    EventKind::FillFinalEnd,
                    Some(tank_id),
                    Some(name.clone()),
                    format!(
                        "Tank {tank_id} FILLED ({new_volume:.0} bbl). Mix: [{mix_str}]. Settling until {}",
                        format_instant(settle_end)
                    ),
                );
                self.change_state(tank_id, TankState::Filled, end_at);

                self.log(
                    end_at,
                    EventLevel::Info,
                    EventKind::SettlingStart,
                    Some(tank_id),
                    None,
                    format!("Tank {tank_id} begins settling"),
                );
                self.change_state(tank_id, TankState::Settling, one_second_after(end_at));
            } else {
                let ready_for_fill_at = add_hours(end_at, self.config.tank_fill_gap_hours);
                self.tables.tank_mut(tank_id).ready_for_fill_at = Some(ready_for_fill_at);

                self.log(
                    end_at,
                    EventLevel::Info,
                    EventKind::FillEnd,
                    Some(tank_id),
                    Some(name.clone()),
                    format!("Tank {tank_id} partial fill complete ({new_volume:.0} bbl)"),
                );
                self.change_state(tank_id, TankState::Suspended, end_at);

                if self.config.tank_fill_gap_hours > 0.0 {
                    self.log(
                        end_at,
                        EventLevel::Info,
                        EventKind::TankGapStart,
                        Some(tank_id),
                        None,
                        format!(
                            "Tank {tank_id} requires {:.0}h before next fill. Ready at {}",
                            self.config.tank_fill_gap_hours,
                            format_instant(ready_for_fill_at)
                        ),
                    );
                }

                self.tables.cargos.get_mut(&name).unwrap().next_fill_available_at =
                    Some(ready_for_fill_at);
            }

            if cargo_done {
                let berth_id = self.tables.cargos[&name].berth;
                self.tables.cargos.get_mut(&name).unwrap().discharge_end_at = Some(end_at);
                if let Some(berth) = self.tables.berths.get_mut(&berth_id) {
                    berth.free_at = end_at;
                    berth.current_cargo = None;
                }
                self.log(
                    end_at,
                    EventLevel::Success,
                    EventKind::DischargeComplete,
                    None,
                    Some(name.clone()),
                    format!("{name} discharge complete at Berth {berth_id}"),
                );
                self.schedule_cargos(end_at);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::domain::cargo::CargoType;
    use crate::events::{CollectingEventSink, NullEventSink};
    use crate::rng::FixedRandomSource;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn dt(h: u32) -> Instant {
        Utc.with_ymd_and_hms(2026, 1, 1, h, 0, 0).unwrap()
    }

    fn base_config() -> SimConfig {
        let mut cargo_defs = HashMap::new();
        cargo_defs.insert(CargoType::Handy, 200_000.0);
        SimConfig {
            processing_rate: 240_000.0,
            num_tanks: 2,
            start: dt(0),
            horizon_days: 5.0,
            usable_per_tank: 600_000.0,
            dead_bottom: 0.0,
            buffer_volume: 0.0,
            initial_tank_volumes: HashMap::new(),
            settling_days: 1.0,
            lab_hours: 0.0,
            discharge_rate: 50_000.0,
            snapshot_interval_minutes: 30,
            min_ready_tanks: 1,
            first_cargo_min_ready: 0,
            first_cargo_max_ready: 2,
            tank_gap_hours: 0.0,
            tank_fill_gap_hours: 0.0,
            berth_gap_hours_min: 0.0,
            berth_gap_hours_max: 0.0,
            pre_discharge_days: 0.0,
            cargo_defs,
            solver_plan: None,
            random_seed: Some(7),
        }
    }

    #[test]
    fn full_fill_transitions_to_settling() {
        let mut cfg = base_config();
        cfg.initial_tank_volumes.insert(1, 600_000.0);
        cfg.initial_tank_volumes.insert(2, 0.0);
        let rng = Box::new(FixedRandomSource::new(vec![0.0], vec![0]));
        let mut engine = super::super::Engine::new(cfg, rng, Box::new(NullEventSink));

        engine.tables.cargos.insert(
            "V1".into(),
            crate::domain::cargo::Cargo::new(
                "V1".into(),
                CargoType::Handy,
                "CrudeA".into(),
                1,
                600_000.0,
                dt(0),
                dt(0),
                true,
            ),
        );
        engine.tables.cargo_order.push("V1".into());

        engine.maybe_start_fill(dt(0));
        assert_eq!(engine.tables.tank(2).state, TankState::Filling);

        engine.maybe_finish_fill(dt(12));
        assert_eq!(engine.tables.cargos["V1"].remaining_volume, 0.0);
        assert_eq!(engine.tables.tank(2).state, TankState::Settling);
    }

    /// A cargo bigger than one tank's usable capacity spans two tanks. The
    /// first tank reaching full must log FILL_FINAL_END even though the cargo
    /// itself still has volume left to discharge into the second tank.
    #[test]
    fn tank_full_logs_fill_final_end_even_when_cargo_is_not_done() {
        let mut cfg = base_config();
        cfg.num_tanks = 3;
        cfg.usable_per_tank = 400_000.0;
        cfg.discharge_rate = 100_000.0;
        cfg.initial_tank_volumes.insert(1, 400_000.0);
        cfg.initial_tank_volumes.insert(2, 0.0);
        cfg.initial_tank_volumes.insert(3, 0.0);
        let rng = Box::new(FixedRandomSource::new(vec![0.0], vec![0]));
        let mut engine = super::super::Engine::new(cfg, rng, Box::new(CollectingEventSink::new()));

        engine.tables.cargos.insert(
            "V1".into(),
            crate::domain::cargo::Cargo::new(
                "V1".into(),
                CargoType::Vlcc,
                "CrudeA".into(),
                1,
                600_000.0,
                dt(0),
                dt(0),
                true,
            ),
        );
        engine.tables.cargo_order.push("V1".into());

        engine.maybe_start_fill(dt(0));
        assert_eq!(engine.tables.tank(2).state, TankState::Filling);

        engine.maybe_finish_fill(dt(4));
        assert_eq!(engine.tables.tank(2).state, TankState::Settling);
        assert!(
            !engine.tables.cargos["V1"].is_fully_discharged(),
            "cargo still has volume left for the second tank"
        );

        let tank_2_event = engine
            .events
            .iter()
            .find(|e| e.tank == Some(2) && e.cargo.as_deref() == Some("V1"))
            .expect("expected a fill-completion event for tank 2");
        assert_eq!(tank_2_event.kind, EventKind::FillFinalEnd);
    }
}
