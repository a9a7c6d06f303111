//! Berth & cargo scheduler (§4.4): solver-driven fixed arrivals, or the
//! standard random-gap / ready-tank-gated policy.

use super::Engine;
use crate::domain::cargo::{Cargo, CargoType};
use crate::events::{EventKind, EventLevel};
use crate::time::{add_hours, format_instant, Instant};

impl Engine {
    pub(crate) fn schedule_cargos(&mut self, now: Instant) {
        if self.config.solver_plan.is_some() {
            self.schedule_cargos_solver(now);
        } else {
            self.schedule_cargos_standard(now);
        }
    }

    /// Solver mode: cargos are pre-loaded at init with `dispatched = false`.
    /// Release the first one whose berth is idle and past its random gap.
    fn schedule_cargos_solver(&mut self, now: Instant) {
        for name in self.tables.cargo_order.clone() {
            let (dispatched, berth_id) = {
                let cargo = &self.tables.cargos[&name];
                (cargo.dispatched, cargo.berth)
            };
            if dispatched {
                continue;
            }

            let free_at = self.tables.berths[&berth_id].free_at;
            let gap = self
                .rng
                .uniform_range(self.config.berth_gap_hours_min, self.config.berth_gap_hours_max);
            let earliest_arrival = add_hours(free_at, gap);
            let berth_idle = self.tables.berths[&berth_id].is_idle();

            if berth_idle && now >= earliest_arrival {
                let fill_start = add_hours(earliest_arrival, self.config.pre_discharge_delay_hours());
                {
                    let cargo = self.tables.cargos.get_mut(&name).unwrap();
                    cargo.dispatched = true;
                    cargo.arrival_at = earliest_arrival;
                    cargo.fill_start_at = fill_start;
                }
                self.tables.berths.get_mut(&berth_id).unwrap().current_cargo = Some(name.clone());

                let already_logged = self.tables.cargos[&name].arrival_logged;
                if !already_logged {
                    self.log(
                        earliest_arrival,
                        EventLevel::Success,
                        EventKind::Arrival,
                        None,
                        Some(name.clone()),
                        format!(
                            "BERTH {berth_id} CARGO ARRIVED. Fill starts at {}",
                            format_instant(fill_start)
                        ),
                    );
                    self.tables.cargos.get_mut(&name).unwrap().arrival_logged = true;
                }
                break;
            }
        }
    }

    /// Standard mode: random cargo type, gated on ready-tank counts (§4.4).
    fn schedule_cargos_standard(&mut self, now: Instant) {
        let berth_ids: Vec<u8> = {
            let mut ids: Vec<u8> = self.tables.berths.keys().copied().collect();
            ids.sort();
            ids
        };

        for berth_id in berth_ids {
            let (idle, free_at) = {
                let berth = &self.tables.berths[&berth_id];
                (berth.is_idle(), berth.free_at)
            };
            if !idle || free_at > now {
                continue;
            }

            let gap = self
                .rng
                .uniform_range(self.config.berth_gap_hours_min, self.config.berth_gap_hours_max);
            let ready_count = self.tables.ready_count();

            let arrival = if !self.first_cargo_scheduled {
                if ready_count < self.config.first_cargo_min_ready
                    || ready_count > self.config.first_cargo_max_ready
                {
                    continue;
                }
                self.first_cargo_scheduled = true;
                add_hours(now, gap)
            } else {
                if ready_count < self.config.min_ready_tanks {
                    continue;
                }
                match self.predict_next_tank_empty_hours() {
                    Some(hours) => {
                        let candidate = add_hours(now, hours - 18.0);
                        candidate.max(add_hours(free_at, gap))
                    }
                    None => add_hours(free_at, gap),
                }
            };

            let enabled: Vec<(CargoType, f64)> = CargoType::ENABLED_ORDER
                .iter()
                .filter_map(|&ct| {
                    self.config
                        .cargo_defs
                        .get(&ct)
                        .filter(|&&v| v > 0.0)
                        .map(|&v| (ct, v))
                })
                .collect();
            if enabled.is_empty() {
                continue;
            }

            let idx = self.rng.choose_index(enabled.len());
            let (cargo_type, volume) = enabled[idx];
            let vessel_name = self.tables.next_vessel_name(cargo_type);
            let fill_start = add_hours(arrival, self.config.pre_discharge_delay_hours());

            let cargo = Cargo::new(
                vessel_name.clone(),
                cargo_type,
                "Unknown".to_string(),
                berth_id,
                volume,
                arrival,
                fill_start,
                true,
            );
            self.tables.cargo_order.push(vessel_name.clone());
            self.tables.cargos.insert(vessel_name.clone(), cargo);
            self.tables.berths.get_mut(&berth_id).unwrap().current_cargo = Some(vessel_name.clone());

            self.log(
                arrival,
                EventLevel::Success,
                EventKind::Arrival,
                None,
                Some(vessel_name.clone()),
                format!("BERTH {berth_id}: {vessel_name} arrives. Volume: {volume:.0} bbl"),
            );
            break;
        }
    }
}
