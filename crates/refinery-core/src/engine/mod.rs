//! The simulation engine (§2, §4). Ties together the tank state machine,
//! feeding controller, berth/cargo scheduler, fill controller and solver
//! plan adapter behind a single fixed-order step driver (§4.1, §5).

pub mod fill;
pub mod promote;
pub mod scheduler;
pub mod tables;

mod feeding;

use crate::config::SimConfig;
use crate::domain::cargo::Cargo;
use crate::domain::tank::{Tank, TankState};
use crate::error::{EngineError, EngineResult};
use crate::events::{EventKind, EventLevel, EventRecord, EventSink};
use crate::history::StateHistory;
use crate::reports::{build_cargo_report, format_per_tank_state, format_per_tank_volume,
    CargoReportRow, DailySummaryRow, TankSnapshotRow};
use crate::rng::RandomSource;
use crate::time::{add_days, add_hours, format_instant, Instant};
use tables::Tables;

/// The full set of output streams the engine produces (§6).
#[derive(Debug)]
pub struct SimulationOutput {
    pub events: Vec<EventRecord>,
    pub daily_summary: Vec<DailySummaryRow>,
    pub cargo_report: Vec<CargoReportRow>,
    pub tank_snapshots: Vec<TankSnapshotRow>,
}

/// Owns the simulated clock and every mutable table; the step driver and the
/// per-concern controllers (feeding, scheduler, fill, promote — each in their
/// own file) are implemented as additional `impl Engine` blocks.
pub struct Engine {
    config: SimConfig,
    tables: Tables,
    history: StateHistory,
    rng: Box<dyn RandomSource>,
    sink: Box<dyn EventSink>,
    events: Vec<EventRecord>,
    tank_snapshots: Vec<TankSnapshotRow>,
    daily_summary: Vec<DailySummaryRow>,
    first_cargo_scheduled: bool,
}

impl Engine {
    pub fn new(config: SimConfig, rng: Box<dyn RandomSource>, sink: Box<dyn EventSink>) -> Self {
        let tank_order: Vec<u32> = (1..=config.num_tanks).collect();
        let start = config.start;
        let mut tables = Tables::new(tank_order.clone(), &[1, 2], start);

        for &id in &tank_order {
            let initial = config.initial_volume(id);
            let tank = Tank::new(id, initial, config.usable_per_tank);
            if tank.state == TankState::Empty {
                tables.initially_empty.push(id);
            }
            tables.tanks.insert(id, tank);
        }

        let mut engine = Self {
            config,
            tables,
            history: StateHistory::new(),
            rng,
            sink,
            events: Vec::new(),
            tank_snapshots: Vec::new(),
            daily_summary: Vec::new(),
            first_cargo_scheduled: false,
        };

        for id in engine.tables.tank_order.clone() {
            let state = engine.tables.tank(id).state;
            engine.history.record(start, id, state);
        }

        engine.log(
            start,
            EventLevel::Info,
            EventKind::SimStart,
            None,
            None,
            format!(
                "Simulation started with processing rate: {:.0} bbl/day",
                engine.config.processing_rate
            ),
        );

        // The lowest-numbered tank always starts feeding, even if it turns out
        // to hold no usable volume — the defensive FEED_ERROR path (§4.8)
        // exists to catch exactly that case on the first tick.
        let first = engine.tables.tank_order[0];
        engine.tables.active_feeding_tank = Some(first);
        engine.change_state(first, TankState::Feeding, start);
        let capped = engine.tables.tank(first).volume.min(engine.config.usable_per_tank);
        {
            let tank = engine.tables.tank_mut(first);
            tank.volume = capped;
            tank.feed_start_volume = capped;
            tank.feed_start_time = Some(start);
        }
        engine.log(
            start,
            EventLevel::Info,
            EventKind::FeedStart,
            Some(first),
            None,
            format!("Initial feeding starts from Tank {first}"),
        );

        engine.log(
            start,
            EventLevel::Info,
            EventKind::Config,
            None,
            None,
            format!(
                "CONFIG: usable_per_tank={}, dead_bottom={}, buffer_volume={}, unusable={}",
                engine.config.usable_per_tank,
                engine.config.dead_bottom,
                engine.config.buffer_volume,
                engine.config.unusable_per_tank()
            ),
        );

        if let Some(plan) = engine.config.solver_plan.clone() {
            engine.load_solver_plan(plan, start);
        }

        engine
    }

    fn load_solver_plan(&mut self, plan: crate::domain::solver::SolverPlanConfig, start: Instant) {
        for cargo_def in plan.cargo_list {
            let vessel_name = cargo_def.vessel_name.clone();
            let fill_start = add_hours(start, self.config.pre_discharge_delay_hours());
            let cargo = Cargo::new(
                vessel_name.clone(),
                cargo_def.cargo_type,
                cargo_def.crude_type.clone(),
                cargo_def.berth,
                cargo_def.volume_total,
                start,
                fill_start,
                false,
            );
            self.tables.cargo_order.push(vessel_name.clone());
            self.tables.cargos.insert(vessel_name.clone(), cargo);

            if let Some(assigns) = plan.assignments.get(&vessel_name) {
                let converted = assigns
                    .iter()
                    .map(|a| tables::Assignment {
                        tank_id: a.tank_id,
                        planned: a.volume,
                        crude_name: a.crude_name.clone(),
                        filled_so_far: 0.0,
                    })
                    .collect();
                self.tables.assignments.insert(vessel_name, converted);
            }
        }
    }

    /// Run to completion and produce the four output streams.
    ///
    /// Returns [`EngineError::Infeasible`] without advancing the clock if the
    /// config has no enabled cargo type — the tank farm can never be resupplied
    /// and is structurally doomed to drain to zero (§4.8, §7).
    pub fn run(mut self) -> EngineResult<SimulationOutput> {
        if self.config.solver_plan.is_none()
            && self.config.cargo_defs.values().all(|&v| v <= 0.0)
        {
            return Err(EngineError::Infeasible {
                reason: "no cargo type is enabled; the farm can never be resupplied".into(),
            });
        }

        let horizon_end = add_hours(self.config.start, self.config.horizon_days * 24.0);
        let max_days = self.config.horizon_days.ceil() as i64;

        for day_index in 0..max_days {
            let day_start = add_days(self.config.start, day_index);
            if day_start >= horizon_end {
                break;
            }
            self.simulate_day(day_start, horizon_end);
        }

        Ok(self.finish())
    }

    fn simulate_day(&mut self, day_start: Instant, horizon_end: Instant) {
        let mut day_end = add_days(day_start, 1);
        if day_end > horizon_end {
            day_end = horizon_end;
        }

        self.promote_tanks(day_start);
        self.tables.reset_daily_consumption();

        let ready_start = self.tables.ready_count();
        let feeding_tanks: Vec<u32> = self
            .tables
            .tank_order
            .iter()
            .copied()
            .filter(|&id| self.tables.tank(id).state == TankState::Feeding)
            .collect();
        let feeding_stock: f64 = feeding_tanks.iter().map(|&id| self.tables.tank(id).volume).sum();
        let ready_stock: f64 = self
            .tables
            .tank_order
            .iter()
            .filter(|&&id| self.tables.tank(id).state == TankState::Ready)
            .map(|&id| self.tables.tank(id).volume)
            .sum();
        let certified_stock = ready_stock + feeding_stock;
        let true_opening_stock: f64 = self.tables.tank_order.iter().map(|&id| self.tables.tank(id).volume).sum();

        let feeding_detail = if feeding_tanks.is_empty() {
            "None".to_string()
        } else {
            feeding_tanks
                .iter()
                .map(|&id| format!("Tank {id}: {:.0} bbl", self.tables.tank(id).volume))
                .collect::<Vec<_>>()
                .join(", ")
        };
        self.log(
            day_start,
            EventLevel::Info,
            EventKind::DailyStatus,
            None,
            None,
            format!(
                "Day starts - STOCK: READY TANKS ({ready_start}): {ready_stock:.0} bbl, FEEDING TANKS: {feeding_detail}, TOTAL: {certified_stock:.0} bbl"
            ),
        );

        self.schedule_cargos(day_start);

        let mut total_processed = 0.0;
        let mut now = day_start;
        let step = chrono::Duration::minutes(self.config.snapshot_interval_minutes as i64);
        let mut next_snapshot = day_start;

        while now < day_end {
            if now >= horizon_end {
                break;
            }
            if now >= next_snapshot {
                self.emit_snapshot(now);
                next_snapshot += step;
            }

            self.promote_tanks(now);
            self.maybe_finish_fill(now);
            self.ensure_feeding(now);
            self.maybe_start_fill(now);

            let mut step_end = (now + step).min(day_end);
            if step_end > horizon_end {
                step_end = horizon_end;
            }
            if now >= step_end {
                break;
            }

            total_processed += self.consume_step(now, step_end);
            now = step_end;

            self.maybe_finish_fill(now);
            self.promote_tanks(now);
        }

        let true_closing_stock: f64 = self.tables.tank_order.iter().map(|&id| self.tables.tank(id).volume).sum();
        let ready_end = self.tables.ready_count();
        let empty_end = self.tables.empty_count();

        let feeding_day_detail: Vec<String> = self
            .tables
            .tank_order
            .iter()
            .filter_map(|&id| {
                let v = *self.tables.daily_consumption.get(&id).unwrap_or(&0.0);
                if v > 0.0 {
                    Some(format!("Tank {id}: {v:.0} bbl"))
                } else {
                    None
                }
            })
            .collect();
        let feeding_day_str = if feeding_day_detail.is_empty() {
            "None".to_string()
        } else {
            feeding_day_detail.join(", ")
        };

        let log_timestamp = if now < day_end {
            now
        } else {
            day_end - chrono::Duration::minutes(1)
        };
        self.log(
            log_timestamp,
            EventLevel::Info,
            EventKind::DailyEnd,
            None,
            None,
            format!(
                "Day ends with {ready_end} READY tanks, FEEDING tank(s): {feeding_day_str}, Processed: {total_processed:.0} bbl"
            ),
        );

        let opening_uncertified = true_opening_stock - certified_stock;
        self.daily_summary.push(DailySummaryRow {
            date: format_instant(day_start),
            opening_gross_stock: true_opening_stock,
            opening_certified_stock: certified_stock,
            opening_uncertified_stock: opening_uncertified,
            processing_volume: total_processed,
            closing_gross_stock: true_closing_stock,
            ready_tank_count: ready_end,
            empty_tank_count: empty_end,
            per_tank_state: format_per_tank_state(&self.tables),
        });
    }

    fn emit_snapshot(&mut self, now: Instant) {
        self.tank_snapshots.push(TankSnapshotRow {
            timestamp: format_instant(now),
            per_tank_volume: format_per_tank_volume(&self.tables, self.config.unusable_per_tank()),
            per_tank_state: format_per_tank_state(&self.tables),
        });
    }

    fn finish(self) -> SimulationOutput {
        let cargo_report = build_cargo_report(&self.tables, self.config.usable_per_tank);
        SimulationOutput {
            events: self.events,
            daily_summary: self.daily_summary,
            cargo_report,
            tank_snapshots: self.tank_snapshots,
        }
    }

    /// Record an event: the per-tank snapshot reflects the state history
    /// strictly *before* this call, so callers that log-then-transition (the
    /// SETTLING_END → LAB "tied timestamp" pattern, §4.7/§9) get the pre-
    /// transition snapshot as intended.
    fn log(
        &mut self,
        ts: Instant,
        level: EventLevel,
        kind: EventKind,
        tank: Option<u32>,
        cargo: Option<String>,
        message: String,
    ) {
        let cycle_index = tank.map(|t| self.tables.tank(t).cycle_index);
        let tank_status = self.history.snapshot(&self.tables.tank_order, ts);
        let record = EventRecord {
            timestamp: ts,
            level,
            kind,
            cycle_index,
            tank,
            cargo,
            message,
            tank_status,
        };
        self.sink.record(record.clone());
        self.events.push(record);
    }

    fn change_state(&mut self, tank_id: u32, new_state: TankState, ts: Instant) {
        self.tables.tank_mut(tank_id).state = new_state;
        self.history.record(ts, tank_id, new_state);
    }

    /// Sequential round-robin search starting from `active + 1 mod N` (§4.3).
    /// `start_from == 0` is the "no active tank" case and searches from tank 1.
    fn find_next_ready_sequential(&self, start_from: u32) -> Option<u32> {
        let n = self.config.num_tanks as i64;
        let start = start_from as i64;
        for offset in 1..=n {
            let tank_id = (((start - 1 + offset).rem_euclid(n)) + 1) as u32;
            if self.tables.tank(tank_id).state == TankState::Ready {
                return Some(tank_id);
            }
        }
        None
    }

    /// Hours until the active feeding tank empties, plus a full fill-duration
    /// for every currently-READY tank queued behind it (§4.4's arrival-timing
    /// heuristic).
    fn predict_next_tank_empty_hours(&self) -> Option<f64> {
        let active = self.tables.active_feeding_tank?;
        if self.tables.tank(active).state != TankState::Feeding {
            return None;
        }
        let rate = self.config.rate_per_hour();
        if rate <= 0.0 {
            return None;
        }
        let mut total_hours = self.tables.tank(active).volume / rate;
        let ready_tanks = self
            .tables
            .tank_order
            .iter()
            .filter(|&&id| self.tables.tank(id).state == TankState::Ready)
            .count();
        total_hours += ready_tanks as f64 * (self.config.usable_per_tank / rate);
        Some(total_hours)
    }
}
