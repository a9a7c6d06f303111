//! A small, self-contained config used by `refinery-sim run --demo`.

use chrono::{TimeZone, Utc};
use refinery_core::{CargoType, SimConfig};
use std::collections::HashMap;

pub fn demo_config() -> SimConfig {
    let mut cargo_defs = HashMap::new();
    cargo_defs.insert(CargoType::Vlcc, 1_200_000.0);
    cargo_defs.insert(CargoType::Suez, 800_000.0);
    cargo_defs.insert(CargoType::Afra, 600_000.0);

    SimConfig {
        processing_rate: 480_000.0,
        num_tanks: 6,
        start: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        horizon_days: 30.0,
        usable_per_tank: 600_000.0,
        dead_bottom: 5_000.0,
        buffer_volume: 10_000.0,
        initial_tank_volumes: HashMap::new(),
        settling_days: 1.0,
        lab_hours: 12.0,
        discharge_rate: 40_000.0,
        snapshot_interval_minutes: 30,
        min_ready_tanks: 2,
        first_cargo_min_ready: 1,
        first_cargo_max_ready: 6,
        tank_gap_hours: 6.0,
        tank_fill_gap_hours: 2.0,
        berth_gap_hours_min: 4.0,
        berth_gap_hours_max: 12.0,
        pre_discharge_days: 0.5,
        cargo_defs,
        solver_plan: None,
        random_seed: Some(42),
    }
}
