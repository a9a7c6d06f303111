//! End-to-end scenario: a solver-provided plan pins cargo-slice targets and
//! produces a blended crude mix on the tanks it fills (§4.6, §8).

use chrono::{TimeZone, Utc};
use refinery_core::domain::solver::{SolverAssignmentDef, SolverCargoDef, SolverPlanConfig};
use refinery_core::{CargoType, CollectingEventSink, Engine, SimConfig, StdRandomSource};
use std::collections::HashMap;

fn solver_config() -> SimConfig {
    let mut assignments = HashMap::new();
    assignments.insert(
        "PLAN-V001".to_string(),
        vec![
            SolverAssignmentDef {
                tank_id: 1,
                volume: 300_000.0,
                crude_name: "CrudeA".into(),
            },
            SolverAssignmentDef {
                tank_id: 1,
                volume: 300_000.0,
                crude_name: "CrudeB".into(),
            },
        ],
    );
    let plan = SolverPlanConfig {
        cargo_list: vec![SolverCargoDef {
            vessel_name: "PLAN-V001".into(),
            cargo_type: CargoType::Unknown,
            crude_type: "Blend".into(),
            berth: 1,
            volume_total: 600_000.0,
        }],
        assignments,
    };

    SimConfig {
        processing_rate: 200_000.0,
        num_tanks: 2,
        start: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        horizon_days: 15.0,
        usable_per_tank: 600_000.0,
        dead_bottom: 0.0,
        buffer_volume: 0.0,
        initial_tank_volumes: HashMap::from([(1, 0.0), (2, 600_000.0)]),
        settling_days: 1.0,
        lab_hours: 0.0,
        discharge_rate: 60_000.0,
        snapshot_interval_minutes: 30,
        min_ready_tanks: 1,
        first_cargo_min_ready: 0,
        first_cargo_max_ready: 2,
        tank_gap_hours: 0.0,
        tank_fill_gap_hours: 0.0,
        berth_gap_hours_min: 0.0,
        berth_gap_hours_max: 0.0,
        pre_discharge_days: 0.0,
        cargo_defs: HashMap::new(),
        solver_plan: Some(plan),
        random_seed: Some(9),
    }
}

#[test]
fn solver_plan_blends_two_crudes_into_one_tank() {
    let config = solver_config();
    config.validate().expect("solver plan config should be valid");
    let rng = Box::new(StdRandomSource::from_seed(config.effective_seed()));
    let engine = Engine::new(config, rng, Box::new(CollectingEventSink::new()));
    let output = engine.run().unwrap();

    let fill_final_end = output
        .events
        .iter()
        .find(|e| e.rendered_name().starts_with("FILL_FINAL_END"));
    assert!(fill_final_end.is_some(), "expected tank 1 to complete its blended fill");

    let cargo_row = output
        .cargo_report
        .iter()
        .find(|r| r.vessel_name == "PLAN-V001")
        .expect("PLAN-V001 should have discharged");
    assert!((cargo_row.total_volume - 600_000.0).abs() < 1.0);
}
