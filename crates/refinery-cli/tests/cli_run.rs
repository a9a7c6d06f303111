//! End-to-end test of the compiled binary: `--demo` and `--config` both
//! produce the four CSV output streams in a fresh directory.

use refinery_core::{CargoType, SimConfig};
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_refinery-sim")
}

fn assert_reports_written(out_dir: &Path) {
    for file in ["events.csv", "daily_summary.csv", "cargo_report.csv", "tank_snapshots.csv"] {
        let path = out_dir.join(file);
        assert!(path.exists(), "expected {} to be written", path.display());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.is_empty(), "{} should not be empty", file);
    }
}

#[test]
fn run_with_demo_preset_writes_all_reports() {
    let out_dir = tempfile::tempdir().unwrap();

    let status = Command::new(bin())
        .args(["run", "--demo", "--out-dir"])
        .arg(out_dir.path())
        .status()
        .expect("failed to launch refinery-sim");

    assert!(status.success());
    assert_reports_written(out_dir.path());
}

#[test]
fn run_with_config_file_writes_all_reports() {
    let mut cargo_defs = HashMap::new();
    cargo_defs.insert(CargoType::Handy, 300_000.0);

    let config = SimConfig {
        processing_rate: 200_000.0,
        num_tanks: 3,
        start: chrono::Utc::now(),
        horizon_days: 3.0,
        usable_per_tank: 400_000.0,
        dead_bottom: 1_000.0,
        buffer_volume: 2_000.0,
        initial_tank_volumes: HashMap::new(),
        settling_days: 0.5,
        lab_hours: 0.0,
        discharge_rate: 50_000.0,
        snapshot_interval_minutes: 60,
        min_ready_tanks: 1,
        first_cargo_min_ready: 0,
        first_cargo_max_ready: 3,
        tank_gap_hours: 0.0,
        tank_fill_gap_hours: 0.0,
        berth_gap_hours_min: 1.0,
        berth_gap_hours_max: 2.0,
        pre_discharge_days: 0.0,
        cargo_defs,
        solver_plan: None,
        random_seed: Some(99),
    };

    let config_dir = tempfile::tempdir().unwrap();
    let config_path = config_dir.path().join("config.json");
    std::fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();

    let out_dir = tempfile::tempdir().unwrap();

    let status = Command::new(bin())
        .args(["run", "--config"])
        .arg(&config_path)
        .args(["--out-dir"])
        .arg(out_dir.path())
        .status()
        .expect("failed to launch refinery-sim");

    assert!(status.success());
    assert_reports_written(out_dir.path());
}

#[test]
fn run_without_config_or_demo_fails() {
    let out_dir = tempfile::tempdir().unwrap();

    let status = Command::new(bin())
        .args(["run", "--out-dir"])
        .arg(out_dir.path())
        .status()
        .expect("failed to launch refinery-sim");

    assert!(!status.success());
}
