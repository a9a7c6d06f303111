//! Writes the engine's four output streams (§6) to CSV files. A thin,
//! swappable writer, not a database layer.

use anyhow::{Context, Result};
use refinery_core::SimulationOutput;
use serde::Serialize;
use std::path::Path;

pub fn write_all(out_dir: &Path, output: &SimulationOutput) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    write_events(out_dir, output)?;
    write_csv(out_dir, "daily_summary.csv", &output.daily_summary)?;
    write_csv(out_dir, "cargo_report.csv", &output.cargo_report)?;
    write_csv(out_dir, "tank_snapshots.csv", &output.tank_snapshots)?;
    Ok(())
}

/// Events are rendered by hand rather than via `Serialize`: `event_name` is a
/// derived string (`rendered_name()`), and the per-tank status snapshot is
/// flattened into a single column for CSV's tabular shape.
fn write_events(out_dir: &Path, output: &SimulationOutput) -> Result<()> {
    #[derive(Serialize)]
    struct EventRow<'a> {
        timestamp: String,
        level: &'a str,
        event_name: String,
        tank: String,
        cargo: String,
        message: &'a str,
        tank_status: String,
    }

    let path = out_dir.join("events.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    for event in &output.events {
        let tank_status = event
            .tank_status
            .iter()
            .map(|e| format!("Tank {}: {}", e.tank_id, e.state))
            .collect::<Vec<_>>()
            .join(", ");

        writer.serialize(EventRow {
            timestamp: event.timestamp_str(),
            level: event.level.as_str(),
            event_name: event.rendered_name(),
            tank: event.tank_label(),
            cargo: event.cargo.clone().unwrap_or_default(),
            message: &event.message,
            tank_status,
        })?;
    }

    writer.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

fn write_csv<T: Serialize>(out_dir: &Path, filename: &str, rows: &[T]) -> Result<()> {
    let path = out_dir.join(filename);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}
