//! The three summary output streams (§6: daily summary, cargo report, tank
//! snapshots). The event log itself lives in [`crate::events`].

use crate::domain::cargo::CargoType;
use crate::domain::tank::TankState;
use crate::engine::tables::Tables;
use crate::time::{format_instant, hours_between, Instant};
use serde::Serialize;

/// One row per simulated day (§6.2).
#[derive(Debug, Clone, Serialize)]
pub struct DailySummaryRow {
    pub date: String,
    pub opening_gross_stock: f64,
    pub opening_certified_stock: f64,
    pub opening_uncertified_stock: f64,
    pub processing_volume: f64,
    pub closing_gross_stock: f64,
    pub ready_tank_count: u32,
    pub empty_tank_count: u32,
    /// `"Tank 1: READY, Tank 2: FEEDING, ..."`.
    pub per_tank_state: String,
}

/// One row per cargo that discharged (§6.3).
#[derive(Debug, Clone, Serialize)]
pub struct CargoReportRow {
    pub vessel_name: String,
    pub cargo_type: CargoType,
    pub berth: u8,
    pub arrival_at: String,
    pub discharge_start_at: String,
    pub discharge_end_at: String,
    /// `None` for the first cargo to discharge at its berth.
    pub berth_gap_hours: Option<f64>,
    pub total_discharge_hours: f64,
    pub total_volume: f64,
    pub tanks_filled: f64,
    /// `"Tank1: dd/MM/yyyy HH:mm-dd/MM/yyyy HH:mm (V bbl); Tank2: ..."`.
    pub tank_fill_detail: String,
}

/// One row per snapshot instant (§6.4).
#[derive(Debug, Clone, Serialize)]
pub struct TankSnapshotRow {
    pub timestamp: String,
    /// `"Tank 1: 450000.0, Tank 2: 600000.0, ..."`.
    pub per_tank_volume: String,
    pub per_tank_state: String,
}

pub fn format_per_tank_state(tables: &Tables) -> String {
    tables
        .tank_order
        .iter()
        .map(|&id| format!("Tank {id}: {}", tables.tank(id).state))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_per_tank_volume(tables: &Tables, unusable_per_tank: f64) -> String {
    tables
        .tank_order
        .iter()
        .map(|&id| format!("Tank {id}: {:.1}", tables.tank(id).volume + unusable_per_tank))
        .collect::<Vec<_>>()
        .join(", ")
}

fn tank_fill_detail(cargo: &crate::domain::cargo::Cargo) -> String {
    cargo
        .tank_fills
        .iter()
        .map(|f| {
            format!(
                "Tank{}: {}-{} ({:.1} bbl)",
                f.tank_id,
                format_instant(f.start),
                format_instant(f.end),
                f.volume
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build the cargo report (§6.3), including the berth-gap computation
/// (§10.6): sort each berth's discharged cargos by arrival, diff against the
/// previous cargo's `discharge_end_at` at that berth.
pub fn build_cargo_report(tables: &Tables, usable_per_tank: f64) -> Vec<CargoReportRow> {
    let mut by_berth: std::collections::HashMap<u8, Vec<&crate::domain::cargo::Cargo>> =
        std::collections::HashMap::new();

    for name in &tables.cargo_order {
        let cargo = &tables.cargos[name];
        if cargo.discharge_end_at.is_none() {
            continue;
        }
        by_berth.entry(cargo.berth).or_default().push(cargo);
    }

    let mut gap_hours: std::collections::HashMap<String, Option<f64>> =
        std::collections::HashMap::new();

    for cargos in by_berth.values_mut() {
        cargos.sort_by_key(|c| c.arrival_at);
        let mut prev_end: Option<Instant> = None;
        for cargo in cargos {
            let gap = prev_end.map(|end| hours_between(end, cargo.arrival_at));
            gap_hours.insert(cargo.vessel_name.clone(), gap);
            prev_end = cargo.discharge_end_at;
        }
    }

    tables
        .cargo_order
        .iter()
        .filter_map(|name| {
            let cargo = &tables.cargos[name];
            let discharge_start_at = cargo.discharge_start_at?;
            let discharge_end_at = cargo.discharge_end_at?;
            Some(CargoReportRow {
                vessel_name: cargo.vessel_name.clone(),
                cargo_type: cargo.cargo_type,
                berth: cargo.berth,
                arrival_at: format_instant(cargo.arrival_at),
                discharge_start_at: format_instant(discharge_start_at),
                discharge_end_at: format_instant(discharge_end_at),
                berth_gap_hours: gap_hours.get(name).copied().flatten(),
                total_discharge_hours: hours_between(discharge_start_at, discharge_end_at),
                total_volume: cargo.discharged_volume(),
                tanks_filled: cargo.tanks_filled_fraction(usable_per_tank),
                tank_fill_detail: tank_fill_detail(cargo),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cargo::{Cargo, CargoType, TankFill};
    use chrono::{TimeZone, Utc};

    fn dt(h: u32) -> Instant {
        Utc.with_ymd_and_hms(2026, 1, 1, h, 0, 0).unwrap()
    }

    fn make_tables() -> Tables {
        Tables::new(vec![1], &[1], dt(0))
    }

    #[test]
    fn first_cargo_at_berth_has_no_gap() {
        let mut tables = make_tables();
        let mut cargo = Cargo::new(
            "V1".into(),
            CargoType::Vlcc,
            "A".into(),
            1,
            100_000.0,
            dt(0),
            dt(0),
            true,
        );
        cargo.tank_fills.push(TankFill {
            tank_id: 1,
            start: dt(0),
            end: dt(5),
            volume: 100_000.0,
        });
        cargo.remaining_volume = 0.0;
        cargo.discharge_start_at = Some(dt(0));
        cargo.discharge_end_at = Some(dt(5));
        tables.cargo_order.push("V1".into());
        tables.cargos.insert("V1".into(), cargo);

        let rows = build_cargo_report(&tables, 600_000.0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].berth_gap_hours, None);
    }

    #[test]
    fn second_cargo_at_berth_gets_gap_from_prior_discharge_end() {
        let mut tables = make_tables();
        for (name, arrival, start, end) in [
            ("V1", dt(0), dt(0), dt(5)),
            ("V2", dt(10), dt(10), dt(15)),
        ] {
            let mut cargo = Cargo::new(
                name.into(),
                CargoType::Handy,
                "A".into(),
                1,
                50_000.0,
                arrival,
                arrival,
                true,
            );
            cargo.discharge_start_at = Some(start);
            cargo.discharge_end_at = Some(end);
            cargo.remaining_volume = 0.0;
            tables.cargo_order.push(name.into());
            tables.cargos.insert(name.into(), cargo);
        }

        let rows = build_cargo_report(&tables, 600_000.0);
        let v2 = rows.iter().find(|r| r.vessel_name == "V2").unwrap();
        assert_eq!(v2.berth_gap_hours, Some(5.0));
    }
}
