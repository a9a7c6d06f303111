//! Run configuration (§3 "Config", §6 "Input").
//!
//! `SimConfig` is a plain, serializable struct validated once via
//! [`SimConfig::validate`] before a run starts (§4.8: "Bad config values:
//! reject before construction; never mid-run").

use crate::domain::cargo::CargoType;
use crate::domain::solver::SolverPlanConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::time::Instant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Immutable configuration for one simulation run (§3 "Config").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed processing (refinery intake) rate, barrels per day.
    pub processing_rate: f64,
    /// Number of tanks, identified 1..=num_tanks.
    pub num_tanks: u32,
    /// Simulated start of the run.
    pub start: Instant,
    /// Length of the run in days (may be fractional; partial last days are expected).
    pub horizon_days: f64,

    /// Usable (gross minus heel) capacity of every tank.
    pub usable_per_tank: f64,
    /// Dead bottom volume, part of the unusable heel.
    pub dead_bottom: f64,
    /// Buffer volume; half of it is unusable heel (§3 glossary).
    pub buffer_volume: f64,
    /// Initial usable volume per tank id; tanks omitted default to `usable_per_tank`.
    #[serde(default)]
    pub initial_tank_volumes: HashMap<u32, f64>,

    /// Settling duration in days; converted to hours internally.
    pub settling_days: f64,
    /// Lab-testing duration in hours; 0 skips the LAB state entirely.
    pub lab_hours: f64,
    /// Discharge (offloading) rate, barrels per hour.
    pub discharge_rate: f64,

    /// Step size / snapshot cadence, in minutes.
    #[serde(default = "default_snapshot_interval_minutes")]
    pub snapshot_interval_minutes: u32,

    /// Minimum number of READY tanks required before admitting a non-first cargo.
    pub min_ready_tanks: u32,
    /// Inclusive lower bound on READY-tank count to admit the first cargo.
    pub first_cargo_min_ready: u32,
    /// Inclusive upper bound on READY-tank count to admit the first cargo.
    pub first_cargo_max_ready: u32,

    /// Preparation delay, in hours, after a tank empties before it may refill.
    #[serde(default)]
    pub tank_gap_hours: f64,
    /// Preparation delay, in hours, after a partial fill before another slice starts.
    #[serde(default)]
    pub tank_fill_gap_hours: f64,
    /// Minimum random inter-arrival gap at a berth, in hours.
    #[serde(default)]
    pub berth_gap_hours_min: f64,
    /// Maximum random inter-arrival gap at a berth, in hours.
    #[serde(default)]
    pub berth_gap_hours_max: f64,
    /// Delay, in days, between a cargo's arrival and the earliest it may start discharging.
    #[serde(default)]
    pub pre_discharge_days: f64,

    /// Nominal cargo volume by type; a type with volume 0 is disabled.
    pub cargo_defs: HashMap<CargoType, f64>,

    /// Optional pre-computed solver plan (§4.6). When present, standard-mode
    /// scheduling and target selection are bypassed in favor of the plan.
    #[serde(default)]
    pub solver_plan: Option<SolverPlanConfig>,

    /// Fixed seed for the injectable random source (§9). Two runs with the
    /// same config and seed produce an identical schedule.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_snapshot_interval_minutes() -> u32 {
    30
}

impl SimConfig {
    /// The implicit unusable heel per tank: `dead_bottom + buffer_volume / 2`.
    pub fn unusable_per_tank(&self) -> f64 {
        self.dead_bottom + self.buffer_volume / 2.0
    }

    /// Settling duration in hours.
    pub fn settling_hours(&self) -> f64 {
        self.settling_days * 24.0
    }

    /// Pre-discharge delay in hours.
    pub fn pre_discharge_delay_hours(&self) -> f64 {
        self.pre_discharge_days * 24.0
    }

    /// Fixed hourly processing rate derived from `processing_rate` (bbl/day).
    pub fn rate_per_hour(&self) -> f64 {
        self.processing_rate / 24.0
    }

    /// Initial usable volume of a tank, defaulting to `usable_per_tank`.
    pub fn initial_volume(&self, tank_id: u32) -> f64 {
        self.initial_tank_volumes
            .get(&tank_id)
            .copied()
            .unwrap_or(self.usable_per_tank)
    }

    /// Validate all invariants from §6/§7 before a run is constructed.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.num_tanks == 0 {
            return Err(ConfigError::NonPositiveTankCount(self.num_tanks as i64));
        }
        if self.processing_rate <= 0.0 {
            return Err(ConfigError::NonPositiveProcessingRate(self.processing_rate));
        }
        if self.discharge_rate <= 0.0 {
            return Err(ConfigError::NonPositiveDischargeRate(self.discharge_rate));
        }
        if self.horizon_days <= 0.0 {
            return Err(ConfigError::NonPositiveHorizon(self.horizon_days));
        }
        if self.usable_per_tank <= 0.0 {
            return Err(ConfigError::NonPositiveUsableVolume(self.usable_per_tank));
        }
        if self.berth_gap_hours_max < self.berth_gap_hours_min {
            return Err(ConfigError::InvalidBerthGapRange {
                min: self.berth_gap_hours_min,
                max: self.berth_gap_hours_max,
            });
        }
        if self.snapshot_interval_minutes == 0 {
            return Err(ConfigError::NonPositiveSnapshotInterval(
                self.snapshot_interval_minutes as i64,
            ));
        }
        if self.first_cargo_min_ready > self.first_cargo_max_ready {
            return Err(ConfigError::InvalidFirstCargoReadyRange {
                min: self.first_cargo_min_ready,
                max: self.first_cargo_max_ready,
            });
        }
        for (&tank_id, &volume) in &self.initial_tank_volumes {
            if volume > self.usable_per_tank {
                return Err(ConfigError::InitialVolumeExceedsUsable {
                    tank: tank_id,
                    volume,
                    usable: self.usable_per_tank,
                });
            }
        }
        if let Some(plan) = &self.solver_plan {
            plan.validate(self.num_tanks)?;
        }
        Ok(())
    }

    /// A deterministic seed derived from the config, used when `random_seed`
    /// is not explicitly set (§9: "Default seed derived from config hash").
    pub fn effective_seed(&self) -> u64 {
        self.random_seed.unwrap_or_else(|| {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            self.num_tanks.hash(&mut hasher);
            (self.processing_rate as i64).hash(&mut hasher);
            (self.discharge_rate as i64).hash(&mut hasher);
            (self.horizon_days as i64).hash(&mut hasher);
            self.start.timestamp().hash(&mut hasher);
            hasher.finish()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn base_config() -> SimConfig {
        SimConfig {
            processing_rate: 60_000.0,
            num_tanks: 2,
            start: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            horizon_days: 10.0,
            usable_per_tank: 600_000.0,
            dead_bottom: 5_000.0,
            buffer_volume: 10_000.0,
            initial_tank_volumes: HashMap::new(),
            settling_days: 1.0,
            lab_hours: 12.0,
            discharge_rate: 20_000.0,
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
            solver_plan: None,
            random_seed: Some(1),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_zero_tanks() {
        let mut cfg = base_config();
        cfg.num_tanks = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositiveTankCount(0))
        );
    }

    #[test]
    fn rejects_inverted_berth_gap_range() {
        let mut cfg = base_config();
        cfg.berth_gap_hours_min = 10.0;
        cfg.berth_gap_hours_max = 5.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidBerthGapRange { .. })
        ));
    }

    #[test]
    fn unusable_per_tank_is_dead_bottom_plus_half_buffer() {
        let cfg = base_config();
        assert!((cfg.unusable_per_tank() - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn effective_seed_is_stable_for_same_config() {
        let cfg = base_config();
        assert_eq!(cfg.effective_seed(), cfg.effective_seed());
    }
}
