use thiserror::Error;

/// Raised while validating a [`crate::config::SimConfig`], before a run starts.
///
/// Bad config values are rejected before construction; never mid-run (see §4.8/§7
/// of the simulation spec).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("num_tanks must be > 0, got {0}")]
    NonPositiveTankCount(i64),

    #[error("processing_rate must be > 0 bbl/day, got {0}")]
    NonPositiveProcessingRate(f64),

    #[error("discharge_rate must be > 0 bbl/hr, got {0}")]
    NonPositiveDischargeRate(f64),

    #[error("horizon_days must be > 0, got {0}")]
    NonPositiveHorizon(f64),

    #[error("usable_per_tank must be > 0, got {0}")]
    NonPositiveUsableVolume(f64),

    #[error("berth_gap_hours_max ({max}) must be >= berth_gap_hours_min ({min})")]
    InvalidBerthGapRange { min: f64, max: f64 },

    #[error("snapshot_interval_minutes must be > 0, got {0}")]
    NonPositiveSnapshotInterval(i64),

    #[error("first_cargo_min_ready ({min}) must be <= first_cargo_max_ready ({max})")]
    InvalidFirstCargoReadyRange { min: u32, max: u32 },

    #[error("initial volume for tank {tank} ({volume}) exceeds usable_per_tank ({usable})")]
    InitialVolumeExceedsUsable {
        tank: u32,
        volume: f64,
        usable: f64,
    },

    #[error("solver plan assignment for cargo {vessel_name:?} plans {planned} bbl across tanks, exceeding cargo volume {volume_total}")]
    SolverPlanOverAllocated {
        vessel_name: String,
        planned: f64,
        volume_total: f64,
    },

    #[error("solver plan references tank {0}, which does not exist in a {1}-tank farm")]
    SolverPlanUnknownTank(u32, u32),
}

/// Raised during a run when the simulation becomes structurally impossible to
/// continue (e.g. no cargo types enabled while stock depletes). Distinct from
/// starvation, which is transient and recoverable (logged as `PROCESSING_HALT`
/// / `PROCESSING_RESUME`, not an error).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("simulation is infeasible: {reason}")]
    Infeasible { reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type EngineResult<T> = Result<T, EngineError>;
