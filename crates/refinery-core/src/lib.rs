pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod reports;
pub mod rng;
pub mod time;

pub use config::SimConfig;
pub use domain::{Berth, Cargo, CargoType, CrudeMix, Tank, TankFill, TankState};
pub use engine::{Engine, SimulationOutput};
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult};
pub use events::{CollectingEventSink, EventKind, EventLevel, EventRecord, EventSink, NullEventSink};
pub use reports::{CargoReportRow, DailySummaryRow, TankSnapshotRow};
pub use rng::{FixedRandomSource, RandomSource, StdRandomSource};
pub use time::Instant;

#[cfg(feature = "testing")]
pub mod testing;
