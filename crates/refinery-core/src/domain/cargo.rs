//! Cargo / berth model (§3 "Cargo", "Berth").

use crate::time::Instant;
use serde::{Deserialize, Serialize};

/// Cargo size class. Solver-provided cargos may use `Unknown` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CargoType {
    Vlcc,
    Suez,
    Afra,
    Pana,
    Handy,
    Unknown,
}

impl CargoType {
    pub const ENABLED_ORDER: [CargoType; 5] = [
        CargoType::Vlcc,
        CargoType::Suez,
        CargoType::Afra,
        CargoType::Pana,
        CargoType::Handy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CargoType::Vlcc => "VLCC",
            CargoType::Suez => "SUEZ",
            CargoType::Afra => "AFRA",
            CargoType::Pana => "PANA",
            CargoType::Handy => "HANDY",
            CargoType::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for CargoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One completed (or in-progress) tank fill belonging to a cargo (§3 "tank_fills").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankFill {
    pub tank_id: u32,
    pub start: Instant,
    pub end: Instant,
    pub volume: f64,
}

/// A marine cargo (§3 "Cargo").
#[derive(Debug, Clone)]
pub struct Cargo {
    pub vessel_name: String,
    pub cargo_type: CargoType,
    pub crude_type: String,
    pub berth: u8,
    pub volume_total: f64,
    pub arrival_at: Instant,
    pub fill_start_at: Instant,
    pub discharge_start_at: Option<Instant>,
    pub discharge_end_at: Option<Instant>,
    pub remaining_volume: f64,
    pub tank_fills: Vec<TankFill>,
    pub next_fill_available_at: Option<Instant>,
    /// Solver mode: whether this cargo has been released onto its berth yet.
    pub dispatched: bool,
    pub arrival_logged: bool,
}

impl Cargo {
    pub fn new(
        vessel_name: String,
        cargo_type: CargoType,
        crude_type: String,
        berth: u8,
        volume_total: f64,
        arrival_at: Instant,
        fill_start_at: Instant,
        dispatched: bool,
    ) -> Self {
        Self {
            vessel_name,
            cargo_type,
            crude_type,
            berth,
            volume_total,
            arrival_at,
            fill_start_at,
            discharge_start_at: None,
            discharge_end_at: None,
            remaining_volume: volume_total,
            tank_fills: Vec::new(),
            next_fill_available_at: None,
            dispatched,
            arrival_logged: false,
        }
    }

    /// Barrels discharged into tanks so far.
    pub fn discharged_volume(&self) -> f64 {
        self.tank_fills.iter().map(|f| f.volume).sum()
    }

    /// A cargo is "done" once less than ~1 bbl remains (§4.5 completion rule).
    pub fn is_fully_discharged(&self) -> bool {
        self.remaining_volume <= 1.0
    }

    /// Tanks touched, expressed as a fraction (e.g. 1.5 tanks for a partial second fill).
    pub fn tanks_filled_fraction(&self, usable_per_tank: f64) -> f64 {
        if usable_per_tank <= 0.0 {
            return 0.0;
        }
        self.discharged_volume() / usable_per_tank
    }
}

/// A berth slot (§3 "Berth").
#[derive(Debug, Clone)]
pub struct Berth {
    pub id: u8,
    pub free_at: Instant,
    pub current_cargo: Option<String>,
}

impl Berth {
    pub fn new(id: u8, free_at: Instant) -> Self {
        Self {
            id,
            free_at,
            current_cargo: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current_cargo.is_none()
    }
}
