//! Central ID-keyed tables (§9 design note: "central tables plus integer ids,
//! not cyclic ownership between Tank/Cargo/Berth/ActiveFill").

use crate::domain::cargo::{Berth, Cargo, CargoType};
use crate::domain::tank::Tank;
use crate::time::Instant;
use std::collections::HashMap;

/// One in-flight fill, keyed by the cargo's vessel name in [`Tables::active_fills`]
/// (§3 "at most one entry in the fill controller's active-fill table per vessel_name").
#[derive(Debug, Clone, Copy)]
pub struct ActiveFill {
    pub tank_id: u32,
    pub start_at: Instant,
    pub end_at: Instant,
    pub volume: f64,
}

/// A planned (tank, volume, crude) slice from a solver plan, with its mutable
/// runtime progress (§3 "Solver assignment", §4.6).
#[derive(Debug, Clone)]
pub struct Assignment {
    pub tank_id: u32,
    pub planned: f64,
    pub crude_name: String,
    pub filled_so_far: f64,
}

impl Assignment {
    pub fn remaining(&self) -> f64 {
        self.planned - self.filled_so_far
    }
}

/// All mutable simulation state, addressed by integer/string id rather than
/// object references, so tanks, cargos, berths and fills can be updated
/// independently without a cyclic ownership graph.
#[derive(Debug)]
pub struct Tables {
    pub tanks: HashMap<u32, Tank>,
    pub tank_order: Vec<u32>,
    pub cargos: HashMap<String, Cargo>,
    /// Arrival/creation order, used wherever output needs a stable list order.
    pub cargo_order: Vec<String>,
    pub berths: HashMap<u8, Berth>,
    pub active_fills: HashMap<String, ActiveFill>,
    /// Solver mode only; keyed by vessel_name.
    pub assignments: HashMap<String, Vec<Assignment>>,

    pub active_feeding_tank: Option<u32>,
    pub halted: bool,

    /// Per-type running counter for standard-mode vessel-name assignment.
    pub cargo_type_counters: HashMap<CargoType, u32>,
    /// Tanks that started the run EMPTY, in tank-id order. Consumed (removed)
    /// as the fill controller prefers them first (§4.5 "initial-fill ordering
    /// prefers the set of initially empty tanks first") — order-preserving
    /// removal is why this is a `Vec`, not a set.
    pub initially_empty: Vec<u32>,
    /// Per-tank barrels consumed so far in the current simulated day, reset at
    /// each day boundary; purely derived, used only for the DAILY_END log
    /// message breakdown (§10.6).
    pub daily_consumption: HashMap<u32, f64>,
}

impl Tables {
    pub fn new(tank_order: Vec<u32>, berth_ids: &[u8], start: Instant) -> Self {
        let berths = berth_ids
            .iter()
            .map(|&id| (id, Berth::new(id, start)))
            .collect();
        Self {
            tanks: HashMap::new(),
            tank_order,
            cargos: HashMap::new(),
            cargo_order: Vec::new(),
            berths,
            active_fills: HashMap::new(),
            assignments: HashMap::new(),
            active_feeding_tank: None,
            halted: false,
            cargo_type_counters: HashMap::new(),
            initially_empty: Vec::new(),
            daily_consumption: HashMap::new(),
        }
    }

    pub fn tank(&self, id: u32) -> &Tank {
        self.tanks.get(&id).expect("unknown tank id")
    }

    pub fn tank_mut(&mut self, id: u32) -> &mut Tank {
        self.tanks.get_mut(&id).expect("unknown tank id")
    }

    pub fn ready_count(&self) -> u32 {
        self.tank_order
            .iter()
            .filter(|&&id| self.tank(id).state == crate::domain::tank::TankState::Ready)
            .count() as u32
    }

    pub fn empty_count(&self) -> u32 {
        self.tank_order
            .iter()
            .filter(|&&id| self.tank(id).state == crate::domain::tank::TankState::Empty)
            .count() as u32
    }

    pub fn next_vessel_name(&mut self, cargo_type: CargoType) -> String {
        let counter = self.cargo_type_counters.entry(cargo_type).or_insert(0);
        *counter += 1;
        format!("{}-V{:03}", cargo_type.as_str(), counter)
    }

    pub fn reset_daily_consumption(&mut self) {
        self.daily_consumption.clear();
    }

    pub fn add_daily_consumption(&mut self, tank_id: u32, volume: f64) {
        *self.daily_consumption.entry(tank_id).or_insert(0.0) += volume;
    }
}
