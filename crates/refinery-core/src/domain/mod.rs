pub mod cargo;
pub mod solver;
pub mod tank;

pub use cargo::{Berth, Cargo, CargoType, TankFill};
pub use tank::{CrudeMix, Tank, TankState};
