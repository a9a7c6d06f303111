//! Solver plan adapter (§3 "Solver assignment", §4.6).
//!
//! The plan is a static, external, per-cargo list of (tank, volume, crude)
//! assignments. The engine never invents one; it only consumes it.

use crate::domain::cargo::CargoType;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One cargo pre-loaded by the solver (config-time shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverCargoDef {
    pub vessel_name: String,
    #[serde(default = "unknown_cargo_type")]
    pub cargo_type: CargoType,
    pub crude_type: String,
    pub berth: u8,
    pub volume_total: f64,
}

fn unknown_cargo_type() -> CargoType {
    CargoType::Unknown
}

/// One planned (tank, volume, crude) slice within a cargo's assignment list
/// (config-time shape; `filled_so_far` always starts at 0 and is tracked at
/// runtime in [`crate::engine::tables::Assignment`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverAssignmentDef {
    pub tank_id: u32,
    pub volume: f64,
    pub crude_name: String,
}

/// The full solver plan supplied in config (§3 "Solver assignment").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SolverPlanConfig {
    pub cargo_list: Vec<SolverCargoDef>,
    /// Keyed by vessel_name.
    pub assignments: HashMap<String, Vec<SolverAssignmentDef>>,
}

impl SolverPlanConfig {
    /// `sum(planned) <= cargo.volume_total` and every tank id is in range.
    pub fn validate(&self, num_tanks: u32) -> ConfigResult<()> {
        for cargo in &self.cargo_list {
            let Some(assigns) = self.assignments.get(&cargo.vessel_name) else {
                continue;
            };
            let planned: f64 = assigns.iter().map(|a| a.volume).sum();
            if planned > cargo.volume_total + 1.0 {
                return Err(ConfigError::SolverPlanOverAllocated {
                    vessel_name: cargo.vessel_name.clone(),
                    planned,
                    volume_total: cargo.volume_total,
                });
            }
            for a in assigns {
                if a.tank_id == 0 || a.tank_id > num_tanks {
                    return Err(ConfigError::SolverPlanUnknownTank(a.tank_id, num_tanks));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> SolverPlanConfig {
        let mut assignments = HashMap::new();
        assignments.insert(
            "V1".to_string(),
            vec![
                SolverAssignmentDef {
                    tank_id: 1,
                    volume: 300_000.0,
                    crude_name: "A".into(),
                },
                SolverAssignmentDef {
                    tank_id: 2,
                    volume: 300_000.0,
                    crude_name: "B".into(),
                },
            ],
        );
        SolverPlanConfig {
            cargo_list: vec![SolverCargoDef {
                vessel_name: "V1".into(),
                cargo_type: CargoType::Unknown,
                crude_type: "Blend".into(),
                berth: 1,
                volume_total: 600_000.0,
            }],
            assignments,
        }
    }

    #[test]
    fn valid_plan_passes() {
        assert!(plan().validate(3).is_ok());
    }

    #[test]
    fn rejects_over_allocated_plan() {
        let mut p = plan();
        p.cargo_list[0].volume_total = 500_000.0;
        assert!(matches!(
            p.validate(3),
            Err(ConfigError::SolverPlanOverAllocated { .. })
        ));
    }

    #[test]
    fn rejects_unknown_tank() {
        let p = plan();
        assert!(matches!(
            p.validate(1),
            Err(ConfigError::SolverPlanUnknownTank(2, 1))
        ));
    }
}
