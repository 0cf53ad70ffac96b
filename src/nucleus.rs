use crate::mineral::MineralType;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A growing mineral crystal spawned by the nucleation solver
///
/// Owned exclusively by the grid state's nucleus list. Mutated in place each
/// step; never removed (dissolution is handled elsewhere).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Nucleus {
    pub id: usize,
    /// Continuous position in metres within the domain
    pub position: DVec3,
    pub radius_m: f64,
    pub mineral: MineralType,
    pub growth_rate_m_per_s: f64,
    pub birth_time_s: f64,
}

/// A static candidate location where nucleation may occur
///
/// Supplied by the domain-setup layer; read-only to the solvers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NucleationSite {
    pub position: DVec3,
    pub mineral: MineralType,
    pub initial_radius_m: f64,
    pub activation_energy_j_per_mol: f64,
    pub critical_supersaturation: f64,
    pub active: bool,
}

impl NucleationSite {
    pub fn new(
        position: DVec3,
        mineral: MineralType,
        initial_radius_m: f64,
        activation_energy_j_per_mol: f64,
        critical_supersaturation: f64,
    ) -> Self {
        Self {
            position,
            mineral,
            initial_radius_m,
            activation_energy_j_per_mol,
            critical_supersaturation,
            active: true,
        }
    }
}
