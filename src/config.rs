// JSON configuration for a simulation run
//
// The core is a library; this module gives the surrounding layers one typed
// document covering grid geometry, solver parameter bundles, boundary
// conditions, tracked species, and nucleation sites. Errors are reported as
// strings at this boundary; the solvers themselves never validate.

use crate::boundary::BoundaryCondition;
use crate::grid_state::{GridState, GridStateParams};
use crate::heat_transfer::HeatParams;
use crate::mineral::MineralType;
use crate::multiphase_flow::FlowParams;
use crate::nucleation::NucleationParams;
use crate::nucleus::NucleationSite;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub porosity: f64,
    pub permeability_m2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub name: String,
    pub concentration_mol_l: f64,
}

/// Which solvers the orchestrator should run each step
///
/// Data for the caller; the core only parses and exposes these flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverToggles {
    pub heat: bool,
    pub flow: bool,
    pub nucleation: bool,
}

impl Default for SolverToggles {
    fn default() -> Self {
        Self {
            heat: true,
            flow: true,
            nucleation: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub grid: GridConfig,
    #[serde(default)]
    pub heat: HeatParams,
    #[serde(default)]
    pub flow: FlowParams,
    #[serde(default)]
    pub nucleation: NucleationParams,
    #[serde(default)]
    pub boundary_conditions: Vec<BoundaryCondition>,
    #[serde(default)]
    pub species: Vec<SpeciesConfig>,
    #[serde(default)]
    pub minerals: Vec<MineralType>,
    #[serde(default)]
    pub sites: Vec<NucleationSite>,
    #[serde(default)]
    pub enabled: SolverToggles,
}

impl SimulationConfig {
    /// Parse a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<SimulationConfig, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse config JSON: {}", e))
    }

    /// Load a configuration from a JSON file on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, String> {
        let json_str = fs::read_to_string(path.as_ref()).map_err(|e| {
            format!("Failed to read file {}: {}", path.as_ref().display(), e)
        })?;
        Self::from_json_str(&json_str)
    }

    /// Build the initial grid state this configuration describes, with its
    /// species and mineral fields registered
    pub fn initial_state(&self) -> GridState {
        let mut state = GridState::new(GridStateParams {
            nx: self.grid.nx,
            ny: self.grid.ny,
            nz: self.grid.nz,
            temperature_k: self.grid.temperature_k,
            pressure_pa: self.grid.pressure_pa,
            porosity: self.grid.porosity,
            permeability_m2: self.grid.permeability_m2,
        });
        for species in &self.species {
            state.add_species(&species.name, species.concentration_mol_l);
        }
        for mineral in &self.minerals {
            state.add_mineral(*mineral);
        }
        state
    }
}
