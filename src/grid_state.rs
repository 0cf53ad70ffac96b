use crate::field::ScalarField3;
use crate::mineral::MineralType;
use crate::nucleus::Nucleus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One simulation time snapshot: every field the solvers read or write,
/// on a shared `(nx, ny, nz)` voxel grid
///
/// Constructed once per run, advanced in place by repeated solver calls.
/// `Clone` performs the deep copy (including species/mineral maps and the
/// nucleus list) used for result-history snapshots.
///
/// Species and mineral fields are keyed through ordered maps so "the first
/// tracked species" is well-defined; insertion order never matters.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GridState {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,

    pub temperature: ScalarField3,
    pub pressure: ScalarField3,
    pub porosity: ScalarField3,
    pub permeability: ScalarField3,

    pub velocity_x: ScalarField3,
    pub velocity_y: ScalarField3,
    pub velocity_z: ScalarField3,

    pub body_force_x: ScalarField3,
    pub body_force_y: ScalarField3,
    pub body_force_z: ScalarField3,

    pub liquid_saturation: ScalarField3,
    pub gas_saturation: ScalarField3,
    pub vapor_saturation: ScalarField3,

    /// Per-species concentration in mol/L, keyed by species name
    pub concentrations: BTreeMap<String, ScalarField3>,
    /// Per-mineral volume fraction, keyed by mineral type
    pub minerals: BTreeMap<MineralType, ScalarField3>,

    pub nuclei: Vec<Nucleus>,
}

/// Initial uniform values for a fresh grid state
pub struct GridStateParams {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub porosity: f64,
    pub permeability_m2: f64,
}

impl GridState {
    pub fn new(params: GridStateParams) -> GridState {
        let GridStateParams {
            nx,
            ny,
            nz,
            temperature_k,
            pressure_pa,
            porosity,
            permeability_m2,
        } = params;

        GridState {
            nx,
            ny,
            nz,
            temperature: ScalarField3::filled(nx, ny, nz, temperature_k),
            pressure: ScalarField3::filled(nx, ny, nz, pressure_pa),
            porosity: ScalarField3::filled(nx, ny, nz, porosity),
            permeability: ScalarField3::filled(nx, ny, nz, permeability_m2),
            velocity_x: ScalarField3::zeros(nx, ny, nz),
            velocity_y: ScalarField3::zeros(nx, ny, nz),
            velocity_z: ScalarField3::zeros(nx, ny, nz),
            body_force_x: ScalarField3::zeros(nx, ny, nz),
            body_force_y: ScalarField3::zeros(nx, ny, nz),
            body_force_z: ScalarField3::zeros(nx, ny, nz),
            liquid_saturation: ScalarField3::filled(nx, ny, nz, 1.0),
            gas_saturation: ScalarField3::zeros(nx, ny, nz),
            vapor_saturation: ScalarField3::zeros(nx, ny, nz),
            concentrations: BTreeMap::new(),
            minerals: BTreeMap::new(),
            nuclei: Vec::new(),
        }
    }

    /// Register a chemical species with a uniform initial concentration
    pub fn add_species(&mut self, name: &str, concentration_mol_l: f64) {
        self.concentrations.insert(
            name.to_string(),
            ScalarField3::filled(self.nx, self.ny, self.nz, concentration_mol_l),
        );
    }

    /// Register a mineral volume-fraction field, initially zero
    pub fn add_mineral(&mut self, mineral: MineralType) {
        self.minerals
            .insert(mineral, ScalarField3::zeros(self.nx, self.ny, self.nz));
    }

    /// The first tracked species field, if any species is registered
    pub fn first_species(&self) -> Option<(&String, &ScalarField3)> {
        self.concentrations.iter().next()
    }
}
