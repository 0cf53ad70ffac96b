// Stochastic mineral nucleation and crystal growth
//
// Each call sweeps the static site list: local supersaturation is measured
// against the site mineral's solubility, a site-specific Arrhenius rate law
// turns the excess into a nucleation rate, and a uniform draw against
// rate * dt spawns a nucleus (Poisson approximation for small rate * dt).
// Existing nuclei then grow linearly, converting added crystal volume into
// a porosity decrement in the host voxel, floored so growth never fully
// seals a cell.
//
// The random generator is owned and seeded by the caller, so repeated calls
// and test runs reproduce nucleation sequences exactly.

use crate::constants::{GAS_CONSTANT_J_MOL_K, MIN_POROSITY};
use crate::field::ScalarField3;
use crate::grid_state::GridState;
use crate::mineral::get_profile;
use crate::nucleus::{NucleationSite, Nucleus};
use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NucleationParams {
    pub dx_m: f64,
    pub dy_m: f64,
    pub dz_m: f64,
    /// Attempt-frequency prefactor of the nucleation rate law, 1/s
    pub rate_prefactor_per_s: f64,
}

impl Default for NucleationParams {
    fn default() -> Self {
        Self {
            dx_m: 1.0,
            dy_m: 1.0,
            dz_m: 1.0,
            rate_prefactor_per_s: 1.0e6,
        }
    }
}

pub struct NucleationSolver {
    pub params: NucleationParams,
}

impl NucleationSolver {
    pub fn new(params: NucleationParams) -> Self {
        Self { params }
    }

    /// Nearest voxel of a continuous position: scaled truncation, clamped
    /// into the grid (out-of-range sites are never an error)
    fn voxel_of(&self, state: &GridState, position: DVec3) -> (usize, usize, usize) {
        let i = ((position.x / self.params.dx_m) as usize).min(state.nx - 1);
        let j = ((position.y / self.params.dy_m) as usize).min(state.ny - 1);
        let k = ((position.z / self.params.dz_m) as usize).min(state.nz - 1);
        (i, j, k)
    }

    /// Ratio of the first tracked species' local concentration to the
    /// mineral's equilibrium concentration; 1.0 when nothing is tracked
    fn supersaturation_at(
        &self,
        state: &GridState,
        i: usize,
        j: usize,
        k: usize,
        equilibrium_mol_l: f64,
    ) -> f64 {
        match state.first_species() {
            Some((_, field)) => field.at(i, j, k) / equilibrium_mol_l,
            None => 1.0,
        }
    }

    /// Evaluate sites and grow nuclei over one step
    ///
    /// May append to `state.nuclei`; mutates existing nuclei, the mineral
    /// volume-fraction fields, and porosity. Growth and nucleation both run
    /// every call.
    pub fn update<R: Rng>(
        &mut self,
        state: &mut GridState,
        sites: &[NucleationSite],
        time_s: f64,
        dt: f64,
        rng: &mut R,
    ) {
        for site in sites {
            if !site.active {
                continue;
            }
            let profile = match get_profile(site.mineral) {
                Some(profile) => profile,
                None => continue,
            };
            let (i, j, k) = self.voxel_of(state, site.position);
            let supersaturation =
                self.supersaturation_at(state, i, j, k, profile.equilibrium_concentration_mol_l);

            let rate = if supersaturation > site.critical_supersaturation {
                let t_k = state.temperature.at(i, j, k);
                let arrhenius =
                    (-site.activation_energy_j_per_mol / (GAS_CONSTANT_J_MOL_K * t_k)).exp();
                self.params.rate_prefactor_per_s
                    * arrhenius
                    * (supersaturation - site.critical_supersaturation)
            } else {
                0.0
            };

            if rate > 0.0 && rng.random::<f64>() < rate * dt {
                let id = state.nuclei.len();
                state.nuclei.push(Nucleus {
                    id,
                    position: site.position,
                    radius_m: site.initial_radius_m,
                    mineral: site.mineral,
                    growth_rate_m_per_s: profile.growth_rate_m_per_s,
                    birth_time_s: time_s,
                });
            }
        }

        self.grow_nuclei(state, dt);
    }

    /// Linear radius growth; added crystal volume becomes a porosity
    /// decrement in the host voxel and an increment of the mineral's
    /// volume fraction
    fn grow_nuclei(&self, state: &mut GridState, dt: f64) {
        let (nx, ny, nz) = (state.nx, state.ny, state.nz);
        let voxel_volume = self.params.dx_m * self.params.dy_m * self.params.dz_m;
        let (dx, dy, dz) = (self.params.dx_m, self.params.dy_m, self.params.dz_m);

        for nucleus in state.nuclei.iter_mut() {
            let i = ((nucleus.position.x / dx) as usize).min(nx - 1);
            let j = ((nucleus.position.y / dy) as usize).min(ny - 1);
            let k = ((nucleus.position.z / dz) as usize).min(nz - 1);

            let dr = nucleus.growth_rate_m_per_s * dt;
            // Sphere-volume derivative: dV = 4 pi r^2 dr
            let dv = 4.0 * PI * nucleus.radius_m * nucleus.radius_m * dr;
            nucleus.radius_m += dr;

            let old_porosity = state.porosity.at(i, j, k);
            let new_porosity = (old_porosity - dv / voxel_volume).max(MIN_POROSITY);
            state.porosity.set(i, j, k, new_porosity);

            let applied = old_porosity - new_porosity;
            if applied > 0.0 {
                state
                    .minerals
                    .entry(nucleus.mineral)
                    .or_insert_with(|| ScalarField3::zeros(nx, ny, nz))
                    .add(i, j, k, applied);
            }
        }
    }
}
