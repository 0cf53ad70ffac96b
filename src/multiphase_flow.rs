// TOUGH-style multiphase Darcy flow on the voxel grid
//
// One call per step: a scan picks between the cheap single-phase Darcy path
// (no gas anywhere) and the full multiphase path - phase velocities from
// van Genuchten mobilities with gas buoyancy, explicit upwind transport of
// gas saturation, renormalization of the saturation sum, and a heuristic
// compressibility nudge on pressure. Most of a domain is single-phase
// liquid most of the time, which is what makes the mode scan pay off.

use crate::boundary::{BoundaryCondition, BoundaryKind, BoundaryLocation, BoundaryVariable};
use crate::constants::{
    DEFAULT_RESIDUAL_GAS_SATURATION, DEFAULT_RESIDUAL_LIQUID_SATURATION,
    DEFAULT_VAN_GENUCHTEN_ALPHA_PER_PA, DEFAULT_VAN_GENUCHTEN_M, GAS_DENSITY_KG_M3,
    GAS_PRESENCE_THRESHOLD, GAS_PRESSURE_FEEDBACK_PA_PER_S, GAS_VISCOSITY_PA_S, GRAVITY_M_S2,
    MIN_ACTIVE_POROSITY, MIN_MOBILE_SATURATION, VAPOR_DENSITY_KG_M3, WATER_DENSITY_KG_M3,
    WATER_VISCOSITY_PA_S,
};
use crate::constitutive::VanGenuchtenParams;
use crate::grid_state::GridState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowParams {
    pub dx_m: f64,
    pub dy_m: f64,
    pub dz_m: f64,
    pub water_density_kg_m3: f64,
    pub gas_density_kg_m3: f64,
    pub vapor_density_kg_m3: f64,
    pub water_viscosity_pa_s: f64,
    pub gas_viscosity_pa_s: f64,
    pub van_genuchten: VanGenuchtenParams,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            dx_m: 1.0,
            dy_m: 1.0,
            dz_m: 1.0,
            water_density_kg_m3: WATER_DENSITY_KG_M3,
            gas_density_kg_m3: GAS_DENSITY_KG_M3,
            vapor_density_kg_m3: VAPOR_DENSITY_KG_M3,
            water_viscosity_pa_s: WATER_VISCOSITY_PA_S,
            gas_viscosity_pa_s: GAS_VISCOSITY_PA_S,
            van_genuchten: VanGenuchtenParams {
                m: DEFAULT_VAN_GENUCHTEN_M,
                alpha_per_pa: DEFAULT_VAN_GENUCHTEN_ALPHA_PER_PA,
                residual_liquid_saturation: DEFAULT_RESIDUAL_LIQUID_SATURATION,
                residual_gas_saturation: DEFAULT_RESIDUAL_GAS_SATURATION,
            },
        }
    }
}

pub struct FlowSolver {
    pub params: FlowParams,
    // Per-cell gas-phase volumetric fluxes, kept between the velocity and
    // transport passes of one call
    gas_flux_x: Vec<f64>,
    gas_flux_y: Vec<f64>,
    gas_flux_z: Vec<f64>,
    sat_scratch: Vec<f64>,
}

impl FlowSolver {
    pub fn new(params: FlowParams) -> Self {
        Self {
            params,
            gas_flux_x: Vec::new(),
            gas_flux_y: Vec::new(),
            gas_flux_z: Vec::new(),
            sat_scratch: Vec::new(),
        }
    }

    /// Advance velocity, saturation, and pressure fields over `dt`
    ///
    /// Runs the multiphase path when any voxel holds gas or vapor above the
    /// presence threshold, the single-phase Darcy path otherwise. The
    /// saturation sum is exactly one in every voxel on return; no single
    /// phase's mass is conserved across a call with pathological inputs.
    pub fn solve(
        &mut self,
        state: &mut GridState,
        dt: f64,
        time_s: f64,
        bcs: &[BoundaryCondition],
    ) {
        if self.any_gas_present(state) {
            self.solve_multiphase(state, dt, time_s, bcs);
        } else {
            self.solve_single_phase(state);
        }
    }

    fn any_gas_present(&self, state: &GridState) -> bool {
        let gas = state.gas_saturation.as_slice();
        let vapor = state.vapor_saturation.as_slice();
        gas.iter()
            .zip(vapor)
            .any(|(sg, sv)| *sg > GAS_PRESENCE_THRESHOLD || *sv > GAS_PRESENCE_THRESHOLD)
    }

    /// Darcy velocity of a fully liquid-saturated domain; saturations are
    /// not touched
    fn solve_single_phase(&mut self, state: &mut GridState) {
        let (nx, ny, nz) = (state.nx, state.ny, state.nz);
        let (dx, dy, dz) = (self.params.dx_m, self.params.dy_m, self.params.dz_m);
        let rho_w = self.params.water_density_kg_m3;
        let mu_w = self.params.water_viscosity_pa_s;

        for k in 1..nz.saturating_sub(1) {
            for j in 1..ny.saturating_sub(1) {
                for i in 1..nx.saturating_sub(1) {
                    if state.porosity.at(i, j, k) < MIN_ACTIVE_POROSITY {
                        continue;
                    }
                    let mobility = state.permeability.at(i, j, k) / mu_w;
                    let p = &state.pressure;

                    let dpdx = (p.at(i + 1, j, k) - p.at(i - 1, j, k)) / (2.0 * dx);
                    let dpdy = (p.at(i, j + 1, k) - p.at(i, j - 1, k)) / (2.0 * dy);
                    let dpdz = (p.at(i, j, k + 1) - p.at(i, j, k - 1)) / (2.0 * dz);

                    let fx = state.body_force_x.at(i, j, k);
                    let fy = state.body_force_y.at(i, j, k);
                    let fz = state.body_force_z.at(i, j, k);

                    state
                        .velocity_x
                        .set(i, j, k, -mobility * (dpdx - rho_w * fx));
                    state
                        .velocity_y
                        .set(i, j, k, -mobility * (dpdy - rho_w * fy));
                    state
                        .velocity_z
                        .set(i, j, k, -mobility * (dpdz - rho_w * (fz - GRAVITY_M_S2)));
                }
            }
        }
    }

    fn solve_multiphase(
        &mut self,
        state: &mut GridState,
        dt: f64,
        time_s: f64,
        bcs: &[BoundaryCondition],
    ) {
        self.compute_phase_velocities(state);
        self.transport_gas(state, dt, time_s, bcs);
        renormalize_saturations(state);
        apply_pressure_feedback(state, dt);
    }

    /// Density of the combined gas-like (gas + vapor) phase in one voxel
    fn gas_phase_density(&self, s_gas: f64, s_vapor: f64) -> f64 {
        let total = s_gas + s_vapor;
        if total > GAS_PRESENCE_THRESHOLD {
            (s_gas * self.params.gas_density_kg_m3 + s_vapor * self.params.vapor_density_kg_m3)
                / total
        } else {
            self.params.gas_density_kg_m3
        }
    }

    /// Water and gas Darcy velocities from van Genuchten mobilities; stores
    /// the gas-phase fluxes for the transport pass and writes the
    /// saturation-weighted bulk velocity
    fn compute_phase_velocities(&mut self, state: &mut GridState) {
        let (nx, ny, nz) = (state.nx, state.ny, state.nz);
        let (dx, dy, dz) = (self.params.dx_m, self.params.dy_m, self.params.dz_m);
        let vg = self.params.van_genuchten;
        let rho_w = self.params.water_density_kg_m3;
        let len = state.pressure.len();

        self.gas_flux_x.resize(len, 0.0);
        self.gas_flux_y.resize(len, 0.0);
        self.gas_flux_z.resize(len, 0.0);
        self.gas_flux_x.fill(0.0);
        self.gas_flux_y.fill(0.0);
        self.gas_flux_z.fill(0.0);

        // Gas-phase potential per voxel: pressure plus capillary pressure
        // from the local water saturation
        let gas_potential = |state: &GridState, i: usize, j: usize, k: usize| {
            state.pressure.at(i, j, k) + vg.capillary_pressure(state.liquid_saturation.at(i, j, k))
        };

        for k in 1..nz.saturating_sub(1) {
            for j in 1..ny.saturating_sub(1) {
                for i in 1..nx.saturating_sub(1) {
                    if state.porosity.at(i, j, k) < MIN_ACTIVE_POROSITY {
                        continue;
                    }
                    let s_w = state.liquid_saturation.at(i, j, k);
                    let s_g = state.gas_saturation.at(i, j, k);
                    let s_v = state.vapor_saturation.at(i, j, k);
                    let s_gas_like = s_g + s_v;

                    let k_perm = state.permeability.at(i, j, k);
                    let lambda_w = VanGenuchtenParams::mobility(
                        k_perm,
                        vg.relative_permeability_water(s_w),
                        self.params.water_viscosity_pa_s,
                    );
                    let lambda_g = VanGenuchtenParams::mobility(
                        k_perm,
                        vg.relative_permeability_gas(s_gas_like),
                        self.params.gas_viscosity_pa_s,
                    );
                    let rho_g = self.gas_phase_density(s_g, s_v);

                    let p = &state.pressure;
                    let dpdx = (p.at(i + 1, j, k) - p.at(i - 1, j, k)) / (2.0 * dx);
                    let dpdy = (p.at(i, j + 1, k) - p.at(i, j - 1, k)) / (2.0 * dy);
                    let dpdz = (p.at(i, j, k + 1) - p.at(i, j, k - 1)) / (2.0 * dz);

                    let dpgdx =
                        (gas_potential(state, i + 1, j, k) - gas_potential(state, i - 1, j, k))
                            / (2.0 * dx);
                    let dpgdy =
                        (gas_potential(state, i, j + 1, k) - gas_potential(state, i, j - 1, k))
                            / (2.0 * dy);
                    let dpgdz =
                        (gas_potential(state, i, j, k + 1) - gas_potential(state, i, j, k - 1))
                            / (2.0 * dz);

                    let fx = state.body_force_x.at(i, j, k);
                    let fy = state.body_force_y.at(i, j, k);
                    let fz = state.body_force_z.at(i, j, k);

                    let v_wx = -lambda_w * (dpdx - rho_w * fx);
                    let v_wy = -lambda_w * (dpdy - rho_w * fy);
                    let v_wz = -lambda_w * (dpdz - rho_w * (fz - GRAVITY_M_S2));

                    let v_gx = -lambda_g * (dpgdx - rho_g * fx);
                    let v_gy = -lambda_g * (dpgdy - rho_g * fy);
                    // Capillary-adjusted gravity term plus the explicit
                    // buoyancy correction: without it, gas never rises
                    let v_gz = -lambda_g * (dpgdz - rho_g * (fz - GRAVITY_M_S2))
                        + lambda_g * (rho_w - rho_g) * GRAVITY_M_S2;

                    let idx = state.pressure.idx(i, j, k);
                    self.gas_flux_x[idx] = v_gx * s_g;
                    self.gas_flux_y[idx] = v_gy * s_g;
                    self.gas_flux_z[idx] = v_gz * s_g;

                    let mobile = s_w + s_gas_like;
                    if mobile > MIN_MOBILE_SATURATION {
                        state
                            .velocity_x
                            .set(i, j, k, (s_w * v_wx + s_gas_like * v_gx) / mobile);
                        state
                            .velocity_y
                            .set(i, j, k, (s_w * v_wy + s_gas_like * v_gy) / mobile);
                        state
                            .velocity_z
                            .set(i, j, k, (s_w * v_wz + s_gas_like * v_gz) / mobile);
                    }
                }
            }
        }
    }

    /// Explicit upwind finite-volume update of gas saturation from the
    /// stored per-cell fluxes
    ///
    /// Boundary policy: zero-gradient on lateral and bottom faces, hard
    /// sink at the domain top (gas escapes freely), with gas-species
    /// concentration conditions overriding the ZMin/ZMax faces.
    fn transport_gas(
        &mut self,
        state: &mut GridState,
        dt: f64,
        time_s: f64,
        bcs: &[BoundaryCondition],
    ) {
        let (nx, ny, nz) = (state.nx, state.ny, state.nz);
        let (dx, dy, dz) = (self.params.dx_m, self.params.dy_m, self.params.dz_m);
        let sat = &state.gas_saturation;

        self.sat_scratch.resize(sat.len(), 0.0);
        self.sat_scratch.copy_from_slice(sat.as_slice());

        // Upstream cell's flux, chosen by the flow direction at the face
        let upwind = |flux_minus: f64, flux_plus: f64| {
            if flux_minus + flux_plus > 0.0 {
                flux_minus
            } else {
                flux_plus
            }
        };

        for k in 1..nz.saturating_sub(1) {
            for j in 1..ny.saturating_sub(1) {
                for i in 1..nx.saturating_sub(1) {
                    let porosity = state.porosity.at(i, j, k);
                    if porosity < MIN_ACTIVE_POROSITY {
                        continue;
                    }
                    let idx = sat.idx(i, j, k);

                    let flux_east = upwind(self.gas_flux_x[idx], self.gas_flux_x[sat.idx(i + 1, j, k)]);
                    let flux_west = upwind(self.gas_flux_x[sat.idx(i - 1, j, k)], self.gas_flux_x[idx]);
                    let flux_north = upwind(self.gas_flux_y[idx], self.gas_flux_y[sat.idx(i, j + 1, k)]);
                    let flux_south = upwind(self.gas_flux_y[sat.idx(i, j - 1, k)], self.gas_flux_y[idx]);
                    let flux_top = upwind(self.gas_flux_z[idx], self.gas_flux_z[sat.idx(i, j, k + 1)]);
                    let flux_bottom = upwind(self.gas_flux_z[sat.idx(i, j, k - 1)], self.gas_flux_z[idx]);

                    let div_flux = (flux_east - flux_west) / dx
                        + (flux_north - flux_south) / dy
                        + (flux_top - flux_bottom) / dz;

                    self.sat_scratch[idx] =
                        (sat.at(i, j, k) - dt * div_flux / porosity).clamp(0.0, 1.0);
                }
            }
        }

        // Zero-gradient on lateral faces and the bottom
        if nx >= 2 {
            for k in 0..nz {
                for j in 0..ny {
                    self.sat_scratch[sat.idx(0, j, k)] = self.sat_scratch[sat.idx(1, j, k)];
                    self.sat_scratch[sat.idx(nx - 1, j, k)] =
                        self.sat_scratch[sat.idx(nx - 2, j, k)];
                }
            }
        }
        if ny >= 2 {
            for k in 0..nz {
                for i in 0..nx {
                    self.sat_scratch[sat.idx(i, 0, k)] = self.sat_scratch[sat.idx(i, 1, k)];
                    self.sat_scratch[sat.idx(i, ny - 1, k)] =
                        self.sat_scratch[sat.idx(i, ny - 2, k)];
                }
            }
        }
        if nz >= 2 {
            for j in 0..ny {
                for i in 0..nx {
                    self.sat_scratch[sat.idx(i, j, 0)] = self.sat_scratch[sat.idx(i, j, 1)];
                    // The top face is a hard sink: gas escapes the domain
                    self.sat_scratch[sat.idx(i, j, nz - 1)] = 0.0;
                }
            }
        }

        // Gas-species concentration conditions override the vertical faces
        for bc in bcs {
            if !bc.active
                || bc.variable != BoundaryVariable::Concentration
                || bc.kind != BoundaryKind::FixedValue
                || !bc.is_gas_species()
            {
                continue;
            }
            let value = bc.value.value_at(time_s).clamp(0.0, 1.0);
            let face_k = match bc.location {
                BoundaryLocation::ZMin => Some(0),
                BoundaryLocation::ZMax => Some(nz - 1),
                _ => None,
            };
            if let Some(face_k) = face_k {
                for j in 0..ny {
                    for i in 0..nx {
                        self.sat_scratch[sat.idx(i, j, face_k)] = value;
                    }
                }
            }
        }

        state
            .gas_saturation
            .as_mut_slice()
            .copy_from_slice(&self.sat_scratch);
    }
}

/// Enforce `S_liquid + S_gas + S_vapor == 1` in every voxel
///
/// Over-saturated voxels rescale all three phases proportionally; any
/// deficit is assigned entirely to liquid.
fn renormalize_saturations(state: &mut GridState) {
    let liquid = state.liquid_saturation.as_mut_slice();
    let gas = state.gas_saturation.as_mut_slice();
    let vapor = state.vapor_saturation.as_mut_slice();

    for idx in 0..liquid.len() {
        let sum = liquid[idx] + gas[idx] + vapor[idx];
        if sum > 1.0 {
            liquid[idx] /= sum;
            gas[idx] /= sum;
            vapor[idx] /= sum;
        } else if sum < 1.0 {
            liquid[idx] += 1.0 - sum;
        }
    }
}

/// Simplified isothermal compressibility adjustment: gas-rich cells lose a
/// little pressure. A local nudge, not a pressure solve.
fn apply_pressure_feedback(state: &mut GridState, dt: f64) {
    let gas = state.gas_saturation.as_slice();
    let pressure = state.pressure.as_mut_slice();
    for idx in 0..pressure.len() {
        if gas[idx] > GAS_PRESENCE_THRESHOLD {
            pressure[idx] -= gas[idx] * GAS_PRESSURE_FEEDBACK_PA_PER_S * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_state::{GridState, GridStateParams};
    use approx::assert_abs_diff_eq;
    use more_asserts::{assert_gt, assert_lt};

    fn state(n: usize) -> GridState {
        GridState::new(GridStateParams {
            nx: n,
            ny: n,
            nz: n,
            temperature_k: 300.0,
            pressure_pa: 1.0e7,
            porosity: 0.3,
            permeability_m2: 1.0e-12,
        })
    }

    #[test]
    fn test_all_liquid_runs_single_phase_path() {
        let mut s = state(5);
        // Pressure drop along +x drives flow
        for k in 0..5 {
            for j in 0..5 {
                for i in 0..5 {
                    s.pressure.set(i, j, k, 1.0e7 - 1.0e4 * i as f64);
                }
            }
        }
        let mut solver = FlowSolver::new(FlowParams::default());
        let before = s.gas_saturation.clone();
        solver.solve(&mut s, 1.0, 0.0, &[]);

        assert_gt!(s.velocity_x.at(2, 2, 2), 0.0);
        // Single-phase path never touches saturations
        assert_eq!(s.gas_saturation, before);
    }

    #[test]
    fn test_low_porosity_cells_are_skipped() {
        let mut s = state(5);
        s.porosity.fill(0.001);
        for i in 0..5 {
            for j in 0..5 {
                for k in 0..5 {
                    s.pressure.set(i, j, k, 1.0e7 - 1.0e4 * i as f64);
                }
            }
        }
        let mut solver = FlowSolver::new(FlowParams::default());
        solver.solve(&mut s, 1.0, 0.0, &[]);
        assert_eq!(s.velocity_x.at(2, 2, 2), 0.0);
    }

    #[test]
    fn test_gas_rises_under_buoyancy() {
        // Uniform gas pocket, no pressure gradient: only buoyancy drives flow
        let mut s = state(3);
        s.gas_saturation.fill(0.3);
        s.liquid_saturation.fill(0.7);
        let mut solver = FlowSolver::new(FlowParams::default());
        solver.solve(&mut s, 1.0e-3, 0.0, &[]);
        assert_gt!(s.velocity_z.at(1, 1, 1), 0.0);
    }

    #[test]
    fn test_saturation_sum_closes_after_solve() {
        let mut s = state(4);
        // Deliberately inconsistent saturations
        s.liquid_saturation.fill(0.8);
        s.gas_saturation.fill(0.3);
        s.vapor_saturation.fill(0.05);
        let mut solver = FlowSolver::new(FlowParams::default());
        solver.solve(&mut s, 1.0e-3, 0.0, &[]);
        for idx in 0..s.liquid_saturation.len() {
            let sum = s.liquid_saturation.as_slice()[idx]
                + s.gas_saturation.as_slice()[idx]
                + s.vapor_saturation.as_slice()[idx];
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_top_face_is_gas_sink() {
        let mut s = state(4);
        s.gas_saturation.fill(0.2);
        s.liquid_saturation.fill(0.8);
        let mut solver = FlowSolver::new(FlowParams::default());
        solver.solve(&mut s, 1.0e-3, 0.0, &[]);
        for j in 0..4 {
            for i in 0..4 {
                assert_abs_diff_eq!(s.gas_saturation.at(i, j, 3), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_gas_species_condition_overrides_bottom_face() {
        let mut s = state(4);
        s.gas_saturation.fill(0.1);
        // Leave headroom so renormalization keeps the forced face value
        s.liquid_saturation.fill(0.5);
        let bcs = vec![BoundaryCondition::fixed_concentration(
            BoundaryLocation::ZMin,
            "Methane",
            0.5,
        )];
        let mut solver = FlowSolver::new(FlowParams::default());
        solver.solve(&mut s, 1.0e-3, 0.0, &bcs);
        assert_abs_diff_eq!(s.gas_saturation.at(1, 1, 0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_pressure_feedback_lowers_gas_rich_cells() {
        let mut s = state(4);
        s.gas_saturation.fill(0.4);
        s.liquid_saturation.fill(0.6);
        let p_before = s.pressure.at(1, 1, 1);
        let mut solver = FlowSolver::new(FlowParams::default());
        solver.solve(&mut s, 1.0, 0.0, &[]);
        assert_lt!(s.pressure.at(1, 1, 1), p_before);
    }
}
