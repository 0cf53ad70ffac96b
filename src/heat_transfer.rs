// Explicit heat transfer over a heterogeneous voxel grid
//
// Conduction with harmonic face-averaged conductivity, first-order upwind
// convection on the local velocity, and an optional caller-supplied source.
// The update is double-buffered: a solver-owned scratch grid takes the full
// sweep and is committed to the state only afterwards.

use crate::boundary::{BoundaryCondition, BoundaryKind, BoundaryLocation, BoundaryVariable};
use crate::constants::{
    DIFFUSION_CFL_FACTOR, ROCK_CONDUCTIVITY_W_M_K, ROCK_DENSITY_KG_M3, ROCK_SPECIFIC_HEAT_J_KG_K,
};
use crate::field::ScalarField3;
use crate::grid_state::GridState;
use crate::math_utils::harmonic_mean;
use serde::{Deserialize, Serialize};

/// Volumetric heat source in W/m^3 as a function of voxel index and
/// simulation time
pub type HeatSourceFn = Box<dyn Fn(usize, usize, usize, f64) -> f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatParams {
    pub dx_m: f64,
    pub dy_m: f64,
    pub dz_m: f64,
    /// Default conductivity where no heterogeneous field is present
    pub conductivity_w_m_k: f64,
    pub density_kg_m3: f64,
    pub specific_heat_j_kg_k: f64,
}

impl Default for HeatParams {
    fn default() -> Self {
        Self {
            dx_m: 1.0,
            dy_m: 1.0,
            dz_m: 1.0,
            conductivity_w_m_k: ROCK_CONDUCTIVITY_W_M_K,
            density_kg_m3: ROCK_DENSITY_KG_M3,
            specific_heat_j_kg_k: ROCK_SPECIFIC_HEAT_J_KG_K,
        }
    }
}

pub struct HeatSolver {
    pub params: HeatParams,
    /// Heterogeneous conductivity; absent means the scalar default applies
    /// uniformly
    pub conductivity_field: Option<ScalarField3>,
    source: Option<HeatSourceFn>,
    scratch: Vec<f64>,
}

impl HeatSolver {
    pub fn new(params: HeatParams) -> Self {
        Self {
            params,
            conductivity_field: None,
            source: None,
            scratch: Vec::new(),
        }
    }

    pub fn with_conductivity_field(mut self, field: ScalarField3) -> Self {
        self.conductivity_field = Some(field);
        self
    }

    pub fn with_source(mut self, source: HeatSourceFn) -> Self {
        self.source = Some(source);
        self
    }

    /// Largest explicit time step the diffusion stencil tolerates
    pub fn stable_dt(&self) -> f64 {
        let alpha_max = self.params.conductivity_w_m_k
            / (self.params.density_kg_m3 * self.params.specific_heat_j_kg_k);
        DIFFUSION_CFL_FACTOR * self.params.dx_m * self.params.dx_m / alpha_max
    }

    #[inline]
    fn conductivity_at(&self, i: usize, j: usize, k: usize) -> f64 {
        match &self.conductivity_field {
            Some(field) => field.at(i, j, k),
            None => self.params.conductivity_w_m_k,
        }
    }

    /// Advance the temperature field by one step of at most `dt` seconds
    ///
    /// An oversized `dt` is silently clamped to the stability limit; callers
    /// needing exact time accounting must call repeatedly. Fixed-value
    /// temperature conditions are forced into the field before the sweep so
    /// the stencil sees them, and re-applied after the halo copy; uncovered
    /// faces get a zero-gradient copy from the first interior layer.
    pub fn solve(
        &mut self,
        state: &mut GridState,
        dt: f64,
        time_s: f64,
        bcs: &[BoundaryCondition],
    ) {
        let (nx, ny, nz) = (state.nx, state.ny, state.nz);
        let dt_actual = dt.min(self.stable_dt());
        let rho_cp = self.params.density_kg_m3 * self.params.specific_heat_j_kg_k;
        let (dx, dy, dz) = (self.params.dx_m, self.params.dy_m, self.params.dz_m);

        write_fixed_values(state.temperature.as_mut_slice(), nx, ny, nz, time_s, bcs);

        let temp = &state.temperature;
        self.scratch.resize(temp.len(), 0.0);
        self.scratch.copy_from_slice(temp.as_slice());

        for k in 1..nz.saturating_sub(1) {
            for j in 1..ny.saturating_sub(1) {
                for i in 1..nx.saturating_sub(1) {
                    let t_c = temp.at(i, j, k);
                    let k_c = self.conductivity_at(i, j, k);

                    // Harmonic face conductivities: flux continuity across
                    // mineral/pore interfaces
                    let k_xm = harmonic_mean(k_c, self.conductivity_at(i - 1, j, k));
                    let k_xp = harmonic_mean(k_c, self.conductivity_at(i + 1, j, k));
                    let k_ym = harmonic_mean(k_c, self.conductivity_at(i, j - 1, k));
                    let k_yp = harmonic_mean(k_c, self.conductivity_at(i, j + 1, k));
                    let k_zm = harmonic_mean(k_c, self.conductivity_at(i, j, k - 1));
                    let k_zp = harmonic_mean(k_c, self.conductivity_at(i, j, k + 1));

                    let conduction = ((k_xp * (temp.at(i + 1, j, k) - t_c)
                        + k_xm * (temp.at(i - 1, j, k) - t_c))
                        / (dx * dx)
                        + (k_yp * (temp.at(i, j + 1, k) - t_c)
                            + k_ym * (temp.at(i, j - 1, k) - t_c))
                            / (dy * dy)
                        + (k_zp * (temp.at(i, j, k + 1) - t_c)
                            + k_zm * (temp.at(i, j, k - 1) - t_c))
                            / (dz * dz))
                        / rho_cp;

                    // Upwind differencing on the local velocity sign, per
                    // axis independently
                    let vx = state.velocity_x.at(i, j, k);
                    let vy = state.velocity_y.at(i, j, k);
                    let vz = state.velocity_z.at(i, j, k);

                    let dtdx = if vx > 0.0 {
                        (t_c - temp.at(i - 1, j, k)) / dx
                    } else {
                        (temp.at(i + 1, j, k) - t_c) / dx
                    };
                    let dtdy = if vy > 0.0 {
                        (t_c - temp.at(i, j - 1, k)) / dy
                    } else {
                        (temp.at(i, j + 1, k) - t_c) / dy
                    };
                    let dtdz = if vz > 0.0 {
                        (t_c - temp.at(i, j, k - 1)) / dz
                    } else {
                        (temp.at(i, j, k + 1) - t_c) / dz
                    };

                    let convection = -(vx * dtdx + vy * dtdy + vz * dtdz);

                    let source = match &self.source {
                        Some(q) => q(i, j, k, time_s) / rho_cp,
                        None => 0.0,
                    };

                    self.scratch[temp.idx(i, j, k)] =
                        t_c + dt_actual * (conduction + convection + source);
                }
            }
        }

        write_zero_gradient_halo(&mut self.scratch, nx, ny, nz);
        write_fixed_values(&mut self.scratch, nx, ny, nz, time_s, bcs);

        state.temperature.as_mut_slice().copy_from_slice(&self.scratch);
    }
}

#[inline]
fn flat_idx(nx: usize, ny: usize, i: usize, j: usize, k: usize) -> usize {
    i + nx * (j + ny * k)
}

/// Zero-gradient copy from the first interior layer into the halo on all
/// six faces
fn write_zero_gradient_halo(values: &mut [f64], nx: usize, ny: usize, nz: usize) {
    if nx >= 2 {
        for k in 0..nz {
            for j in 0..ny {
                values[flat_idx(nx, ny, 0, j, k)] = values[flat_idx(nx, ny, 1, j, k)];
                values[flat_idx(nx, ny, nx - 1, j, k)] = values[flat_idx(nx, ny, nx - 2, j, k)];
            }
        }
    }
    if ny >= 2 {
        for k in 0..nz {
            for i in 0..nx {
                values[flat_idx(nx, ny, i, 0, k)] = values[flat_idx(nx, ny, i, 1, k)];
                values[flat_idx(nx, ny, i, ny - 1, k)] = values[flat_idx(nx, ny, i, ny - 2, k)];
            }
        }
    }
    if nz >= 2 {
        for j in 0..ny {
            for i in 0..nx {
                values[flat_idx(nx, ny, i, j, 0)] = values[flat_idx(nx, ny, i, j, 1)];
                values[flat_idx(nx, ny, i, j, nz - 1)] = values[flat_idx(nx, ny, i, j, nz - 2)];
            }
        }
    }
}

/// Overwrite faces named by active FixedValue temperature conditions, in
/// list order (later entries for the same face win)
fn write_fixed_values(
    values: &mut [f64],
    nx: usize,
    ny: usize,
    nz: usize,
    time_s: f64,
    bcs: &[BoundaryCondition],
) {
    for bc in bcs {
        if !bc.active
            || bc.variable != BoundaryVariable::Temperature
            || bc.kind != BoundaryKind::FixedValue
        {
            continue;
        }
        let value = bc.value.value_at(time_s);
        match bc.location {
            BoundaryLocation::XMin => {
                for k in 0..nz {
                    for j in 0..ny {
                        values[flat_idx(nx, ny, 0, j, k)] = value;
                    }
                }
            }
            BoundaryLocation::XMax => {
                for k in 0..nz {
                    for j in 0..ny {
                        values[flat_idx(nx, ny, nx - 1, j, k)] = value;
                    }
                }
            }
            BoundaryLocation::YMin => {
                for k in 0..nz {
                    for i in 0..nx {
                        values[flat_idx(nx, ny, i, 0, k)] = value;
                    }
                }
            }
            BoundaryLocation::YMax => {
                for k in 0..nz {
                    for i in 0..nx {
                        values[flat_idx(nx, ny, i, ny - 1, k)] = value;
                    }
                }
            }
            BoundaryLocation::ZMin => {
                for j in 0..ny {
                    for i in 0..nx {
                        values[flat_idx(nx, ny, i, j, 0)] = value;
                    }
                }
            }
            BoundaryLocation::ZMax => {
                for j in 0..ny {
                    for i in 0..nx {
                        values[flat_idx(nx, ny, i, j, nz - 1)] = value;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_state::GridStateParams;
    use approx::assert_abs_diff_eq;
    use more_asserts::{assert_gt, assert_lt};

    fn uniform_state(n: usize, temp_k: f64) -> GridState {
        GridState::new(GridStateParams {
            nx: n,
            ny: n,
            nz: n,
            temperature_k: temp_k,
            pressure_pa: 1.0e7,
            porosity: 0.3,
            permeability_m2: 1.0e-12,
        })
    }

    fn params_1cm() -> HeatParams {
        HeatParams {
            dx_m: 0.01,
            dy_m: 0.01,
            dz_m: 0.01,
            ..HeatParams::default()
        }
    }

    #[test]
    fn test_uniform_field_is_steady() {
        let mut state = uniform_state(5, 300.0);
        let mut solver = HeatSolver::new(params_1cm());
        solver.solve(&mut state, 1.0, 0.0, &[]);
        for idx in 0..state.temperature.len() {
            assert_abs_diff_eq!(state.temperature.as_slice()[idx], 300.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_oversized_dt_never_diverges() {
        let mut state = uniform_state(5, 300.0);
        let bcs = vec![BoundaryCondition::fixed_temperature(
            BoundaryLocation::ZMin,
            400.0,
        )];
        let mut solver = HeatSolver::new(params_1cm());
        // Four orders of magnitude past the stability limit
        for step in 0..10 {
            solver.solve(&mut state, 1.0e6, step as f64, &bcs);
        }
        assert_lt!(state.temperature.max_value(), 400.0 + 1e-9);
        assert_gt!(state.temperature.min_value(), 300.0 - 1e-9);
    }

    #[test]
    fn test_heated_face_warms_adjacent_layer_only() {
        let mut state = uniform_state(5, 300.0);
        let bcs = vec![BoundaryCondition::fixed_temperature(
            BoundaryLocation::ZMin,
            400.0,
        )];
        let mut solver = HeatSolver::new(params_1cm());
        solver.solve(&mut state, 1.0, 0.0, &bcs);

        // Face itself pinned
        assert_abs_diff_eq!(state.temperature.at(2, 2, 0), 400.0, epsilon = 1e-12);
        // First interior layer strictly between the extremes
        let adjacent = state.temperature.at(2, 2, 1);
        assert_gt!(adjacent, 300.0);
        assert_lt!(adjacent, 400.0);
        // Far side untouched after a single step
        assert_abs_diff_eq!(state.temperature.at(2, 2, 3), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_upwind_convection_pulls_from_upstream() {
        let mut state = uniform_state(5, 300.0);
        // Hot column upstream of the center, flow in +x
        for k in 0..5 {
            for j in 0..5 {
                state.temperature.set(1, j, k, 350.0);
            }
        }
        state.velocity_x.fill(0.5);
        let mut solver = HeatSolver::new(HeatParams {
            // Conduction suppressed so the advection term dominates
            conductivity_w_m_k: 1e-12,
            ..params_1cm()
        });
        solver.solve(&mut state, 1.0e-3, 0.0, &[]);
        // Center cell (downstream of the hot column) warms
        assert_gt!(state.temperature.at(2, 2, 2), 300.0);
        // The cell upstream of the hot column does not
        assert_abs_diff_eq!(state.temperature.at(3, 2, 2), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_heat_source_term() {
        let mut state = uniform_state(5, 300.0);
        let mut solver =
            HeatSolver::new(params_1cm()).with_source(Box::new(|i, j, k, _t| {
                if (i, j, k) == (2, 2, 2) { 1.0e6 } else { 0.0 }
            }));
        let dt = solver.stable_dt() * 0.5;
        solver.solve(&mut state, dt, 0.0, &[]);
        let expected = 300.0 + dt * 1.0e6 / (2500.0 * 1000.0);
        assert_abs_diff_eq!(state.temperature.at(2, 2, 2), expected, epsilon = 1e-9);
        assert_abs_diff_eq!(state.temperature.at(1, 2, 2), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_heterogeneous_conductivity_blocks_flux_through_insulator() {
        let n = 5;
        let mut open_state = uniform_state(n, 300.0);
        let mut walled_state = uniform_state(n, 300.0);
        let bcs = vec![BoundaryCondition::fixed_temperature(
            BoundaryLocation::XMin,
            400.0,
        )];

        let open = ScalarField3::filled(n, n, n, 2.0);
        let mut walled = ScalarField3::filled(n, n, n, 2.0);
        for k in 0..n {
            for j in 0..n {
                // Near-zero conductivity wall; harmonic averaging makes the
                // interface flux collapse
                walled.set(1, j, k, 1e-18);
            }
        }

        let mut fast = HeatSolver::new(params_1cm()).with_conductivity_field(open);
        let mut slow = HeatSolver::new(params_1cm()).with_conductivity_field(walled);
        let dt = fast.stable_dt() * 0.5;
        for step in 0..10 {
            fast.solve(&mut open_state, dt, step as f64 * dt, &bcs);
            slow.solve(&mut walled_state, dt, step as f64 * dt, &bcs);
        }

        assert_gt!(
            open_state.temperature.at(2, 2, 2),
            walled_state.temperature.at(2, 2, 2)
        );
        assert_abs_diff_eq!(walled_state.temperature.at(2, 2, 2), 300.0, epsilon = 1e-9);
    }
}
