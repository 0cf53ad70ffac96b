// Heated-slab conduction demo: a cold rock slab with a hot floor and a
// Perlin-noise conductivity field, advanced by the explicit heat solver.

use colored::Colorize;
use geo_react_rust::boundary::{
    BoundaryCondition, BoundaryKind, BoundaryLocation, BoundaryValue, BoundaryVariable,
};
use geo_react_rust::field::ScalarField3;
use geo_react_rust::grid_state::{GridState, GridStateParams};
use geo_react_rust::heat_transfer::{HeatParams, HeatSolver};
use noise::{NoiseFn, Perlin};

fn main() {
    println!("🔥 Heated Slab Demo");
    println!("===================");
    println!("16x16x16 rock slab, floor ramped from 300K to 500K over 10 minutes,");
    println!("conductivity perturbed by Perlin noise (fractured rock).");

    let n = 16;
    let mut state = GridState::new(GridStateParams {
        nx: n,
        ny: n,
        nz: n,
        temperature_k: 300.0,
        pressure_pa: 1.0e7,
        porosity: 0.3,
        permeability_m2: 1.0e-12,
    });

    // Conductivity between 1.0 and 3.0 W/(m K), smoothly varying
    let perlin = Perlin::new(42);
    let mut conductivity = ScalarField3::zeros(n, n, n);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let sample = perlin.get([i as f64 * 0.2, j as f64 * 0.2, k as f64 * 0.2]);
                conductivity.set(i, j, k, 2.0 + sample);
            }
        }
    }
    println!(
        "Conductivity field: {:.2} .. {:.2} W/(m K)",
        conductivity.min_value(),
        conductivity.max_value()
    );

    // Floor temperature ramps up, then holds
    let bcs = vec![BoundaryCondition {
        location: BoundaryLocation::ZMin,
        variable: BoundaryVariable::Temperature,
        kind: BoundaryKind::FixedValue,
        value: BoundaryValue::Table(vec![(0.0, 300.0), (600.0, 500.0)]),
        species: None,
        active: true,
    }];

    let mut solver = HeatSolver::new(HeatParams {
        dx_m: 0.01,
        dy_m: 0.01,
        dz_m: 0.01,
        ..HeatParams::default()
    })
    .with_conductivity_field(conductivity);

    // The internal clamp is sized for the default conductivity; the noise
    // field peaks 50% above it, so step well inside the limit
    let dt = solver.stable_dt() / 3.0;
    println!("Step: {:.3} s", dt);

    let steps = 2000;
    let mut time_s = 0.0;
    for step in 0..steps {
        solver.solve(&mut state, dt, time_s, &bcs);
        time_s += dt;

        if step % 250 == 0 || step == steps - 1 {
            let center = state.temperature.at(n / 2, n / 2, n / 2);
            let report = format!(
                "t = {:7.1} s  floor = {:6.1} K  center = {:6.2} K  max = {:6.1} K",
                time_s,
                state.temperature.at(n / 2, n / 2, 0),
                center,
                state.temperature.max_value()
            );
            if center > 301.0 {
                println!("{}", report.yellow());
            } else {
                println!("{}", report);
            }
        }
    }

    println!("\n📊 Vertical profile through the slab center:");
    for k in 0..n {
        let t = state.temperature.at(n / 2, n / 2, k);
        let bar = "#".repeat(((t - 300.0) / 10.0) as usize);
        println!("  z = {:2}  {:6.1} K  {}", k, t, bar.red());
    }

    println!("\n{}", "✅ Done: heat crept up from the floor, faster through the high-conductivity channels.".green());
}
