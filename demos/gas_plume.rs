// Rising-gas demo: a methane pocket released at the bottom of a brine-filled
// reservoir with Perlin-noise permeability, coupled to quartz nucleation.
// Drives the flow and nucleation solvers the way the orchestrator would.

use colored::Colorize;
use geo_react_rust::grid_state::{GridState, GridStateParams};
use geo_react_rust::mineral::MineralType;
use geo_react_rust::multiphase_flow::{FlowParams, FlowSolver};
use geo_react_rust::nucleation::{NucleationParams, NucleationSolver};
use geo_react_rust::nucleus::NucleationSite;
use glam::DVec3;
use noise::{NoiseFn, Perlin};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() {
    println!("💨 Gas Plume Demo");
    println!("=================");
    println!("12x12x16 brine reservoir, methane pocket at the bottom, quartz");
    println!("nucleation sites seeded through the column.");

    let (nx, ny, nz) = (12, 12, 16);
    let spacing = 0.01;
    let mut state = GridState::new(GridStateParams {
        nx,
        ny,
        nz,
        temperature_k: 350.0,
        pressure_pa: 2.0e7,
        porosity: 0.3,
        permeability_m2: 1.0e-11,
    });
    state.add_species("SiO2", 4.0e-4);
    state.add_mineral(MineralType::Quartz);

    // Permeability spans an order of magnitude across the reservoir
    let perlin = Perlin::new(7);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let sample = perlin.get([i as f64 * 0.3, j as f64 * 0.3, k as f64 * 0.3]);
                state
                    .permeability
                    .set(i, j, k, 1.0e-11 * 10.0_f64.powf(sample));
            }
        }
    }

    // Methane pocket: a 4x4 patch, two cells above the floor
    for j in 4..8 {
        for i in 4..8 {
            state.gas_saturation.set(i, j, 2, 0.35);
            state.liquid_saturation.set(i, j, 2, 0.65);
        }
    }

    let sites: Vec<NucleationSite> = (3..13)
        .map(|k| {
            NucleationSite::new(
                DVec3::new(0.055, 0.055, k as f64 * spacing + 0.005),
                MineralType::Quartz,
                1.0e-6,
                5.0e4,
                2.0,
            )
        })
        .collect();

    let mut flow_params = FlowParams {
        dx_m: spacing,
        dy_m: spacing,
        dz_m: spacing,
        ..FlowParams::default()
    };
    // Coarse pores: weak capillarity relative to the sandstone default
    flow_params.van_genuchten.alpha_per_pa = 1.0e-3;
    let mut flow = FlowSolver::new(flow_params);
    let mut nucleation = NucleationSolver::new(NucleationParams {
        dx_m: spacing,
        dy_m: spacing,
        dz_m: spacing,
        ..NucleationParams::default()
    });
    let mut rng = StdRng::seed_from_u64(2024);

    let dt = 0.1;
    let steps = 600;
    for step in 0..steps {
        let time_s = step as f64 * dt;
        flow.solve(&mut state, dt, time_s, &[]);
        nucleation.update(&mut state, &sites, time_s, dt, &mut rng);

        if step % 75 == 0 || step == steps - 1 {
            println!(
                "t = {:6.1} s  gas in column: {}",
                time_s,
                gas_profile(&state)
            );
        }
    }

    println!("\n📊 Final state:");
    println!("  nuclei spawned: {}", state.nuclei.len());
    println!(
        "  porosity range: {:.4} .. {:.4}",
        state.porosity.min_value(),
        state.porosity.max_value()
    );
    println!(
        "  peak gas saturation: {:.4}",
        state.gas_saturation.max_value()
    );

    println!(
        "\n{}",
        "✅ Done: gas drained toward the open top while quartz grew on the sites.".green()
    );
}

/// One character per z-layer: total gas in that layer, bottom to top
fn gas_profile(state: &GridState) -> String {
    (0..state.nz)
        .map(|k| {
            let mut layer_gas = 0.0;
            for j in 0..state.ny {
                for i in 0..state.nx {
                    layer_gas += state.gas_saturation.at(i, j, k);
                }
            }
            match layer_gas {
                g if g > 1.0 => '#',
                g if g > 0.1 => '+',
                g if g > 1e-6 => '.',
                _ => ' ',
            }
        })
        .collect()
}
