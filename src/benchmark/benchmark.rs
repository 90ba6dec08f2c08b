use std::time::Instant;

use crate::simulation::params::Parameters;
use crate::simulation::scenario::install_global_fields;
use crate::simulation::system::DynamicSystem;
use crate::simulation::topology::{EdgeFixing, Fabric, FabricConfig};
use crate::simulation::particle::NVec3;
use crate::error::SimError;

/// Helper to build a flag-like system of `h` x `v` particles with gravity,
/// wind and air damping installed
fn make_system(h: usize, v: usize, stiffness: f64, dt: f64) -> Result<DynamicSystem, SimError> {
    let mut system = DynamicSystem::new(dt)?;
    let config = FabricConfig::new(0.65, 1.1, h, v, stiffness, 1.0)
        .with_fixing(EdgeFixing::BothEdges);
    Fabric::build(&config)?.install(&mut system)?;

    let params = Parameters {
        dt,
        wind: Some(NVec3::new(3.0, 2.0, -20.0)),
        damping: 1.0,
        ..Parameters::default()
    };
    install_global_fields(&mut system, &params)?;
    Ok(system)
}

/// Time `DynamicSystem::step` for growing grids
/// Paste output directly into excel to graph
pub fn bench_step() -> Result<(), SimError> {
    let grids = [(15, 10), (30, 20), (60, 40), (120, 80), (240, 160)];
    let steps = 100;

    println!("particles,springs,us_per_step");

    for (h, v) in grids {
        let mut system = make_system(h, v, 1.0e4, 1.0e-4)?;
        let springs = system.force_field_count() - 3;

        // Warm up
        system.step_n(10);

        let t0 = Instant::now();
        system.step_n(steps);
        let us = t0.elapsed().as_secs_f64() * 1.0e6 / steps as f64;

        println!("{},{},{:.3}", system.particle_count(), springs, us);
    }
    Ok(())
}

/// Sweep dt on the default flag and report which runs stay finite
pub fn bench_stability() -> Result<(), SimError> {
    let duration = 2.0; // simulated seconds per run

    let probe = make_system(15, 10, 1.0e4, 1.0e-3)?;
    if let Some(bound) = probe.stable_dt_bound() {
        println!("per-spring bound: dt < {bound:e}");
    }

    println!("dt,steps,finite,kinetic");

    for dt in [1.0e-4, 2.0e-4, 4.0e-4, 8.0e-4, 1.6e-3, 3.2e-3, 6.4e-3, 1.0e-2] {
        let mut system = make_system(15, 10, 1.0e4, dt)?;
        let steps = (duration / dt).ceil() as usize;
        system.step_n(steps);

        let finite = system
            .particles()
            .iter()
            .all(|p| p.position().iter().all(|c| c.is_finite()));

        println!("{:e},{},{},{:.6e}", dt, steps, finite, system.kinetic_energy());
    }
    Ok(())
}
