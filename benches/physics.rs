//! Benchmarks for the mass-spring cloth engine.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flagsim::*;

fn flag_system(h: usize, v: usize, shear: bool) -> DynamicSystem {
    let mut system = DynamicSystem::new(8.0e-4).unwrap();
    let config = FabricConfig::new(0.65, 1.1, h, v, 1.0e4, 1.0).with_shear(shear);
    Fabric::build(&config).unwrap().install(&mut system).unwrap();

    let all = system.particle_ids();
    system.add_force_field(ConstantForceField::new(all.clone(), NVec3::new(0.0, -9.81, 0.0))).unwrap();
    system.add_force_field(ConstantForceField::new(all.clone(), NVec3::new(3.0, 2.0, -20.0))).unwrap();
    system.add_force_field(DampingForceField::new(all, 1.0)).unwrap();
    system
}

fn bench_flag_frame(c: &mut Criterion) {
    c.bench_function("flag_15x10_20_steps", |b| {
        let mut system = flag_system(15, 10, false);
        b.iter(|| {
            system.step_n(20);
            black_box(system.particle(0).map(Particle::position))
        });
    });
}

fn bench_large_cloth(c: &mut Criterion) {
    c.bench_function("cloth_100x100_shear_1_step", |b| {
        let mut system = flag_system(100, 100, true);
        b.iter(|| {
            system.step();
            black_box(system.time())
        });
    });
}

fn bench_fabric_build(c: &mut Criterion) {
    c.bench_function("fabric_build_100x100", |b| {
        let config = FabricConfig::new(1.0, 1.0, 100, 100, 1.0e4, 1.0)
            .with_shear(true)
            .with_bend(true);
        b.iter(|| Fabric::build(black_box(&config)).unwrap().springs.len());
    });
}

fn bench_mesh_sync(c: &mut Criterion) {
    c.bench_function("mesh_positions_normals_100x100", |b| {
        let mut system = DynamicSystem::new(1.0e-3).unwrap();
        let cloth = Fabric::build(&FabricConfig::new(1.0, 1.0, 100, 100, 1.0e4, 1.0))
            .unwrap()
            .install(&mut system)
            .unwrap();
        b.iter(|| {
            let positions = cloth.positions(&system);
            cloth.normals(&positions)
        });
    });
}

criterion_group!(benches, bench_flag_frame, bench_large_cloth, bench_fabric_build, bench_mesh_sync);
criterion_main!(benches);
