use approx::assert_abs_diff_eq;

use flagsim::simulation::particle::{NVec3, Particle};
use flagsim::simulation::forces::{ConstantForceField, DampingForceField, ForceField, SpringForceField};
use flagsim::simulation::system::{DynamicSystem, ForceFieldId};
use flagsim::simulation::engine::Engine;
use flagsim::configuration::config::SolverConfig;
use flagsim::error::SimError;

/// Build a system holding one free particle of mass 1 at the origin
pub fn single_particle_system(dt: f64) -> DynamicSystem {
    let mut sys = DynamicSystem::new(dt).unwrap();
    sys.add_particle(Particle::new(NVec3::zeros(), NVec3::zeros(), 1.0, 0.01));
    sys
}

/// Build two free particles separated by `dist` along x, joined by a spring
pub fn two_particle_spring(dist: f64, stiffness: f64, rest_length: f64, damping: f64) -> DynamicSystem {
    let mut sys = DynamicSystem::new(1.0e-3).unwrap();
    let a = sys.add_particle(Particle::new(NVec3::new(-dist / 2.0, 0.0, 0.0), NVec3::zeros(), 1.0, 0.01));
    let b = sys.add_particle(Particle::new(NVec3::new(dist / 2.0, 0.0, 0.0), NVec3::zeros(), 1.0, 0.01));
    sys.add_force_field(SpringForceField::new(a, b, stiffness, rest_length, damping)).unwrap();
    sys
}

pub fn total_energy(sys: &DynamicSystem) -> f64 {
    sys.kinetic_energy() + sys.potential_energy()
}

// ==================================================================================
// Integration
// ==================================================================================

#[test]
fn free_fall_matches_closed_form() {
    let mut sys = single_particle_system(0.01);
    let g = NVec3::new(0.0, -9.8, 0.0);
    sys.add_force_field(ConstantForceField::new(vec![0], g)).unwrap();

    let n = 100;
    sys.step_n(n);

    // Semi-implicit Euler: v_N = N dt g, x_N = g dt² N(N+1)/2
    let dt = 0.01;
    let p = sys.particle(0).unwrap();
    assert_abs_diff_eq!(p.velocity(), g * (n as f64 * dt), epsilon = 1e-9);
    assert_abs_diff_eq!(p.position(), g * (dt * dt * (n * (n + 1)) as f64 / 2.0), epsilon = 1e-9);
    assert_abs_diff_eq!(p.position().y, -4.949, epsilon = 1e-9);
    assert_abs_diff_eq!(sys.time(), 1.0, epsilon = 1e-9);
}

#[test]
fn velocity_is_updated_before_position() {
    let mut sys = single_particle_system(0.5);
    sys.add_force_field(ConstantForceField::new(vec![0], NVec3::new(2.0, 0.0, 0.0))).unwrap();
    sys.step();

    let p = sys.particle(0).unwrap();
    // v = 0 + dt * f / m = 1, then x = 0 + dt * v = 0.5
    assert_abs_diff_eq!(p.velocity().x, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(p.position().x, 0.5, epsilon = 1e-12);
}

#[test]
fn fixed_particles_never_move() {
    let mut sys = DynamicSystem::new(1.0e-3).unwrap();
    let anchor = sys.add_particle(Particle::anchored(NVec3::new(0.1, 0.2, 0.3), 1.0, 0.01));
    let free = sys.add_particle(Particle::new(NVec3::new(1.1, 0.2, 0.3), NVec3::zeros(), 1.0, 0.01));
    sys.add_force_field(SpringForceField::new(anchor, free, 1.0e3, 0.5, 1.0)).unwrap();
    sys.add_force_field(ConstantForceField::new(vec![anchor, free], NVec3::new(0.0, -9.81, 0.0))).unwrap();

    let before = *sys.particle(anchor).unwrap();
    sys.step_n(1000);
    let after = sys.particle(anchor).unwrap();

    assert_eq!(before.position(), after.position());
    assert_eq!(after.velocity(), NVec3::zeros());
    // The free end did move
    assert!(sys.particle(free).unwrap().position() != NVec3::new(1.1, 0.2, 0.3));
}

#[test]
fn forces_are_reset_every_step() {
    let mut sys = single_particle_system(0.1);
    sys.add_force_field(ConstantForceField::new(vec![0], NVec3::new(0.0, 0.0, 3.0))).unwrap();
    sys.step_n(5);

    assert_abs_diff_eq!(sys.particle(0).unwrap().force(), NVec3::new(0.0, 0.0, 3.0), epsilon = 1e-12);
}

// ==================================================================================
// Spring tests
// ==================================================================================

#[test]
fn spring_at_rest_length_exerts_nothing() {
    let sys = two_particle_spring(0.5, 1.0e4, 0.5, 1.0);
    let (_, field) = sys.force_fields().next().unwrap();
    let ForceField::Spring(spring) = field else {
        panic!("expected a spring, got {:?}", field);
    };

    let f = spring.force_on_p1(sys.particles()).unwrap();
    assert_abs_diff_eq!(f, NVec3::zeros(), epsilon = 1e-9);
}

#[test]
fn stretched_spring_pulls_endpoints_together() {
    let mut sys = two_particle_spring(2.0, 10.0, 1.0, 0.0);
    sys.step();

    let a = sys.particle(0).unwrap().force();
    let b = sys.particle(1).unwrap().force();

    // p1 sits at -x, so it is pulled towards +x with k * stretch
    assert_abs_diff_eq!(a, NVec3::new(10.0, 0.0, 0.0), epsilon = 1e-12);
    assert_abs_diff_eq!(a + b, NVec3::zeros(), epsilon = 1e-12);
}

#[test]
fn coincident_endpoints_are_skipped() {
    let mut sys = DynamicSystem::new(1.0e-3).unwrap();
    let a = sys.add_particle(Particle::new(NVec3::new(0.3, 0.3, 0.3), NVec3::zeros(), 1.0, 0.01));
    let b = sys.add_particle(Particle::new(NVec3::new(0.3, 0.3, 0.3), NVec3::zeros(), 1.0, 0.01));
    let spring = SpringForceField::new(a, b, 1.0e4, 0.1, 1.0);
    assert!(spring.force_on_p1(sys.particles()).is_none());

    sys.add_force_field(spring).unwrap();
    sys.step();
    assert_eq!(sys.particle(a).unwrap().force(), NVec3::zeros());
    assert_eq!(sys.particle(b).unwrap().force(), NVec3::zeros());
    assert_eq!(sys.particle(a).unwrap().position(), NVec3::new(0.3, 0.3, 0.3));

    sys.step_n(10);

    for p in sys.particles() {
        assert!(p.position().iter().all(|c| c.is_finite()));
        assert!(p.velocity().iter().all(|c| c.is_finite()));
    }
}

#[test]
fn damped_spring_loses_energy() {
    let mut sys = two_particle_spring(1.5, 100.0, 1.0, 2.0);
    let initial = total_energy(&sys);

    let mut previous = initial;
    for _ in 0..10 {
        sys.step_n(200);
        let e = total_energy(&sys);
        assert!(e < previous, "energy grew from {previous} to {e}");
        previous = e;
    }
    assert!(previous < 0.01 * initial, "energy {previous} barely decayed from {initial}");
}

#[test]
fn damping_field_opposes_velocity() {
    let mut sys = DynamicSystem::new(1.0e-3).unwrap();
    sys.add_particle(Particle::new(NVec3::zeros(), NVec3::new(1.0, -2.0, 0.5), 1.0, 0.01));
    sys.add_force_field(DampingForceField::new(vec![0], 0.5)).unwrap();
    sys.step();

    // Force computed from the velocity before the update
    assert_abs_diff_eq!(sys.particle(0).unwrap().force(), NVec3::new(-0.5, 1.0, -0.25), epsilon = 1e-12);
}

#[test]
fn zero_damping_is_a_no_op() {
    let mut sys = DynamicSystem::new(1.0e-2).unwrap();
    let v = NVec3::new(1.0, -2.0, 0.5);
    sys.add_particle(Particle::new(NVec3::zeros(), v, 1.0, 0.01));
    sys.add_force_field(DampingForceField::new(vec![0], 0.0)).unwrap();
    sys.step_n(5);

    let p = sys.particle(0).unwrap();
    assert_eq!(p.force(), NVec3::zeros());
    assert_eq!(p.velocity(), v);
}

#[test]
fn stability_bound_follows_stiffness_and_mass() {
    let sys = two_particle_spring(1.0, 200.0, 1.0, 0.0);
    // ω = sqrt(200 * (1 + 1)) = 20
    assert_abs_diff_eq!(sys.stable_dt_bound().unwrap(), 0.1, epsilon = 1e-12);

    let empty = single_particle_system(1.0e-3);
    assert!(empty.stable_dt_bound().is_none());
}

// ==================================================================================
// Force field registry
// ==================================================================================

#[test]
fn disabled_field_contributes_nothing() {
    let mut sys = single_particle_system(0.01);
    let wind = sys.add_force_field(ConstantForceField::new(vec![0], NVec3::new(5.0, 0.0, 0.0))).unwrap();
    sys.set_force_field_enabled(wind, false).unwrap();
    sys.step_n(10);

    assert_eq!(sys.particle(0).unwrap().position(), NVec3::zeros());
    assert_eq!(sys.is_force_field_enabled(wind), Some(false));

    sys.set_force_field_enabled(wind, true).unwrap();
    sys.step();
    assert!(sys.particle(0).unwrap().position().x > 0.0);
}

#[test]
fn removed_field_contributes_nothing() {
    let mut sys = single_particle_system(0.01);
    let gravity = sys.add_force_field(ConstantForceField::new(vec![0], NVec3::new(0.0, -9.8, 0.0))).unwrap();
    let wind = sys.add_force_field(ConstantForceField::new(vec![0], NVec3::new(1.0, 0.0, 0.0))).unwrap();

    let removed = sys.remove_force_field(wind).unwrap();
    assert!(matches!(removed, ForceField::Constant(_)));
    assert_eq!(sys.force_field_count(), 1);
    assert!(sys.force_field(gravity).is_some());

    sys.step_n(10);
    assert_eq!(sys.particle(0).unwrap().position().x, 0.0);
    assert!(sys.particle(0).unwrap().position().y < 0.0);

    assert_eq!(sys.remove_force_field(wind), Err(SimError::UnknownForceField(wind.0)));
    assert_eq!(sys.set_force_field_enabled(ForceFieldId(99), true), Err(SimError::UnknownForceField(99)));
}

#[test]
fn field_with_unknown_particle_is_rejected() {
    let mut sys = two_particle_spring(1.0, 1.0, 1.0, 0.0);
    let err = sys.add_force_field(SpringForceField::new(0, 5, 1.0, 1.0, 0.0)).unwrap_err();
    assert_eq!(err, SimError::ParticleOutOfBounds { index: 5, count: 2 });

    let err = sys.add_force_field(ConstantForceField::new(vec![0, 1, 2], NVec3::zeros())).unwrap_err();
    assert_eq!(err, SimError::ParticleOutOfBounds { index: 2, count: 2 });
    assert_eq!(sys.force_field_count(), 1);
}

// ==================================================================================
// Timestep and engine
// ==================================================================================

#[test]
fn invalid_timestep_is_rejected() {
    assert_eq!(DynamicSystem::new(0.0).err(), Some(SimError::InvalidTimestep(0.0)));
    assert!(DynamicSystem::new(f64::NAN).is_err());

    let mut sys = single_particle_system(0.01);
    sys.add_force_field(ConstantForceField::new(vec![0], NVec3::new(0.0, -9.8, 0.0))).unwrap();
    sys.step_n(3);
    let before = *sys.particle(0).unwrap();

    assert_eq!(sys.set_dt(-1.0), Err(SimError::InvalidTimestep(-1.0)));
    assert!(sys.set_dt(f64::INFINITY).is_err());
    assert_eq!(sys.dt(), 0.01);
    assert_eq!(*sys.particle(0).unwrap(), before);

    sys.set_dt(0.02).unwrap();
    assert_eq!(sys.dt(), 0.02);
    assert_eq!(*sys.particle(0).unwrap(), before);
}

#[test]
fn set_time_moves_the_clock_only() {
    let mut sys = single_particle_system(0.01);
    sys.step_n(3);
    sys.set_time(10.0);
    assert_eq!(sys.time(), 10.0);

    sys.step();
    assert_abs_diff_eq!(sys.time(), 10.01, epsilon = 1e-12);
}

#[test]
fn write_positions_reuses_buffer() {
    let mut sys = two_particle_spring(1.5, 10.0, 1.0, 0.0);
    sys.step_n(7);

    let mut out = vec![NVec3::new(9.0, 9.0, 9.0); 5];
    sys.write_positions(&mut out);
    assert_eq!(out, sys.positions());
    assert_eq!(out.len(), 2);
}

#[test]
fn particles_can_be_pinned_between_steps() {
    let mut sys = single_particle_system(0.01);
    sys.add_force_field(ConstantForceField::new(vec![0], NVec3::new(0.0, -9.8, 0.0))).unwrap();
    sys.step_n(10);

    let p = sys.particle_mut(0).unwrap();
    p.set_fixed(true);
    p.set_velocity(NVec3::zeros());
    let pinned_at = p.position();
    sys.step_n(10);
    assert_eq!(sys.particle(0).unwrap().position(), pinned_at);
    assert!(sys.particle_mut(3).is_none());

    for p in sys.particles_mut() {
        p.set_fixed(false);
        p.set_position(NVec3::zeros());
    }
    sys.step();
    let p = sys.particle(0).unwrap();
    assert!(p.position().y < 0.0);
    assert!(p.position().y > -0.01);
}

#[test]
fn stopped_engine_does_not_step() {
    let mut sys = single_particle_system(0.01);
    sys.add_force_field(ConstantForceField::new(vec![0], NVec3::new(0.0, -9.8, 0.0))).unwrap();

    let mut engine = Engine {
        running: false,
        steps_per_frame: 4,
        solver: SolverConfig::EulerExplicit,
    };
    assert_eq!(engine.advance(&mut sys), 0);
    assert_eq!(sys.time(), 0.0);
    assert_eq!(sys.particle(0).unwrap().position(), NVec3::zeros());

    assert!(engine.toggle());
    assert_eq!(engine.advance(&mut sys), 4);
    assert_abs_diff_eq!(sys.time(), 0.04, epsilon = 1e-12);

    engine.stop();
    let frozen = sys.positions();
    engine.advance(&mut sys);
    assert_eq!(sys.positions(), frozen);
}
