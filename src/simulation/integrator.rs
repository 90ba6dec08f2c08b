//! Fixed-step time integration for the mass-spring system
//!
//! A [`Solver`] turns the forces accumulated during a step into new
//! velocities and positions. The only shipped solver is the semi-implicit
//! Euler scheme in [`EulerExplicitSolver`].

use crate::simulation::particle::Particle;

/// Advances particle state by `dt` from the forces already accumulated on
/// each particle. Fixed particles must be left untouched.
pub trait Solver {
    fn solve(&self, dt: f64, particles: &mut [Particle]);
}

/// Semi-implicit (symplectic) Euler:
///
/// ```text
/// v_n+1 = v_n + dt * f_n / m
/// x_n+1 = x_n + dt * v_n+1
/// ```
///
/// The position update uses the velocity computed in the same call, not the
/// velocity the particle entered the step with.
///
/// There is no substepping or error control. For a spring of stiffness `k`
/// between masses the scheme is only stable while `dt < 2 / ω` with
/// `ω = sqrt(k (1/m1 + 1/m2))`; see
/// [`DynamicSystem::stable_dt_bound`](crate::simulation::system::DynamicSystem::stable_dt_bound).
#[derive(Debug, Default, Clone, Copy)]
pub struct EulerExplicitSolver;

impl Solver for EulerExplicitSolver {
    fn solve(&self, dt: f64, particles: &mut [Particle]) {
        for p in particles.iter_mut().filter(|p| !p.is_fixed()) {
            // Kick: v_n+1 = v_n + dt * a_n
            let velocity = p.velocity() + (dt / p.mass()) * p.force();
            p.set_velocity(velocity);

            // Drift with the new velocity: x_n+1 = x_n + dt * v_n+1
            p.set_position(p.position() + dt * velocity);
        }
    }
}
