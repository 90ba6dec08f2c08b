//! Point masses simulated by a [`DynamicSystem`](crate::simulation::system::DynamicSystem).
//!
//! A particle carries its own state (position, velocity, mass) plus a force
//! accumulator that is cleared at the start of every step and filled by the
//! registered force fields before the solver reads it.

use nalgebra::Vector3;

pub type NVec3 = Vector3<f64>;

/// Slot index of a particle inside its owning system.
pub type ParticleId = usize;

/// A point mass.
///
/// `mass` must be strictly positive. It is not validated: a zero or negative
/// mass makes the solver divide by it and propagates `inf`/`NaN` into the
/// particle state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    position: NVec3, // x
    velocity: NVec3, // v
    force: NVec3, // accumulated force, reset every step
    mass: f64, // m > 0
    radius: f64, // visual radius only, no collisions
    fixed: bool, // anchored particles are skipped by the solver
}

impl Particle {
    pub fn new(position: NVec3, velocity: NVec3, mass: f64, radius: f64) -> Self {
        Self {
            position,
            velocity,
            force: NVec3::zeros(),
            mass,
            radius,
            fixed: false,
        }
    }

    /// A particle that never moves
    pub fn anchored(position: NVec3, mass: f64, radius: f64) -> Self {
        Self {
            fixed: true,
            ..Self::new(position, NVec3::zeros(), mass, radius)
        }
    }

    pub fn position(&self) -> NVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: NVec3) {
        self.position = position;
    }

    pub fn velocity(&self) -> NVec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: NVec3) {
        self.velocity = velocity;
    }

    pub fn force(&self) -> NVec3 {
        self.force
    }

    /// Overwrites the accumulated force. Force fields add to it with
    /// `set_force(force() + contribution)`.
    pub fn set_force(&mut self, force: NVec3) {
        self.force = force;
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    /// ½ m |v|²
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }
}
