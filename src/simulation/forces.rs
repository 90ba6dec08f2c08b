//! Force fields for the mass-spring engine
//!
//! A force field is a rule that computes a force and adds it into the
//! accumulator of the particles it targets. Fields never own particles: they
//! hold [`ParticleId`]s into the arena owned by the `DynamicSystem`.
//!
//! - [`ConstantForceField`] – same vector on every target (gravity, wind)
//! - [`DampingForceField`]  – air friction, proportional to velocity
//! - [`SpringForceField`]   – damped Hooke spring between two particles

use crate::simulation::particle::{NVec3, Particle, ParticleId};

/// Every force kind the engine knows about, dispatched by `match`
#[derive(Debug, Clone, PartialEq)]
pub enum ForceField {
    Constant(ConstantForceField),
    Damping(DampingForceField),
    Spring(SpringForceField),
}

impl ForceField {
    /// Add this field's contribution into the force accumulator of each target
    pub fn add_force(&self, particles: &mut [Particle]) {
        match self {
            ForceField::Constant(f) => f.add_force(particles),
            ForceField::Damping(f) => f.add_force(particles),
            ForceField::Spring(f) => f.add_force(particles),
        }
    }

    /// Particle ids this field reads or writes
    pub fn targets(&self) -> Vec<ParticleId> {
        match self {
            ForceField::Constant(f) => f.targets.clone(),
            ForceField::Damping(f) => f.targets.clone(),
            ForceField::Spring(f) => vec![f.p1, f.p2],
        }
    }

    /// Shift every referenced id by `offset`, used when a fabric built with
    /// local ids is moved into a system that already holds particles
    pub(crate) fn offset_targets(&mut self, offset: usize) {
        match self {
            ForceField::Constant(f) => f.targets.iter_mut().for_each(|id| *id += offset),
            ForceField::Damping(f) => f.targets.iter_mut().for_each(|id| *id += offset),
            ForceField::Spring(f) => {
                f.p1 += offset;
                f.p2 += offset;
            }
        }
    }
}

impl From<ConstantForceField> for ForceField {
    fn from(f: ConstantForceField) -> Self {
        ForceField::Constant(f)
    }
}

impl From<DampingForceField> for ForceField {
    fn from(f: DampingForceField) -> Self {
        ForceField::Damping(f)
    }
}

impl From<SpringForceField> for ForceField {
    fn from(f: SpringForceField) -> Self {
        ForceField::Spring(f)
    }
}

// =========================================================================================
// Constant
// =========================================================================================

/// Uniform force applied to every target. Gravity and wind are both this
/// field with different vectors, registered as separate instances.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantForceField {
    pub targets: Vec<ParticleId>,
    pub force: NVec3,
}

impl ConstantForceField {
    pub fn new(targets: Vec<ParticleId>, force: NVec3) -> Self {
        Self { targets, force }
    }

    pub fn add_force(&self, particles: &mut [Particle]) {
        for &id in &self.targets {
            let p = &mut particles[id];
            p.set_force(p.force() + self.force);
        }
    }
}

// =========================================================================================
// Damping
// =========================================================================================

/// Viscous drag: f = -coefficient * v. A zero coefficient is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct DampingForceField {
    pub targets: Vec<ParticleId>,
    pub coefficient: f64,
}

impl DampingForceField {
    pub fn new(targets: Vec<ParticleId>, coefficient: f64) -> Self {
        Self { targets, coefficient }
    }

    pub fn add_force(&self, particles: &mut [Particle]) {
        for &id in &self.targets {
            let p = &mut particles[id];
            p.set_force(p.force() - self.coefficient * p.velocity());
        }
    }
}

// =========================================================================================
// Spring
// =========================================================================================

/// Damped spring between `p1` and `p2`
#[derive(Debug, Clone, PartialEq)]
pub struct SpringForceField {
    pub p1: ParticleId,
    pub p2: ParticleId,
    pub stiffness: f64, // k
    pub rest_length: f64, // l0
    pub damping: f64, // axial damping coefficient
}

impl SpringForceField {
    pub fn new(p1: ParticleId, p2: ParticleId, stiffness: f64, rest_length: f64, damping: f64) -> Self {
        Self {
            p1,
            p2,
            stiffness,
            rest_length,
            damping,
        }
    }

    /// Spring force acting on `p1`. `p2` receives the opposite.
    /// Returns `None` when both endpoints coincide (within machine epsilon).
    pub fn force_on_p1(&self, particles: &[Particle]) -> Option<NVec3> {
        let a = &particles[self.p1];
        let b = &particles[self.p2];

        // Displacement from p2 to p1 and its length
        let displacement = a.position() - b.position();
        let length = displacement.norm();

        // Direction is undefined for coincident endpoints
        if length <= f64::EPSILON {
            return None;
        }
        let unit = displacement / length;

        // Hooke: pulls together when stretched, pushes apart when compressed
        let stiffness_force = -self.stiffness * (length - self.rest_length) * unit;

        // Only the relative velocity along the spring axis is damped,
        // lateral motion is left alone
        let relative_velocity = a.velocity() - b.velocity();
        let damping_force = -self.damping * relative_velocity.dot(&unit) * unit;

        Some(stiffness_force + damping_force)
    }

    pub fn add_force(&self, particles: &mut [Particle]) {
        if let Some(total) = self.force_on_p1(particles) {
            let a = &mut particles[self.p1];
            a.set_force(a.force() + total);
            let b = &mut particles[self.p2];
            b.set_force(b.force() - total);
        }
    }

    /// Current distance between the endpoints
    pub fn length(&self, particles: &[Particle]) -> f64 {
        (particles[self.p1].position() - particles[self.p2].position()).norm()
    }

    /// Elastic energy ½ k (l - l0)²
    pub fn potential_energy(&self, particles: &[Particle]) -> f64 {
        let stretch = self.length(particles) - self.rest_length;
        0.5 * self.stiffness * stretch * stretch
    }

    /// Undamped angular frequency of this spring taken alone,
    /// sqrt(k * (1/m1 + 1/m2)) over the free endpoints.
    /// `None` when both endpoints are fixed.
    pub fn natural_frequency(&self, particles: &[Particle]) -> Option<f64> {
        let inv_mass = |p: &Particle| if p.is_fixed() { 0.0 } else { p.mass().recip() };
        let inv_sum = inv_mass(&particles[self.p1]) + inv_mass(&particles[self.p2]);
        if inv_sum <= 0.0 {
            return None;
        }
        Some((self.stiffness * inv_sum).sqrt())
    }
}
