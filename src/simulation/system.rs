//! The dynamic system: particle arena, force field registry and the step loop
//!
//! `DynamicSystem` owns every particle and every force field. Force fields
//! refer to particles by [`ParticleId`], a slot index into the arena that is
//! never reused, so there is no shared ownership between the two.
//!
//! One call to [`DynamicSystem::step`] runs:
//! 1. clear every particle's force accumulator
//! 2. `add_force` for each enabled field, in registration order
//! 3. `solver.solve(dt, particles)`
//! 4. `t += dt`

use bevy::log::{debug, warn};

use crate::error::SimError;
use crate::simulation::forces::{ForceField, SpringForceField};
use crate::simulation::integrator::{EulerExplicitSolver, Solver};
use crate::simulation::particle::{NVec3, Particle, ParticleId};

/// Handle returned when a force field is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForceFieldId(pub usize);

#[derive(Debug)]
struct ForceFieldEntry {
    id: ForceFieldId,
    field: ForceField,
    enabled: bool,
}

pub struct DynamicSystem {
    particles: Vec<Particle>,
    force_fields: Vec<ForceFieldEntry>, // registration order
    next_field_id: usize,
    solver: Box<dyn Solver + Send + Sync>,
    dt: f64, // fixed step, > 0
    t: f64, // elapsed simulated time
}

impl DynamicSystem {
    pub fn new(dt: f64) -> Result<Self, SimError> {
        Self::with_solver(EulerExplicitSolver, dt)
    }

    pub fn with_solver<S>(solver: S, dt: f64) -> Result<Self, SimError>
    where
        S: Solver + Send + Sync + 'static,
    {
        check_dt(dt)?;
        Ok(Self {
            particles: Vec::new(),
            force_fields: Vec::new(),
            next_field_id: 0,
            solver: Box::new(solver),
            dt,
            t: 0.0,
        })
    }

    // =====================================================================================
    // Particles
    // =====================================================================================

    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        self.particles.push(particle);
        self.particles.len() - 1
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access between steps (pinning, teleporting, ...).
    /// The arena itself cannot grow or shrink through this slice.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.get_mut(id)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Ids of every particle currently in the system
    pub fn particle_ids(&self) -> Vec<ParticleId> {
        (0..self.particles.len()).collect()
    }

    /// Ordered snapshot of every particle position, index = `ParticleId`
    pub fn positions(&self) -> Vec<NVec3> {
        self.particles.iter().map(Particle::position).collect()
    }

    /// Same as [`positions`](Self::positions) but reuses the caller's buffer
    pub fn write_positions(&self, out: &mut Vec<NVec3>) {
        out.clear();
        out.extend(self.particles.iter().map(Particle::position));
    }

    // =====================================================================================
    // Force fields
    // =====================================================================================

    /// Register a force field. Fails if it references a particle that is not
    /// in the system.
    pub fn add_force_field(&mut self, field: impl Into<ForceField>) -> Result<ForceFieldId, SimError> {
        let field = field.into();
        let count = self.particles.len();
        if let Some(&index) = field.targets().iter().find(|&&id| id >= count) {
            return Err(SimError::ParticleOutOfBounds { index, count });
        }

        let id = ForceFieldId(self.next_field_id);
        self.next_field_id += 1;
        self.force_fields.push(ForceFieldEntry {
            id,
            field,
            enabled: true,
        });
        Ok(id)
    }

    pub fn remove_force_field(&mut self, id: ForceFieldId) -> Result<ForceField, SimError> {
        let pos = self
            .force_fields
            .iter()
            .position(|e| e.id == id)
            .ok_or(SimError::UnknownForceField(id.0))?;
        Ok(self.force_fields.remove(pos).field)
    }

    /// Disabled fields stay registered but are skipped by `step`
    pub fn set_force_field_enabled(&mut self, id: ForceFieldId, enabled: bool) -> Result<(), SimError> {
        let entry = self.entry_mut(id)?;
        entry.enabled = enabled;
        Ok(())
    }

    pub fn is_force_field_enabled(&self, id: ForceFieldId) -> Option<bool> {
        self.force_fields.iter().find(|e| e.id == id).map(|e| e.enabled)
    }

    pub fn force_field(&self, id: ForceFieldId) -> Option<&ForceField> {
        self.force_fields.iter().find(|e| e.id == id).map(|e| &e.field)
    }

    /// Registered fields in registration order
    pub fn force_fields(&self) -> impl Iterator<Item = (ForceFieldId, &ForceField)> {
        self.force_fields.iter().map(|e| (e.id, &e.field))
    }

    pub fn force_field_count(&self) -> usize {
        self.force_fields.len()
    }

    fn entry_mut(&mut self, id: ForceFieldId) -> Result<&mut ForceFieldEntry, SimError> {
        self.force_fields
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(SimError::UnknownForceField(id.0))
    }

    // =====================================================================================
    // Time
    // =====================================================================================

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Change the timestep between steps. Particle state is kept as is.
    pub fn set_dt(&mut self, dt: f64) -> Result<(), SimError> {
        check_dt(dt)?;
        if let Some(bound) = self.stable_dt_bound() {
            if dt >= bound {
                warn!("dt = {dt:e} exceeds the spring stability bound {bound:e}, expect divergence");
            }
        }
        self.dt = dt;
        Ok(())
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn set_time(&mut self, t: f64) {
        self.t = t;
    }

    /// Advance the whole system by one `dt`
    pub fn step(&mut self) {
        // Hard reset, fields only ever accumulate
        for p in self.particles.iter_mut() {
            p.set_force(NVec3::zeros());
        }

        for entry in self.force_fields.iter().filter(|e| e.enabled) {
            entry.field.add_force(&mut self.particles);
        }

        self.solver.solve(self.dt, &mut self.particles);

        self.t += self.dt;
    }

    /// Run `n` consecutive steps
    pub fn step_n(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
        debug!("stepped {n} times, t = {:.4}", self.t);
    }

    // =====================================================================================
    // Diagnostics
    // =====================================================================================

    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    /// Elastic energy stored in every enabled spring
    pub fn potential_energy(&self) -> f64 {
        self.enabled_springs()
            .map(|s| s.potential_energy(&self.particles))
            .sum()
    }

    /// Largest timestep the stiffest spring tolerates: min over springs of 2/ω.
    ///
    /// This is a per-spring estimate. A particle joined to several springs
    /// oscillates faster than any single one, so practical timesteps should
    /// stay well below it. `None` when no enabled spring has a free endpoint.
    pub fn stable_dt_bound(&self) -> Option<f64> {
        self.enabled_springs()
            .filter_map(|s| s.natural_frequency(&self.particles))
            .filter(|w| *w > 0.0)
            .map(|w| 2.0 / w)
            .reduce(f64::min)
    }

    fn enabled_springs(&self) -> impl Iterator<Item = &SpringForceField> {
        self.force_fields.iter().filter(|e| e.enabled).filter_map(|e| match &e.field {
            ForceField::Spring(s) => Some(s),
            _ => None,
        })
    }
}

fn check_dt(dt: f64) -> Result<(), SimError> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidTimestep(dt))
    }
}
