//! Build fully-initialized cloth scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! [`Scenario`] containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the dynamic system with the fabric installed at t = 0
//! - handles to the global force fields (gravity, wind, air damping)
//! - the renderer-side mesh description of the fabric
//!
//! The scenario is inserted into Bevy as a `Resource` and consumed by the
//! stepping and mesh-sync systems.

use anyhow::Result;
use bevy::log::info;
use bevy::prelude::Resource;

use crate::error::SimError;
use crate::configuration::config::{ScenarioConfig, SolverConfig, ViewerConfig};
use crate::simulation::engine::Engine;
use crate::simulation::forces::{ConstantForceField, DampingForceField};
use crate::simulation::integrator::EulerExplicitSolver;
use crate::simulation::params::Parameters;
use crate::simulation::system::{DynamicSystem, ForceFieldId};
use crate::simulation::topology::{ClothMesh, Fabric, FabricConfig};

/// Bevy resource representing a fully-initialized cloth scenario
#[derive(Resource)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: DynamicSystem,
    pub cloth: ClothMesh,
    pub gravity: ForceFieldId,
    pub wind: Option<ForceFieldId>,
    pub air_damping: ForceFieldId,
    pub viewer: ViewerConfig,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let parameters = Parameters::from(&cfg.parameters);
        let engine = Engine {
            running: cfg.engine.running,
            steps_per_frame: cfg.engine.steps_per_frame,
            solver: cfg.engine.solver,
        };

        let mut system = match engine.solver {
            SolverConfig::EulerExplicit => DynamicSystem::with_solver(EulerExplicitSolver, parameters.dt)?,
        };
        let fabric = Fabric::build(&FabricConfig::from(&cfg.cloth))?;
        let cloth = fabric.install(&mut system)?;
        let (gravity, wind, air_damping) = install_global_fields(&mut system, &parameters)?;

        info!(
            "scenario: {} particles, {} force fields, dt = {:e}",
            system.particle_count(),
            system.force_field_count(),
            system.dt(),
        );
        if let Some(bound) = system.stable_dt_bound() {
            info!("per-spring stability bound: dt < {bound:e}");
        }

        Ok(Self {
            engine,
            parameters,
            system,
            cloth,
            gravity,
            wind,
            air_damping,
            viewer: cfg.viewer,
        })
    }

    /// Change the timestep of the running system, keeping `parameters.dt`
    /// in step with it. Both are left alone on error.
    pub fn set_dt(&mut self, dt: f64) -> Result<(), SimError> {
        self.system.set_dt(dt)?;
        self.parameters.dt = dt;
        Ok(())
    }

    /// Flip the wind field on or off. Returns the new state, `None` when the
    /// scenario has no wind.
    pub fn toggle_wind(&mut self) -> Option<bool> {
        let id = self.wind?;
        let enabled = !self.system.is_force_field_enabled(id)?;
        self.system.set_force_field_enabled(id, enabled).ok()?;
        Some(enabled)
    }
}

/// Gravity, wind and air damping all act on every particle present in the
/// system when they are registered. Gravity and wind are separate fields so
/// either one can be toggled or removed alone.
pub fn install_global_fields(
    system: &mut DynamicSystem,
    parameters: &Parameters,
) -> Result<(ForceFieldId, Option<ForceFieldId>, ForceFieldId), SimError> {
    let all = system.particle_ids();

    let gravity = system.add_force_field(ConstantForceField::new(all.clone(), parameters.gravity))?;
    let wind = match parameters.wind {
        Some(w) => Some(system.add_force_field(ConstantForceField::new(all.clone(), w))?),
        None => None,
    };
    let air_damping = system.add_force_field(DampingForceField::new(all, parameters.damping))?;

    Ok((gravity, wind, air_damping))
}
