use bevy::app::AppExit;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::simulation::scenario::Scenario;

/// Frames left before the headless app exits
#[derive(Resource)]
struct FrameBudget {
    remaining: usize,
    total: usize,
}

/// Drive the scenario without a window: `frames` engine frames, then exit
/// with a summary of the final state.
pub fn run_headless(scenario: Scenario, frames: usize) {
    App::new()
        .insert_resource(scenario)
        .insert_resource(FrameBudget {
            remaining: frames,
            total: frames,
        })
        .add_plugins((MinimalPlugins, LogPlugin::default()))
        .add_systems(Startup, announce)
        .add_systems(Update, headless_step)
        .run();
}

fn announce(scenario: Res<Scenario>, budget: Res<FrameBudget>) {
    info!(
        "headless: {} frames x {} steps, dt = {:e}",
        budget.total,
        scenario.engine.steps_per_frame,
        scenario.system.dt(),
    );
    if !scenario.engine.running {
        warn!("engine starts stopped, the system will not move");
    }
}

fn headless_step(
    mut scenario: ResMut<Scenario>,
    mut budget: ResMut<FrameBudget>,
    mut exit: EventWriter<AppExit>,
) {
    if budget.remaining == 0 {
        report(&scenario);
        exit.send(AppExit::Success);
        return;
    }

    let Scenario {
        engine,
        system,
        ..
    } = &mut *scenario;
    engine.advance(system);
    budget.remaining -= 1;
}

fn report(scenario: &Scenario) {
    let system = &scenario.system;
    let diverged = system
        .particles()
        .iter()
        .any(|p| !p.position().iter().all(|c| c.is_finite()));

    let lowest = system
        .particles()
        .iter()
        .map(|p| p.position().y)
        .fold(f64::INFINITY, f64::min);

    info!(
        "t = {:.4}, kinetic = {:.6e}, potential = {:.6e}, lowest y = {:.4}",
        system.time(),
        system.kinetic_energy(),
        system.potential_energy(),
        lowest,
    );
    if diverged {
        warn!("non-finite positions, dt = {:e} is too large for this cloth", system.dt());
    }
}
