//! Animation driver state
//!
//! Decides whether and how often `DynamicSystem::step` runs for each rendered
//! frame. When stopped, particle positions stay frozen at their last values.

use crate::configuration::config::SolverConfig;
use crate::simulation::system::DynamicSystem;

#[derive(Debug, Clone)]
pub struct Engine {
    pub running: bool, // start/stop toggle
    pub steps_per_frame: usize, // step() calls per rendered frame
    pub solver: SolverConfig, // euler_explicit
}

impl Engine {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Flip the start/stop state, returns the new state
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Advance `system` by one frame worth of steps.
    /// Returns how many steps actually ran (0 while stopped).
    pub fn advance(&self, system: &mut DynamicSystem) -> usize {
        if !self.running {
            return 0;
        }
        system.step_n(self.steps_per_frame);
        self.steps_per_frame
    }
}
