//! Error types for building and configuring a simulation.
//!
//! Only construction-time contract violations are errors. Numerical trouble
//! during a step (coincident spring endpoints, unstable timesteps, bad masses)
//! is never reported here.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Timestep must be positive and finite.
    InvalidTimestep(f64),
    /// A fabric needs at least 2 samples in each direction.
    InvalidGridDimensions { horizontal: usize, vertical: usize },
    /// Fabric width and height must be positive and finite.
    InvalidExtent { width: f64, height: f64 },
    /// A force field or edge policy referenced a particle that does not exist.
    ParticleOutOfBounds { index: usize, count: usize },
    /// No force field is registered under this id.
    UnknownForceField(usize),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidTimestep(dt) => {
                write!(f, "timestep must be positive and finite (got {})", dt)
            }
            SimError::InvalidGridDimensions { horizontal, vertical } => write!(
                f,
                "fabric must be at least 2x2 (got {}x{})",
                horizontal, vertical
            ),
            SimError::InvalidExtent { width, height } => write!(
                f,
                "fabric extent must be positive (got {} x {})",
                width, height
            ),
            SimError::ParticleOutOfBounds { index, count } => {
                write!(f, "particle index {} out of bounds (count: {})", index, count)
            }
            SimError::UnknownForceField(id) => write!(f, "no force field with id {}", id),
        }
    }
}

impl std::error::Error for SimError {}
