//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - integration step size `dt`,
//! - global force vectors (gravity, optional wind),
//! - air friction coefficient applied to every particle

use crate::simulation::particle::NVec3;

pub const GRAVITY: NVec3 = NVec3::new(0.0, -9.81, 0.0);

#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64, // step size
    pub gravity: NVec3, // constant force on every particle
    pub wind: Option<NVec3>, // constant force, registered separately from gravity
    pub damping: f64, // air friction coefficient
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            dt: 1.0e-3,
            gravity: GRAVITY,
            wind: None,
            damping: 0.0,
        }
    }
}
