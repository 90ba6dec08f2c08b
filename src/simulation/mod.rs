pub mod particle;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod system;
pub mod topology;
pub mod scenario;
