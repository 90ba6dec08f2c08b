pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;
pub mod error;

pub use simulation::particle::{Particle, ParticleId, NVec3};
pub use simulation::forces::{ForceField, ConstantForceField, DampingForceField, SpringForceField};
pub use simulation::integrator::{Solver, EulerExplicitSolver};
pub use simulation::system::{DynamicSystem, ForceFieldId};
pub use simulation::topology::{Fabric, FabricConfig, FabricPlane, EdgeFixing, ClothMesh};
pub use simulation::engine::Engine;
pub use simulation::params::Parameters;
pub use simulation::scenario::Scenario;

pub use configuration::config::{ScenarioConfig, EngineConfig, ParametersConfig, ClothConfig, ViewerConfig, SolverConfig};

pub use visualization::{flag_vis3d::run_3d, headless::run_headless};

pub use benchmark::benchmark::{bench_step, bench_stability};

pub use error::SimError;
