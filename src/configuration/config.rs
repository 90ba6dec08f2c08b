//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! cloth scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – animation driver options (running, steps per frame, solver)
//! - [`ParametersConfig`] – timestep and global force fields
//! - [`ClothConfig`]      – the fabric grid, its springs and anchored particles
//! - [`ViewerConfig`]     – optional renderer settings
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A flag fixed along both vertical edges, blown by wind:
//!
//! ```yaml
//! engine:
//!   running: true
//!   steps_per_frame: 20
//!   solver: euler_explicit
//!
//! parameters:
//!   dt: 8.0e-4
//!   gravity: [0.0, -9.81, 0.0]
//!   wind: [3.0, 2.0, -20.0]
//!   damping: 1.0
//!
//! cloth:
//!   width: 0.65
//!   height: 1.1
//!   horizontal_resolution: 15
//!   vertical_resolution: 10
//!   stiffness: 1.0e4
//!   damping: 1.0
//!   fixed: both_edges        # none | left_edge | right_edge | both_edges
//!   # fixed: { indices: [3, 8, 112] }
//! ```
//!
//! The scenario builder maps this configuration into the runtime types in
//! [`crate::simulation`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::simulation::particle::NVec3;
use crate::simulation::params::{Parameters, GRAVITY};
use crate::simulation::topology::{EdgeFixing, FabricConfig, FabricPlane, DEFAULT_PARTICLE_MASS, DEFAULT_PARTICLE_RADIUS};

/// Which solver advances the system
/// `solver: "euler_explicit"`
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SolverConfig {
    #[serde(rename = "euler_explicit")] // Semi-implicit Euler, velocity first then position
    #[default]
    EulerExplicit,
}

/// Animation driver configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_running")]
    pub running: bool, // `false` - start paused
    #[serde(default = "default_steps_per_frame")]
    pub steps_per_frame: usize, // simulation steps per rendered frame
    #[serde(default)]
    pub solver: SolverConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            running: default_running(),
            steps_per_frame: default_steps_per_frame(),
            solver: SolverConfig::default(),
        }
    }
}

fn default_running() -> bool {
    true
}

fn default_steps_per_frame() -> usize {
    1
}

/// Timestep and global forces
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64, // fixed step size
    pub gravity: Option<[f64; 3]>, // defaults to (0, -9.81, 0)
    pub wind: Option<[f64; 3]>, // no wind field when absent
    #[serde(default)]
    pub damping: f64, // air friction coefficient
}

impl From<&ParametersConfig> for Parameters {
    fn from(cfg: &ParametersConfig) -> Self {
        Parameters {
            dt: cfg.dt,
            gravity: cfg.gravity.map(NVec3::from).unwrap_or(GRAVITY),
            wind: cfg.wind.map(NVec3::from),
            damping: cfg.damping,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaneConfig {
    #[default]
    Vertical, // width along x, height along y
    Horizontal, // width along x, height along z
}

/// Named edge sets
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EdgeConfig {
    None,
    LeftEdge,
    RightEdge,
    BothEdges,
}

/// `fixed: both_edges` or `fixed: { indices: [..] }`
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FixedConfig {
    Edges(EdgeConfig),
    Indices { indices: Vec<usize> },
}

impl Default for FixedConfig {
    fn default() -> Self {
        FixedConfig::Edges(EdgeConfig::BothEdges)
    }
}

/// Fabric grid description
#[derive(Deserialize, Debug, Clone)]
pub struct ClothConfig {
    pub width: f64,
    pub height: f64,
    pub horizontal_resolution: usize, // samples along the width
    pub vertical_resolution: usize, // samples along the height
    pub stiffness: f64, // spring k
    pub damping: f64, // spring axial damping
    pub mass: Option<f64>, // per particle
    pub radius: Option<f64>, // per particle, visual only
    pub origin: Option<[f64; 3]>, // position of the first particle
    #[serde(default)]
    pub plane: PlaneConfig,
    #[serde(default)]
    pub fixed: FixedConfig,
    #[serde(default)]
    pub shear: bool, // add diagonal springs
    #[serde(default)]
    pub bend: bool, // add skip-one springs
}

impl From<&ClothConfig> for FabricConfig {
    fn from(cfg: &ClothConfig) -> Self {
        let plane = match cfg.plane {
            PlaneConfig::Vertical => FabricPlane::Vertical,
            PlaneConfig::Horizontal => FabricPlane::Horizontal,
        };
        let fixing = match &cfg.fixed {
            FixedConfig::Edges(EdgeConfig::None) => EdgeFixing::None,
            FixedConfig::Edges(EdgeConfig::LeftEdge) => EdgeFixing::LeftEdge,
            FixedConfig::Edges(EdgeConfig::RightEdge) => EdgeFixing::RightEdge,
            FixedConfig::Edges(EdgeConfig::BothEdges) => EdgeFixing::BothEdges,
            FixedConfig::Indices { indices } => EdgeFixing::Indices(indices.clone()),
        };

        FabricConfig::new(
            cfg.width,
            cfg.height,
            cfg.horizontal_resolution,
            cfg.vertical_resolution,
            cfg.stiffness,
            cfg.damping,
        )
        .with_particle(
            cfg.mass.unwrap_or(DEFAULT_PARTICLE_MASS),
            cfg.radius.unwrap_or(DEFAULT_PARTICLE_RADIUS),
        )
        .with_origin(cfg.origin.map(NVec3::from).unwrap_or_else(NVec3::zeros))
        .with_plane(plane)
        .with_fixing(fixing)
        .with_shear(cfg.shear)
        .with_bend(cfg.bend)
    }
}

/// Renderer options, ignored by the headless runner
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ViewerConfig {
    pub texture: Option<String>, // image under `assets/` projected on the cloth
    #[serde(default)]
    pub show_particles: bool, // draw a small sphere per particle
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig, // Animation driver configuration
    pub parameters: ParametersConfig, // Timestep and global forces
    pub cloth: ClothConfig, // The fabric
    #[serde(default)]
    pub viewer: ViewerConfig, // Optional renderer settings
}

impl ScenarioConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open scenario {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
