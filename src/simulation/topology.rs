//! Cloth / flag construction
//!
//! Builds a rectangular fabric of particles joined by springs, together with
//! the texture coordinates and triangles a renderer needs to draw it.
//!
//! Layout is column-major: the particle at horizontal sample `i` and vertical
//! sample `j` has index `i * V + j`, so each column of `V` particles is
//! contiguous. Springs, texcoords and triangles all use that index.
//!
//! ```text
//!  j=V-1  o---o---o---o
//!         |   |   |   |
//!  j=1    o---o---o---o
//!         |   |   |   |
//!  j=0    o---o---o---o
//!        i=0 i=1     i=H-1
//! ```

use std::ops::Range;

use crate::error::SimError;
use crate::simulation::particle::{NVec3, Particle, ParticleId};
use crate::simulation::forces::{ForceField, SpringForceField};
use crate::simulation::system::DynamicSystem;

pub const DEFAULT_PARTICLE_MASS: f64 = 1.0;
pub const DEFAULT_PARTICLE_RADIUS: f64 = 0.01;

/// Plane the fabric is laid out in at rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FabricPlane {
    /// Width along +x, height along +y (a flag on a pole)
    #[default]
    Vertical,
    /// Width along +x, height along +z (a net lying flat)
    Horizontal,
}

impl FabricPlane {
    fn axes(self) -> (NVec3, NVec3) {
        match self {
            FabricPlane::Vertical => (NVec3::x(), NVec3::y()),
            FabricPlane::Horizontal => (NVec3::x(), NVec3::z()),
        }
    }
}

/// Which particles are anchored after the grid is built
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EdgeFixing {
    /// Everything free
    None,
    /// Column `i = 0`
    LeftEdge,
    /// Column `i = H - 1`
    RightEdge,
    /// Columns `0` and `H - 1`
    #[default]
    BothEdges,
    /// Arbitrary fabric-local indices
    Indices(Vec<usize>),
}

impl EdgeFixing {
    /// Fabric-local indices to anchor on an `horizontal x vertical` grid
    pub fn fixed_indices(&self, horizontal: usize, vertical: usize) -> Result<Vec<usize>, SimError> {
        if horizontal == 0 || vertical == 0 {
            return Err(SimError::InvalidGridDimensions { horizontal, vertical });
        }
        let column = |i: usize| (0..vertical).map(move |j| i * vertical + j);
        let indices = match self {
            EdgeFixing::None => Vec::new(),
            EdgeFixing::LeftEdge => column(0).collect(),
            EdgeFixing::RightEdge => column(horizontal - 1).collect(),
            EdgeFixing::BothEdges => column(0).chain(column(horizontal - 1)).collect(),
            EdgeFixing::Indices(list) => {
                let count = horizontal * vertical;
                if let Some(&index) = list.iter().find(|&&k| k >= count) {
                    return Err(SimError::ParticleOutOfBounds { index, count });
                }
                list.clone()
            }
        };
        Ok(indices)
    }
}

/// Parameters of a fabric.
///
/// ```
/// use flagsim::simulation::topology::{EdgeFixing, FabricConfig};
///
/// let config = FabricConfig::new(0.65, 1.1, 15, 10, 1.0e4, 1.0)
///     .with_fixing(EdgeFixing::LeftEdge)
///     .with_shear(true);
/// assert_eq!(config.horizontal_resolution, 15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FabricConfig {
    pub width: f64,
    pub height: f64,
    pub horizontal_resolution: usize, // H samples along the width
    pub vertical_resolution: usize, // V samples along the height
    pub stiffness: f64,
    pub damping: f64, // spring axial damping
    pub particle_mass: f64,
    pub particle_radius: f64,
    pub origin: NVec3, // position of particle (0, 0)
    pub plane: FabricPlane,
    pub fixing: EdgeFixing,
    pub shear: bool, // diagonal springs
    pub bend: bool, // skip-one springs
}

impl FabricConfig {
    pub fn new(
        width: f64,
        height: f64,
        horizontal_resolution: usize,
        vertical_resolution: usize,
        stiffness: f64,
        damping: f64,
    ) -> Self {
        Self {
            width,
            height,
            horizontal_resolution,
            vertical_resolution,
            stiffness,
            damping,
            particle_mass: DEFAULT_PARTICLE_MASS,
            particle_radius: DEFAULT_PARTICLE_RADIUS,
            origin: NVec3::zeros(),
            plane: FabricPlane::Vertical,
            fixing: EdgeFixing::BothEdges,
            shear: false,
            bend: false,
        }
    }

    pub fn with_fixing(mut self, fixing: EdgeFixing) -> Self {
        self.fixing = fixing;
        self
    }

    pub fn with_origin(mut self, origin: NVec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_plane(mut self, plane: FabricPlane) -> Self {
        self.plane = plane;
        self
    }

    pub fn with_particle(mut self, mass: f64, radius: f64) -> Self {
        self.particle_mass = mass;
        self.particle_radius = radius;
        self
    }

    pub fn with_shear(mut self, shear: bool) -> Self {
        self.shear = shear;
        self
    }

    pub fn with_bend(mut self, bend: bool) -> Self {
        self.bend = bend;
        self
    }

    /// Rest spacing along the width and along the height.
    /// Infinite for a resolution below 2, which `Fabric::build` rejects.
    pub fn spacing(&self) -> (f64, f64) {
        (
            self.width / self.horizontal_resolution.saturating_sub(1) as f64,
            self.height / self.vertical_resolution.saturating_sub(1) as f64,
        )
    }

    fn validate(&self) -> Result<(), SimError> {
        let (h, v) = (self.horizontal_resolution, self.vertical_resolution);
        if h < 2 || v < 2 {
            return Err(SimError::InvalidGridDimensions {
                horizontal: h,
                vertical: v,
            });
        }
        let positive = |x: f64| x > 0.0 && x.is_finite();
        if !positive(self.width) || !positive(self.height) {
            return Err(SimError::InvalidExtent {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Builder output. Spring ids are fabric-local until [`Fabric::install`]
/// moves everything into a system.
#[derive(Debug, Clone)]
pub struct Fabric {
    pub particles: Vec<Particle>,
    pub springs: Vec<SpringForceField>,
    pub positions: Vec<NVec3>, // rest positions, same order as particles
    pub texcoords: Vec<[f32; 2]>,
    pub triangles: Vec<[u32; 3]>,
    horizontal_resolution: usize,
    vertical_resolution: usize,
}

impl Fabric {
    pub fn build(config: &FabricConfig) -> Result<Self, SimError> {
        config.validate()?;

        let h = config.horizontal_resolution;
        let v = config.vertical_resolution;
        let index = |i: usize, j: usize| i * v + j;
        let (dh, dv) = config.spacing();
        let (axis_h, axis_v) = config.plane.axes();

        // Particles, texcoords: column by column
        let mut positions = Vec::with_capacity(h * v);
        let mut texcoords = Vec::with_capacity(h * v);
        for i in 0..h {
            for j in 0..v {
                positions.push(config.origin + axis_h * (i as f64 * dh) + axis_v * (j as f64 * dv));
                texcoords.push([
                    i as f32 / (h - 1) as f32,
                    j as f32 / (v - 1) as f32,
                ]);
            }
        }

        let mut particles: Vec<Particle> = positions
            .iter()
            .map(|&x| Particle::new(x, NVec3::zeros(), config.particle_mass, config.particle_radius))
            .collect();
        for k in config.fixing.fixed_indices(h, v)? {
            particles[k].set_fixed(true);
        }

        let spring = |a: usize, b: usize, rest: f64| {
            SpringForceField::new(a, b, config.stiffness, rest, config.damping)
        };
        let mut springs = Vec::new();

        // Structural: horizontal neighbors (i-1, j) -- (i, j)
        for i in 1..h {
            for j in 0..v {
                springs.push(spring(index(i - 1, j), index(i, j), dh));
            }
        }

        // Structural: vertical neighbors (i, j-1) -- (i, j)
        for i in 0..h {
            for j in 1..v {
                springs.push(spring(index(i, j - 1), index(i, j), dv));
            }
        }

        // Shear: both diagonals of every cell
        if config.shear {
            let diagonal = (dh * dh + dv * dv).sqrt();
            for i in 1..h {
                for j in 1..v {
                    springs.push(spring(index(i - 1, j - 1), index(i, j), diagonal));
                    springs.push(spring(index(i, j - 1), index(i - 1, j), diagonal));
                }
            }
        }

        // Bend: skip-one along both axes
        if config.bend {
            for i in 2..h {
                for j in 0..v {
                    springs.push(spring(index(i - 2, j), index(i, j), 2.0 * dh));
                }
            }
            for i in 0..h {
                for j in 2..v {
                    springs.push(spring(index(i, j - 2), index(i, j), 2.0 * dv));
                }
            }
        }

        // Two triangles per cell
        let mut triangles = Vec::with_capacity(2 * (h - 1) * (v - 1));
        for i in 0..h - 1 {
            for j in 0..v - 1 {
                let a = index(i, j) as u32;
                let b = index(i + 1, j) as u32;
                let c = index(i + 1, j + 1) as u32;
                let d = index(i, j + 1) as u32;
                triangles.push([a, b, c]);
                triangles.push([a, c, d]);
            }
        }

        Ok(Self {
            particles,
            springs,
            positions,
            texcoords,
            triangles,
            horizontal_resolution: h,
            vertical_resolution: v,
        })
    }

    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.vertical_resolution + j
    }

    pub fn horizontal_resolution(&self) -> usize {
        self.horizontal_resolution
    }

    pub fn vertical_resolution(&self) -> usize {
        self.vertical_resolution
    }

    pub fn fixed_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_fixed()).count()
    }

    /// Move particles and springs into `system`.
    ///
    /// Spring ids are shifted by the number of particles already present, so
    /// a fabric can be installed next to other bodies. The returned
    /// [`ClothMesh`] is all a renderer needs afterwards.
    ///
    /// Nothing is added to `system` when a spring refers outside the fabric.
    pub fn install(self, system: &mut DynamicSystem) -> Result<ClothMesh, SimError> {
        let count = self.particles.len();
        if let Some(index) = self
            .springs
            .iter()
            .flat_map(|s| [s.p1, s.p2])
            .find(|&id| id >= count)
        {
            return Err(SimError::ParticleOutOfBounds { index, count });
        }

        let first = system.particle_count();
        for p in self.particles {
            system.add_particle(p);
        }
        for s in self.springs {
            let mut field = ForceField::from(s);
            field.offset_targets(first);
            system.add_force_field(field)?;
        }

        Ok(ClothMesh {
            particles: first..system.particle_count(),
            horizontal_resolution: self.horizontal_resolution,
            vertical_resolution: self.vertical_resolution,
            texcoords: self.texcoords,
            triangles: self.triangles,
        })
    }
}

// =========================================================================================
// Renderer-side view
// =========================================================================================

/// What a renderer keeps once a fabric lives inside a system: the particle
/// range plus static mesh topology. Positions are pulled from the system on
/// every frame; nothing here is shared mutably with the simulation.
#[derive(Debug, Clone)]
pub struct ClothMesh {
    pub particles: Range<ParticleId>,
    pub horizontal_resolution: usize,
    pub vertical_resolution: usize,
    pub texcoords: Vec<[f32; 2]>,
    pub triangles: Vec<[u32; 3]>, // fabric-local vertex indices
}

impl ClothMesh {
    pub fn particle_id(&self, i: usize, j: usize) -> ParticleId {
        self.particles.start + i * self.vertical_resolution + j
    }

    pub fn vertex_count(&self) -> usize {
        self.particles.len()
    }

    /// Current vertex positions in fabric order, ready for a vertex buffer.
    /// Empty when `system` is not the one this fabric was installed into.
    pub fn positions(&self, system: &DynamicSystem) -> Vec<[f32; 3]> {
        let Some(particles) = system.particles().get(self.particles.clone()) else {
            return Vec::new();
        };
        particles
            .iter()
            .map(|p| {
                let x = p.position();
                [x.x as f32, x.y as f32, x.z as f32]
            })
            .collect()
    }

    /// Area-weighted vertex normals for `positions`
    pub fn normals(&self, positions: &[[f32; 3]]) -> Vec<[f32; 3]> {
        let mut acc = vec![NVec3::zeros(); positions.len()];
        let at = |k: u32| {
            let p = positions[k as usize];
            NVec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
        };
        for &[a, b, c] in &self.triangles {
            let n = (at(b) - at(a)).cross(&(at(c) - at(a)));
            acc[a as usize] += n;
            acc[b as usize] += n;
            acc[c as usize] += n;
        }
        acc.iter()
            .map(|n| {
                let n = n.try_normalize(f64::EPSILON).unwrap_or_else(NVec3::zeros);
                [n.x as f32, n.y as f32, n.z as f32]
            })
            .collect()
    }

    /// Triangle indices flattened for an index buffer
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}
