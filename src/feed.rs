//! Render feed for the simulated particles.
//!
//! Holds the static per-particle attributes (UV into the state texture,
//! random size, mesh color) and tracks which ping-pong target the draw call
//! should sample. The binding must be refreshed after every simulation step;
//! a stale binding would draw last frame's positions.

use bytemuck::{Pod, Zeroable};
use rand::Rng;

use crate::grid::SimulationGrid;
use crate::mesh::MeshData;
use crate::simulation::{ComputeBackend, SimulationStage};

/// Per-particle instance attributes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    /// Texel-center UV into the state texture.
    pub uv: [f32; 2],
    /// Random size factor in `[0, 1)`.
    pub size: f32,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binding {
    slot: usize,
    generation: u64,
}

/// Static attributes plus the current-target binding.
#[derive(Debug, Clone)]
pub struct RenderFeed {
    vertices: Vec<ParticleVertex>,
    bound: Option<Binding>,
}

impl RenderFeed {
    /// Build attributes for every live texel of `grid`.
    pub fn new<R: Rng>(grid: &SimulationGrid, mesh: &MeshData, rng: &mut R) -> Self {
        let vertices = grid
            .uv_map()
            .into_iter()
            .enumerate()
            .map(|(i, uv)| ParticleVertex {
                uv,
                size: rng.gen(),
                color: mesh.color(i),
            })
            .collect();

        Self {
            vertices,
            bound: None,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[ParticleVertex] {
        &self.vertices
    }

    /// Number of particles to draw (padding texels are excluded).
    #[inline]
    pub fn draw_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Point the draw at the stage's current target.
    pub fn bind<B: ComputeBackend>(&mut self, stage: &SimulationStage<B>) {
        self.bound = Some(Binding {
            slot: stage.current_index(),
            generation: stage.generation(),
        });
    }

    /// Whether the binding lags behind the stage.
    pub fn is_stale<B: ComputeBackend>(&self, stage: &SimulationStage<B>) -> bool {
        self.bound.map_or(true, |b| b.generation != stage.generation())
    }

    /// Target slot to sample, or `None` when the binding is stale.
    pub fn bound_slot<B: ComputeBackend>(&self, stage: &SimulationStage<B>) -> Option<usize> {
        match self.bound {
            Some(b) if b.generation == stage.generation() => Some(b.slot),
            _ => None,
        }
    }
}
