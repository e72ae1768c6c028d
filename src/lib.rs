//! # flowgarden
//!
//! A real-time scene where the vertices of a 3D model dissolve into particles
//! drifting through a GPU flow field, above a scattered ground of point
//! sprites and under a sky dome.
//!
//! ## Quick Start
//!
//! ```ignore
//! use flowgarden::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     Scene::new()
//!         .with_mesh("assets/tree.glb")
//!         .with_seed(42)
//!         .run()
//! }
//! ```
//!
//! ## How it works
//!
//! ### Seeding
//!
//! Every mesh vertex becomes one particle. Vertices are packed row-major into
//! a square RGBA32F texture of side `ceil(sqrt(n))`: `xyz` holds the position
//! (shifted by `offset_y`), `w` a random seed in `[0, 1)`.
//!
//! ### Simulation
//!
//! Each frame the advection kernel reads the current state texture and writes
//! the other one of a ping-pong pair, then the pair swaps. Particles follow a
//! 3D simplex noise field:
//!
//! ```ignore
//! FlowFieldParams {
//!     influence: 0.6,  // share of particles that move
//!     strength: 3.5,   // speed
//!     frequency: 0.6,  // spatial scale of the field
//!     height: 0.0,     // vertical shift of the moving region
//! }
//! ```
//!
//! The kernel runs on the GPU ([`gpu::GpuCompute`]) or, for tests and
//! benchmarks, on the CPU ([`CpuCompute`]). Both implement
//! [`ComputeBackend`].
//!
//! ### Frame loop
//!
//! [`FrameDriver::tick`] applies pending resizes, advances the clock, updates
//! the camera and decorative uniforms, steps the simulation once, rebinds the
//! render feed and draws.
//!
//! ## Debug mode
//!
//! Launch with `--debug` (or [`Scene::with_debug`]) for a control panel with
//! live sliders (requires the `egui` feature, on by default), FPS in the
//! window title and `P` to save the particle state texture as PNG.

pub mod config;
pub mod controls;
pub mod driver;
mod error;
pub mod feed;
pub mod flow;
pub mod gpu;
pub mod grid;
pub mod ground;
pub mod mesh;
pub mod noise;
pub mod scene;
pub mod seed;
pub mod shader_utils;
pub mod simulation;
pub mod texture;
pub mod time;
pub mod viewport;

pub use bytemuck;
pub use config::SceneConfig;
pub use driver::{DriverState, FrameDriver, FrameUniforms, SceneContext, SceneRenderer};
pub use error::{AssetError, GpuError, SceneError};
pub use feed::RenderFeed;
pub use flow::FlowFieldParams;
pub use glam::{Vec2, Vec3, Vec4};
pub use grid::SimulationGrid;
pub use ground::{GroundConfig, GroundPoint};
pub use mesh::MeshData;
pub use scene::Scene;
pub use simulation::{ComputeBackend, CpuCompute, PingPong, SimulationStage};
pub use texture::{ParticleRecord, StateTexture};
pub use viewport::Viewport;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use flowgarden::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SceneConfig;
    pub use crate::error::SceneError;
    pub use crate::flow::FlowFieldParams;
    pub use crate::ground::GroundConfig;
    pub use crate::mesh::{load_mesh, MeshData};
    pub use crate::scene::Scene;
    pub use crate::{Vec2, Vec3, Vec4};
    #[cfg(feature = "egui")]
    pub use egui;
}
