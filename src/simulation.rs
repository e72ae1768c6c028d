//! Ping-pong simulation stage.
//!
//! The stage owns two state targets of identical dimensions. Each step reads
//! the current target, writes the other, then flips which one is current.
//! Targets are allocated once in [`SimulationStage::initialize`] and never
//! reallocated; they are released together when the stage is dropped.
//!
//! The actual kernel dispatch is delegated to a [`ComputeBackend`]:
//! [`CpuCompute`] runs the reference kernel on the CPU, and
//! `gpu::GpuCompute` runs the WGSL kernel on the device.

use crate::error::SceneError;
use crate::flow::{advance_texel, sanitize_delta, FlowFieldParams, KernelUniforms};
use crate::grid::SimulationGrid;
use crate::texture::StateTexture;

/// Executes the advection kernel over a pair of state targets.
pub trait ComputeBackend {
    /// Storage for one full state texture.
    type Target;

    /// Allocate both targets. Target 0 starts as a copy of `seed`.
    fn allocate(&mut self, seed: &StateTexture) -> Result<[Self::Target; 2], SceneError>;

    /// Read `targets[read]`, write `targets[1 - read]`.
    fn advance(&mut self, targets: &mut [Self::Target; 2], read: usize, uniforms: &KernelUniforms);

    /// Copy a target's texels back to the CPU.
    fn read(&self, target: &Self::Target, grid: &SimulationGrid) -> Result<Vec<[f32; 4]>, SceneError>;
}

/// Two named targets plus the index of the current one.
#[derive(Debug)]
pub struct PingPong<T> {
    targets: [T; 2],
    current: usize,
    generation: u64,
}

impl<T> PingPong<T> {
    pub fn new(targets: [T; 2]) -> Self {
        Self {
            targets,
            current: 0,
            generation: 0,
        }
    }

    /// Index of the target holding the latest state.
    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of swaps so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn current(&self) -> &T {
        &self.targets[self.current]
    }

    #[inline]
    pub fn targets(&self) -> &[T; 2] {
        &self.targets
    }

    #[inline]
    pub fn targets_mut(&mut self) -> &mut [T; 2] {
        &mut self.targets
    }

    /// Make the other target current.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
        self.generation += 1;
    }
}

/// The particle simulation: ping-pong targets, tunables and a backend.
pub struct SimulationStage<B: ComputeBackend> {
    backend: B,
    buffers: PingPong<B::Target>,
    grid: SimulationGrid,
    params: FlowFieldParams,
    respawn_rate: f32,
}

impl<B: ComputeBackend> SimulationStage<B> {
    /// Allocate targets from `seed` and make the seeded target current.
    pub fn initialize(
        mut backend: B,
        seed: &StateTexture,
        params: FlowFieldParams,
        respawn_rate: f32,
    ) -> Result<Self, SceneError> {
        let targets = backend.allocate(seed)?;
        Ok(Self {
            backend,
            buffers: PingPong::new(targets),
            grid: seed.grid(),
            params,
            respawn_rate,
        })
    }

    /// Run one kernel step and swap.
    ///
    /// Call exactly once per frame. A degenerate `delta_time` (NaN, negative)
    /// is treated as zero: the step still runs and swaps, but nothing moves.
    pub fn step(&mut self, time: f32, delta_time: f32) {
        let dt = sanitize_delta(delta_time);
        if dt != delta_time {
            log::debug!("Clamped simulation delta {} -> {}", delta_time, dt);
        }

        let uniforms = KernelUniforms::new(&self.params, time, dt, self.respawn_rate);
        let read = self.buffers.current_index();
        self.backend
            .advance(self.buffers.targets_mut(), read, &uniforms);
        self.buffers.swap();
    }

    #[inline]
    pub fn grid(&self) -> SimulationGrid {
        self.grid
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.buffers.current_index()
    }

    /// Steps taken since initialization.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.buffers.generation()
    }

    #[inline]
    pub fn current_target(&self) -> &B::Target {
        self.buffers.current()
    }

    #[inline]
    pub fn targets(&self) -> &[B::Target; 2] {
        self.buffers.targets()
    }

    #[inline]
    pub fn params(&self) -> &FlowFieldParams {
        &self.params
    }

    /// Tunables are read at the next [`Self::step`].
    #[inline]
    pub fn params_mut(&mut self) -> &mut FlowFieldParams {
        &mut self.params
    }

    /// Copy the current state back to the CPU.
    pub fn snapshot(&self) -> Result<StateTexture, SceneError> {
        let texels = self.backend.read(self.buffers.current(), &self.grid)?;
        Ok(StateTexture::from_texels(self.grid, texels))
    }
}

/// Reference backend running the kernel on the CPU.
#[derive(Debug, Default)]
pub struct CpuCompute {
    base: Vec<[f32; 4]>,
}

impl CpuCompute {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComputeBackend for CpuCompute {
    type Target = Vec<[f32; 4]>;

    fn allocate(&mut self, seed: &StateTexture) -> Result<[Self::Target; 2], SceneError> {
        self.base = seed.texels().to_vec();
        Ok([seed.texels().to_vec(), vec![[0.0; 4]; seed.texels().len()]])
    }

    fn advance(&mut self, targets: &mut [Self::Target; 2], read: usize, uniforms: &KernelUniforms) {
        let [a, b] = targets;
        let (src, dst) = if read == 0 { (&*a, b) } else { (&*b, a) };
        for ((out, &particle), &base) in dst.iter_mut().zip(src.iter()).zip(self.base.iter()) {
            *out = advance_texel(particle, base, uniforms);
        }
    }

    fn read(&self, target: &Self::Target, _grid: &SimulationGrid) -> Result<Vec<[f32; 4]>, SceneError> {
        Ok(target.clone())
    }
}
