//! Frame driver.
//!
//! One [`FrameDriver::tick`] per display refresh. Each tick runs, in order:
//!
//! 1. apply the pending resize, if any
//! 2. advance the frame clock
//! 3. update the camera
//! 4. advance the decorative sky/ground time uniforms
//! 5. step the simulation (exactly once)
//! 6. rebind the render feed to the new current target
//! 7. draw
//!
//! Drawing goes through a [`SceneRenderer`], so the whole sequence runs
//! without a window in tests.

use glam::Vec2;
use rand::Rng;

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::feed::RenderFeed;
use crate::ground::{sample_ground, GroundPoint};
use crate::gpu::camera::OrbitCamera;
use crate::mesh::MeshData;
use crate::seed::build_seed_texture;
use crate::simulation::{ComputeBackend, SimulationStage};
use crate::time::FrameClock;
use crate::viewport::{PendingResize, Viewport};

/// Per-frame values fed to the render shaders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Render resolution in pixels.
    pub resolution: Vec2,
    pub particle_size: f32,
    pub ground_time: f32,
    pub sky_time: f32,
}

/// All scene state the tick loop owns.
pub struct SceneContext<B: ComputeBackend> {
    pub viewport: Viewport,
    pub camera: OrbitCamera,
    pub uniforms: FrameUniforms,
    pub simulation: SimulationStage<B>,
    pub feed: RenderFeed,
    pub ground: Vec<GroundPoint>,
    config: SceneConfig,
}

impl<B: ComputeBackend> SceneContext<B> {
    /// Seed the simulation from `mesh` and build the static scene data.
    pub fn new<R: Rng>(
        config: SceneConfig,
        mesh: &MeshData,
        backend: B,
        viewport: Viewport,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        let seed = build_seed_texture(mesh, config.offset_y, rng)?;
        let grid = seed.grid();
        log::info!(
            "Seeded {} particles on a {}x{} grid",
            grid.particle_count(),
            grid.side(),
            grid.side()
        );

        let simulation =
            SimulationStage::initialize(backend, &seed, config.flow_field, config.respawn_rate)?;
        let feed = RenderFeed::new(&grid, mesh, rng);
        let ground = sample_ground(&config.ground, rng);

        let camera = OrbitCamera::new(
            config.camera.for_mobile(viewport.is_mobile()),
            viewport.aspect(),
        );
        let uniforms = FrameUniforms {
            resolution: viewport.resolution(),
            particle_size: config.particle_size,
            ground_time: 0.0,
            sky_time: 0.0,
        };

        Ok(Self {
            viewport,
            camera,
            uniforms,
            simulation,
            feed,
            ground,
            config,
        })
    }

    /// Replace the viewport and everything derived from it.
    ///
    /// The camera jumps back to the preset for the new size.
    pub fn apply_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.uniforms.resolution = viewport.resolution();
        self.camera.set_aspect(viewport.aspect());
        self.camera
            .place_at(self.config.camera.for_mobile(viewport.is_mobile()));
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}

/// Draws a [`SceneContext`].
pub trait SceneRenderer<B: ComputeBackend> {
    type Error;

    /// Called at the top of the tick that applies a new viewport.
    fn resize(&mut self, viewport: &Viewport);

    fn draw(&mut self, ctx: &SceneContext<B>) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Rendering,
}

/// Owns the frame clock and the pending resize slot.
#[derive(Debug)]
pub struct FrameDriver {
    state: DriverState,
    clock: FrameClock,
    pending: PendingResize,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::with_clock(FrameClock::new())
    }

    pub fn with_clock(clock: FrameClock) -> Self {
        Self {
            state: DriverState::Idle,
            clock,
            pending: PendingResize::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Queue a resize for the next tick. Later requests replace earlier ones.
    pub fn request_resize(&mut self, viewport: Viewport) {
        self.pending.request(viewport);
    }

    /// Run one frame.
    pub fn tick<B, R>(&mut self, ctx: &mut SceneContext<B>, renderer: &mut R) -> Result<(), R::Error>
    where
        B: ComputeBackend,
        R: SceneRenderer<B>,
    {
        self.state = DriverState::Rendering;

        if let Some(viewport) = self.pending.take() {
            ctx.apply_viewport(viewport);
            renderer.resize(&viewport);
        }

        let (elapsed, delta) = self.clock.tick();

        ctx.camera.update();

        ctx.uniforms.sky_time = elapsed;
        ctx.uniforms.ground_time = elapsed;

        ctx.simulation.step(elapsed, delta);
        ctx.feed.bind(&ctx.simulation);

        renderer.draw(ctx)
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::CpuCompute;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Recorder {
        draws: Vec<(u64, Option<usize>)>,
        resizes: usize,
    }

    impl SceneRenderer<CpuCompute> for Recorder {
        type Error = ();

        fn resize(&mut self, _viewport: &Viewport) {
            self.resizes += 1;
        }

        fn draw(&mut self, ctx: &SceneContext<CpuCompute>) -> Result<(), ()> {
            self.draws.push((
                ctx.simulation.generation(),
                ctx.feed.bound_slot(&ctx.simulation),
            ));
            Ok(())
        }
    }

    fn context() -> SceneContext<CpuCompute> {
        let config = SceneConfig {
            ground: crate::ground::GroundConfig { count: 100, ..Default::default() },
            ..Default::default()
        };
        let mesh = MeshData::from_positions(vec![[0.0, 1.0, 0.0]; 10]);
        SceneContext::new(
            config,
            &mesh,
            CpuCompute::new(),
            Viewport::new(1280.0, 720.0, 1.0),
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap()
    }

    #[test]
    fn test_driver_starts_idle() {
        let driver = FrameDriver::new();
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[test]
    fn test_every_draw_sees_fresh_binding() {
        let mut ctx = context();
        let mut driver = FrameDriver::with_clock(FrameClock::fixed(1.0 / 60.0));
        let mut renderer = Recorder::default();

        for _ in 0..5 {
            driver.tick(&mut ctx, &mut renderer).unwrap();
        }
        assert_eq!(driver.state(), DriverState::Rendering);
        let expected: Vec<_> = (1..=5u64)
            .map(|g| (g, Some((g % 2) as usize)))
            .collect();
        assert_eq!(renderer.draws, expected);
    }

    #[test]
    fn test_resize_applies_once_at_tick_start() {
        let mut ctx = context();
        let mut driver = FrameDriver::with_clock(FrameClock::fixed(1.0 / 60.0));
        let mut renderer = Recorder::default();

        driver.request_resize(Viewport::new(640.0, 480.0, 1.0));
        driver.request_resize(Viewport::new(800.0, 600.0, 2.0));
        assert_eq!(ctx.uniforms.resolution, Vec2::new(1280.0, 720.0));

        driver.tick(&mut ctx, &mut renderer).unwrap();
        driver.tick(&mut ctx, &mut renderer).unwrap();
        assert_eq!(renderer.resizes, 1);
        assert_eq!(ctx.uniforms.resolution, Vec2::new(1600.0, 1200.0));
        assert!(ctx.viewport.is_mobile());
    }

    #[test]
    fn test_decorative_time_advances() {
        let mut ctx = context();
        let mut driver = FrameDriver::with_clock(FrameClock::fixed(0.5));
        let mut renderer = Recorder::default();
        driver.tick(&mut ctx, &mut renderer).unwrap();
        driver.tick(&mut ctx, &mut renderer).unwrap();
        assert_eq!(ctx.uniforms.sky_time, 1.0);
        assert_eq!(ctx.uniforms.ground_time, 1.0);
    }
}
