//! Scene builder and window runner.
//!
//! # Example
//!
//! ```ignore
//! use flowgarden::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     Scene::new()
//!         .with_mesh("assets/tree.glb")
//!         .with_flow_field(FlowFieldParams { strength: 5.0, ..Default::default() })
//!         .with_debug(true)
//!         .run()
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::SceneConfig;
use crate::driver::{FrameDriver, SceneContext};
use crate::error::SceneError;
use crate::flow::FlowFieldParams;
use crate::gpu::{surface_size, GpuCompute, GpuState, Renderer};
use crate::grid::SimulationGrid;
use crate::ground::GroundConfig;
use crate::mesh::{load_mesh, MeshData};
use crate::viewport::Viewport;

const WINDOW_TITLE: &str = "flowgarden";

/// Frames between window title FPS updates.
const TITLE_INTERVAL: u64 = 30;

/// Builder for a flow-field particle scene.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    config: SceneConfig,
    mesh: Option<MeshData>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: SceneConfig) -> Self {
        Self { config, mesh: None }
    }

    /// glTF/GLB file whose vertices seed the particles.
    pub fn with_mesh(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.mesh_path = path.into();
        self.mesh = None;
        self
    }

    /// Use already loaded vertices instead of a file.
    pub fn with_mesh_data(mut self, mesh: MeshData) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Show the control panel and enable the debug keys.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Make every random draw reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_flow_field(mut self, params: FlowFieldParams) -> Self {
        self.config.flow_field = params;
        self
    }

    pub fn with_ground(mut self, ground: GroundConfig) -> Self {
        self.config.ground = ground;
        self
    }

    pub fn with_particle_size(mut self, size: f32) -> Self {
        self.config.particle_size = size;
        self
    }

    /// Vertical shift applied to the mesh before seeding.
    pub fn with_offset_y(mut self, offset_y: f32) -> Self {
        self.config.offset_y = offset_y;
        self
    }

    pub fn with_respawn_rate(mut self, rate: f32) -> Self {
        self.config.respawn_rate = rate;
        self
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Load the mesh, open a window and run until it is closed.
    ///
    /// Every fatal condition is returned before the first frame.
    pub fn run(self) -> Result<(), SceneError> {
        let mesh = match self.mesh {
            Some(mesh) => mesh,
            None => load_mesh(&self.config.mesh_path)?,
        };
        SimulationGrid::for_particles(mesh.vertex_count())?;

        if self.config.debug && !cfg!(feature = "egui") {
            log::warn!("Debug mode requested but the egui feature is disabled; no control panel");
        }

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, mesh);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct Running {
    window: Arc<Window>,
    ctx: SceneContext<GpuCompute>,
    renderer: Renderer,
}

struct App {
    config: SceneConfig,
    mesh: MeshData,
    running: Option<Running>,
    driver: FrameDriver,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    snapshots: u32,
    error: Option<SceneError>,
}

impl App {
    fn new(config: SceneConfig, mesh: MeshData) -> Self {
        Self {
            config,
            mesh,
            running: None,
            driver: FrameDriver::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            snapshots: 0,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<Running, SceneError> {
        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let gpu = pollster::block_on(GpuState::new(window.clone(), surface_size(&viewport)))?;
        let backend = GpuCompute::new(gpu.device().clone(), gpu.queue().clone());

        let mut rng = self.config.rng();
        let ctx = SceneContext::new(self.config.clone(), &self.mesh, backend, viewport, &mut rng)?;
        let renderer = Renderer::new(gpu, &ctx, &window, self.config.debug);

        Ok(Running {
            window,
            ctx,
            renderer,
        })
    }

    fn save_snapshot(&mut self) {
        let Some(running) = &self.running else {
            return;
        };
        let path = format!("flowgarden-state-{:04}.png", self.snapshots);
        match running.ctx.simulation.snapshot() {
            Ok(state) => match state.save_png(&path) {
                Ok(()) => {
                    log::info!("Saved particle state to {}", path);
                    self.snapshots += 1;
                }
                Err(e) => log::error!("Failed to write {}: {}", path, e),
            },
            Err(e) => log::error!("Failed to read back particle state: {}", e),
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = &mut self.running else {
            return;
        };
        let Running {
            window,
            ctx,
            renderer,
        } = running;

        #[cfg(feature = "egui")]
        if let Some(egui) = renderer.egui_mut() {
            egui.run(window, |ui_ctx| {
                crate::controls::debug_panel(
                    ui_ctx,
                    &mut ctx.uniforms.particle_size,
                    ctx.simulation.params_mut(),
                )
            });
        }

        match self.driver.tick(ctx, renderer) {
            Ok(()) => {
                let clock = self.driver.clock();
                if self.config.debug && clock.frame() % TITLE_INTERVAL == 0 {
                    window.set_title(&format!("{} - {:.0} fps", WINDOW_TITLE, clock.fps()));
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.gpu_mut().reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::error!("Render error: {:?}", e),
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.error.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[allow(unused_mut)]
        let mut consumed = false;
        #[cfg(feature = "egui")]
        if let Some(running) = &mut self.running {
            if let Some(egui) = running.renderer.egui_mut() {
                consumed = egui.on_window_event(&running.window, &event);
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(running) = &self.running {
                    let scale = running.window.scale_factor();
                    self.driver
                        .request_resize(Viewport::from_physical(physical_size, scale));
                }
            }
            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.physical_key == PhysicalKey::Code(KeyCode::KeyP)
                    && self.config.debug
                {
                    self.save_snapshot();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed && !consumed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        if let Some(running) = &mut self.running {
                            running.ctx.camera.orbit(dx, dy);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(running) = &mut self.running {
                    running.ctx.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_config() {
        let scene = Scene::new()
            .with_mesh("bunny.glb")
            .with_debug(true)
            .with_seed(11)
            .with_particle_size(0.2)
            .with_offset_y(1.0)
            .with_respawn_rate(0.0);
        let config = scene.config();
        assert_eq!(config.mesh_path, PathBuf::from("bunny.glb"));
        assert!(config.debug);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.particle_size, 0.2);
        assert_eq!(config.offset_y, 1.0);
        assert_eq!(config.respawn_rate, 0.0);
    }

    #[test]
    fn test_empty_mesh_fails_before_window() {
        let err = Scene::new()
            .with_mesh_data(MeshData::default())
            .run()
            .unwrap_err();
        assert!(matches!(err, SceneError::DegenerateInput(_)));
    }

    #[test]
    fn test_missing_mesh_is_asset_error() {
        let err = Scene::new()
            .with_mesh("does/not/exist.glb")
            .run()
            .unwrap_err();
        assert!(matches!(err, SceneError::AssetLoad(_)));
    }
}
