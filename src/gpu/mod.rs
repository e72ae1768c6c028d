//! wgpu device, surface and scene rendering.
//!
//! [`GpuState`] owns the surface and device. [`Renderer`] draws a
//! [`SceneContext`] in one render pass (sky, ground, particles) with the
//! optional egui overlay on top, and implements [`SceneRenderer`] for the
//! frame driver. The simulation's compute work lives in [`GpuCompute`].

pub mod camera;
mod compute;
#[cfg(feature = "egui")]
pub mod egui_integration;
mod ground_points;
mod particles;
mod sky;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use compute::{GpuCompute, GpuTarget, STATE_FORMAT};
pub use sky::sphere_mesh;

use crate::driver::{SceneContext, SceneRenderer};
use crate::error::GpuError;
use crate::viewport::Viewport;
use ground_points::GroundPass;
use particles::ParticlePass;
use sky::SkyPass;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.01,
    b: 0.03,
    a: 1.0,
};

/// Uniform block shared by the sky, ground and particle shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub particle_size: f32,
    pub ground_time: f32,
    pub sky_time: f32,
    pub _padding: [f32; 3],
}

impl SceneUniforms {
    pub fn from_context<B: crate::simulation::ComputeBackend>(ctx: &SceneContext<B>) -> Self {
        Self {
            view_proj: ctx.camera.view_proj().to_cols_array_2d(),
            resolution: ctx.uniforms.resolution.to_array(),
            particle_size: ctx.uniforms.particle_size,
            ground_time: ctx.uniforms.ground_time,
            sky_time: ctx.uniforms.sky_time,
            _padding: [0.0; 3],
        }
    }
}

/// Surface size in pixels for `viewport`.
pub fn surface_size(viewport: &Viewport) -> winit::dpi::PhysicalSize<u32> {
    let resolution = viewport.resolution().round();
    winit::dpi::PhysicalSize::new((resolution.x as u32).max(1), (resolution.y as u32).max(1))
}

/// Surface, device and depth buffer.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(GpuError::NoAdapter)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        Ok(Self {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            depth_texture,
        })
    }

    #[inline]
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.reconfigure();
        }
    }

    /// Reconfigure with the current size, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, &self.config);
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Instanced camera-facing quads, six vertices per instance.
fn sprite_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    instance_layout: wgpu::VertexBufferLayout<'_>,
    format: wgpu::TextureFormat,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[instance_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Draws the scene for the frame driver.
pub struct Renderer {
    gpu: GpuState,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sky: SkyPass,
    ground: GroundPass,
    particles: ParticlePass,
    #[cfg(feature = "egui")]
    egui: Option<egui_integration::EguiIntegration>,
}

impl Renderer {
    /// Build all passes for `ctx`. `with_ui` enables the egui overlay when the
    /// feature is compiled in.
    #[cfg_attr(not(feature = "egui"), allow(unused_variables))]
    pub fn new(
        gpu: GpuState,
        ctx: &SceneContext<GpuCompute>,
        window: &Arc<Window>,
        with_ui: bool,
    ) -> Self {
        let device = gpu.device();
        let format = gpu.config.format;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniforms"),
            contents: bytemuck::bytes_of(&SceneUniforms::from_context(ctx)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let sky = SkyPass::new(device, &uniform_layout, format);
        let ground = GroundPass::new(device, &uniform_layout, format, &ctx.ground);
        let particles = ParticlePass::new(
            device,
            &uniform_buffer,
            format,
            &ctx.feed,
            ctx.simulation.targets(),
        );

        #[cfg(feature = "egui")]
        let egui = with_ui.then(|| egui_integration::EguiIntegration::new(device, format, window));

        Self {
            gpu,
            uniform_buffer,
            uniform_bind_group,
            sky,
            ground,
            particles,
            #[cfg(feature = "egui")]
            egui,
        }
    }

    #[inline]
    pub fn gpu_mut(&mut self) -> &mut GpuState {
        &mut self.gpu
    }

    #[cfg(feature = "egui")]
    pub fn egui_mut(&mut self) -> Option<&mut egui_integration::EguiIntegration> {
        self.egui.as_mut()
    }
}

impl SceneRenderer<GpuCompute> for Renderer {
    type Error = wgpu::SurfaceError;

    fn resize(&mut self, viewport: &Viewport) {
        self.gpu.resize(surface_size(viewport));
    }

    fn draw(&mut self, ctx: &SceneContext<GpuCompute>) -> Result<(), wgpu::SurfaceError> {
        let uniforms = SceneUniforms::from_context(ctx);
        self.gpu
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.sky.draw(&mut pass, &self.uniform_bind_group);
            self.ground.draw(&mut pass, &self.uniform_bind_group);
            match ctx.feed.bound_slot(&ctx.simulation) {
                Some(slot) => self.particles.draw(&mut pass, slot),
                None => log::warn!("Render feed is stale, skipping particle draw"),
            }
        }

        #[cfg(feature = "egui")]
        if let Some(egui) = self.egui.as_mut() {
            let screen = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
                pixels_per_point: ctx.viewport.pixel_ratio(),
            };
            egui.paint(&self.gpu.device, &self.gpu.queue, &mut encoder, &view, &screen);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_uniforms_layout() {
        // Must match the WGSL `SceneUniforms` block.
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 96);
        assert_eq!(std::mem::offset_of!(SceneUniforms, resolution), 64);
        assert_eq!(std::mem::offset_of!(SceneUniforms, sky_time), 80);
    }

    #[test]
    fn test_surface_size_uses_pixel_ratio() {
        let size = surface_size(&Viewport::new(800.0, 600.0, 1.5));
        assert_eq!((size.width, size.height), (1200, 900));
    }
}
