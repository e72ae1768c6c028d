//! wgpu compute backend for the simulation stage.
//!
//! Both ping-pong targets are `rgba32float` textures usable as storage
//! (write) and sampled (read) bindings. The two possible read/write
//! directions each get a bind group built once at allocation, so a step is a
//! uniform write plus one dispatch. Submission is fire-and-forget.

use std::sync::Arc;

use crate::error::{GpuError, SceneError};
use crate::flow::KernelUniforms;
use crate::grid::SimulationGrid;
use crate::shader_utils::{kernel_wgsl, KERNEL_WORKGROUP_SIZE};
use crate::simulation::ComputeBackend;
use crate::texture::StateTexture;

pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Bytes per `rgba32float` texel.
const TEXEL_SIZE: u32 = 16;

/// One simulation state texture.
pub struct GpuTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTarget {
    fn new(device: &wgpu::Device, side: u32, usage: wgpu::TextureUsages, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(side),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    #[inline]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

fn extent(side: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: side,
        height: side,
        depth_or_array_layers: 1,
    }
}

/// Runs the advection kernel on the GPU.
pub struct GpuCompute {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    /// Seed state, kept for respawn and gating.
    base: Option<GpuTarget>,
    /// Indexed by the read target.
    bind_groups: Vec<wgpu::BindGroup>,
    side: u32,
}

impl GpuCompute {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flow Field Kernel"),
            source: wgpu::ShaderSource::Wgsl(kernel_wgsl().into()),
        });

        let sampled_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Flow Field Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                sampled_entry(1),
                sampled_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: STATE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Flow Field Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Flow Field Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Flow Field Uniforms"),
            size: std::mem::size_of::<KernelUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            base: None,
            bind_groups: Vec::new(),
            side: 0,
        }
    }

    fn bind_group(&self, base: &GpuTarget, read: &GpuTarget, write: &GpuTarget) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Flow Field Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(base.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(read.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(write.view()),
                },
            ],
        })
    }

    fn upload(&self, target: &GpuTarget, seed: &StateTexture) {
        let side = seed.grid().side();
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            seed.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(side * TEXEL_SIZE),
                rows_per_image: Some(side),
            },
            extent(side),
        );
    }
}

impl ComputeBackend for GpuCompute {
    type Target = GpuTarget;

    fn allocate(&mut self, seed: &StateTexture) -> Result<[GpuTarget; 2], SceneError> {
        let side = seed.grid().side();
        let max = self.device.limits().max_texture_dimension_2d;
        if side > max {
            return Err(GpuError::TextureTooLarge { side, max }.into());
        }

        let state_usage = wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST;
        let base_usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;

        let base = GpuTarget::new(&self.device, side, base_usage, "Particle Base State");
        let targets = [
            GpuTarget::new(&self.device, side, state_usage, "Particle State A"),
            GpuTarget::new(&self.device, side, state_usage, "Particle State B"),
        ];
        self.upload(&base, seed);
        self.upload(&targets[0], seed);

        self.bind_groups = vec![
            self.bind_group(&base, &targets[0], &targets[1]),
            self.bind_group(&base, &targets[1], &targets[0]),
        ];
        self.base = Some(base);
        self.side = side;

        Ok(targets)
    }

    fn advance(&mut self, _targets: &mut [GpuTarget; 2], read: usize, uniforms: &KernelUniforms) {
        let Some(bind_group) = self.bind_groups.get(read) else {
            return;
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Flow Field Encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Flow Field Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            let groups = self.side.div_ceil(KERNEL_WORKGROUP_SIZE);
            pass.dispatch_workgroups(groups, groups, 1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn read(&self, target: &GpuTarget, grid: &SimulationGrid) -> Result<Vec<[f32; 4]>, SceneError> {
        let side = grid.side();
        let unpadded_row = side * TEXEL_SIZE;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row = unpadded_row.div_ceil(align) * align;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle State Readback"),
            size: (padded_row * side) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(side),
                },
            },
            extent(side),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(GpuError::BufferMapping(e.to_string()).into()),
            Err(e) => return Err(GpuError::BufferMapping(e.to_string()).into()),
        }

        let mut texels = Vec::with_capacity(grid.texel_count() as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks_exact(padded_row as usize) {
                let row: &[[f32; 4]] = bytemuck::cast_slice(&row[..unpadded_row as usize]);
                texels.extend_from_slice(row);
            }
        }
        staging.unmap();

        Ok(texels)
    }
}
