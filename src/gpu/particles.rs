//! Simulated particle sprites.
//!
//! The vertex shader fetches each particle's position from the current state
//! texture. One bind group exists per ping-pong slot; the render feed decides
//! which one is used.

use wgpu::util::DeviceExt;

use crate::feed::{ParticleVertex, RenderFeed};
use crate::shader_utils::particles_wgsl;

use super::compute::GpuTarget;
use super::sprite_pipeline;

pub struct ParticlePass {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    /// Indexed by ping-pong slot.
    bind_groups: [wgpu::BindGroup; 2],
    count: u32,
}

impl ParticlePass {
    pub fn new(
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        format: wgpu::TextureFormat,
        feed: &RenderFeed,
        targets: &[GpuTarget; 2],
    ) -> Self {
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Instance Buffer"),
            contents: bytemuck::cast_slice(feed.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = |target: &GpuTarget| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Particle Bind Group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(target.view()),
                    },
                ],
            })
        };
        let bind_groups = [bind_group(&targets[0]), bind_group(&targets[1])];

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(particles_wgsl().into()),
        });

        let layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32x3],
        };

        let pipeline = sprite_pipeline(
            device,
            "Particle Pipeline",
            &shader,
            &[&bind_group_layout],
            layout,
            format,
            true,
        );

        Self {
            pipeline,
            instance_buffer,
            bind_groups,
            count: feed.draw_count(),
        }
    }

    /// Draw from ping-pong `slot`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, slot: usize) {
        let Some(bind_group) = self.bind_groups.get(slot) else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.count);
    }
}
