//! Ground point sprites.

use wgpu::util::DeviceExt;

use crate::ground::GroundPoint;
use crate::shader_utils::ground_wgsl;

use super::sprite_pipeline;

pub struct GroundPass {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    count: u32,
}

impl GroundPass {
    pub fn new(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
        points: &[GroundPoint],
    ) -> Self {
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ground Instance Buffer"),
            contents: bytemuck::cast_slice(points),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ground Shader"),
            source: wgpu::ShaderSource::Wgsl(ground_wgsl().into()),
        });

        let layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GroundPoint>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32],
        };

        let pipeline = sprite_pipeline(
            device,
            "Ground Pipeline",
            &shader,
            &[uniform_layout],
            layout,
            format,
            false,
        );

        Self {
            pipeline,
            instance_buffer,
            count: points.len() as u32,
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, uniforms: &wgpu::BindGroup) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniforms, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.count);
    }
}
