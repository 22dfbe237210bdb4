use glam::Vec3;
use log::warn;
use wgpu::util::DeviceExt;

use super::{Material, MaterialHandle, Shading, Texture};
use crate::gpu::MeshPipelines;

/// A [`Material`] with its uniform buffer and bind group on the device.
pub struct GpuMaterial {
    params: Material,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    /// Flat materials, and textured ones created without a texture, sample
    /// the pipelines' white fallback texture.
    pub fn new(
        device: &wgpu::Device,
        pipelines: &MeshPipelines,
        params: Material,
        texture: Option<&Texture>,
    ) -> Self {
        if params.shading == Shading::Textured && texture.is_none() {
            warn!("Textured material '{}' has no texture, drawing it flat", params.name);
        }
        let texture = texture.unwrap_or_else(|| pipelines.fallback_texture());

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Uniform", params.name)),
            contents: bytemuck::cast_slice(&[params.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Material Bind Group", params.name)),
            layout: &pipelines.material_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        Self {
            params,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn params(&self) -> &Material {
        &self.params
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn set_color(&mut self, queue: &wgpu::Queue, color: Vec3) {
        self.params.set_color(color);
        self.write_uniform(queue);
    }

    pub fn set_opacity(&mut self, queue: &wgpu::Queue, opacity: f32) {
        self.params.set_opacity(opacity);
        self.write_uniform(queue);
    }

    fn write_uniform(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.params.uniform()]));
    }
}

impl MaterialHandle for GpuMaterial {
    fn is_transparent(&self) -> bool {
        self.params.is_transparent()
    }
}
