use wgpu::util::DeviceExt;

use super::GraphicsContext;

/// [`GraphicsContext`] over a wgpu device. Buffers are immutable after creation.
pub struct WgpuContext<'a> {
    device: &'a wgpu::Device,
}

impl<'a> WgpuContext<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &wgpu::Device {
        self.device
    }
}

impl GraphicsContext for WgpuContext<'_> {
    type Buffer = wgpu::Buffer;

    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        })
    }

    fn create_index_buffer(&mut self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::INDEX,
        })
    }

    fn destroy_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }
}
