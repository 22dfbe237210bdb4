use std::ops::Range;

use log::debug;

use super::{DrawTarget, GraphicsContext};
use crate::error::{MeshError, Result};
use crate::model::MeshDescription;
use crate::render::SubmeshRegistry;

/// Device-resident vertex and index buffers for one mesh.
///
/// Both buffers are sized exactly to the uploaded data and never resized.
/// The buffers are released by [`MeshBuffer::destroy`]; dropping a
/// `MeshBuffer` without destroying it leaves that to the backend.
pub struct MeshBuffer<B> {
    name: String,
    buffers: Option<(B, B)>,
    vertex_count: u32,
    index_count: u32,
}

impl<B> MeshBuffer<B> {
    /// Uploads a description, consuming it. The returned registry names the
    /// description's submesh ranges within the new index buffer.
    pub fn upload<C>(ctx: &mut C, name: &str, description: MeshDescription) -> (Self, SubmeshRegistry)
    where
        C: GraphicsContext<Buffer = B>,
    {
        let (vertices, faces, submeshes) = description.into_parts();

        let vertex_buffer =
            ctx.create_vertex_buffer(&format!("{} Vertex Buffer", name), bytemuck::cast_slice(&vertices));
        let index_buffer =
            ctx.create_index_buffer(&format!("{} Index Buffer", name), bytemuck::cast_slice(&faces));

        let vertex_count = vertices.len() as u32;
        let index_count = faces.len() as u32 * 3;
        debug!(
            "Uploaded mesh '{}': {} vertices, {} indices, {} submeshes",
            name,
            vertex_count,
            index_count,
            submeshes.len()
        );

        let buffer = Self {
            name: name.to_string(),
            buffers: Some((vertex_buffer, index_buffer)),
            vertex_count,
            index_count,
        };
        (buffer, SubmeshRegistry::new(submeshes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_destroyed(&self) -> bool {
        self.buffers.is_none()
    }

    /// Validates an element range against the uploaded index buffer.
    pub fn index_range(&self, start_index: u32, count: u32) -> Result<Range<u32>> {
        match start_index.checked_add(count) {
            Some(end) if end <= self.index_count => Ok(start_index..end),
            _ => Err(MeshError::Range {
                start: start_index,
                count,
                len: self.index_count,
            }),
        }
    }

    pub fn bind<T>(&self, target: &mut T)
    where
        T: DrawTarget<Buffer = B>,
    {
        let (vertices, indices) = self.live_buffers();
        target.bind_mesh(vertices, indices);
    }

    /// Draws `count` indices starting at element `start_index`.
    ///
    /// # Panics
    ///
    /// If the range exceeds the index buffer or the buffer was destroyed.
    /// Either means the caller's range table no longer matches this buffer.
    pub fn draw_range<T>(&self, target: &mut T, start_index: u32, count: u32)
    where
        T: DrawTarget<Buffer = B>,
    {
        self.live_buffers();
        let range = match self.index_range(start_index, count) {
            Ok(range) => range,
            Err(err) => panic!("mesh '{}': {}", self.name, err),
        };
        target.draw_indexed(range);
    }

    /// Releases both GPU buffers. Later binds or draws panic.
    pub fn destroy<C>(&mut self, ctx: &mut C)
    where
        C: GraphicsContext<Buffer = B>,
    {
        if let Some((vertices, indices)) = self.buffers.take() {
            ctx.destroy_buffer(vertices);
            ctx.destroy_buffer(indices);
            debug!("Destroyed mesh '{}'", self.name);
        }
    }

    fn live_buffers(&self) -> (&B, &B) {
        match &self.buffers {
            Some((vertices, indices)) => (vertices, indices),
            None => panic!("mesh '{}' used after destroy", self.name),
        }
    }
}
