mod device;
mod mesh_buffer;
mod pipeline;

pub use device::WgpuContext;
pub use mesh_buffer::MeshBuffer;
pub use pipeline::{MeshPipelines, SceneUniforms, WgpuPass};

use std::ops::Range;

use crate::material::MaterialHandle;

/// Buffer allocation side of a graphics context.
pub trait GraphicsContext {
    type Buffer;

    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> Self::Buffer;
    fn create_index_buffer(&mut self, label: &str, contents: &[u8]) -> Self::Buffer;
    fn destroy_buffer(&mut self, buffer: Self::Buffer);
}

/// Command side of a graphics context: the calls the mesh renderer issues
/// while drawing one mesh.
pub trait DrawTarget {
    type Buffer;
    type Material: MaterialHandle;

    /// Binds an interleaved vertex buffer (layout [`crate::model::ModelVertex`])
    /// and a `u32` index buffer.
    fn bind_mesh(&mut self, vertices: &Self::Buffer, indices: &Self::Buffer);
    fn unbind_mesh(&mut self);
    fn apply_render_state(&mut self, state: RenderState);
    fn use_material(&mut self, material: &Self::Material);
    /// Indexed triangle-list draw over an element range of the bound index buffer.
    fn draw_indexed(&mut self, indices: Range<u32>);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Opaque,
    /// Standard over-compositing: `src * a + dst * (1 - a)`.
    AlphaOver,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

/// Fixed-function state for one draw, derived from the material being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub blend: BlendMode,
    pub depth_write: bool,
    pub polygon_mode: PolygonMode,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

impl RenderState {
    pub const OPAQUE: Self = Self {
        blend: BlendMode::Opaque,
        depth_write: true,
        polygon_mode: PolygonMode::Fill,
    };

    pub const TRANSPARENT: Self = Self {
        blend: BlendMode::AlphaOver,
        depth_write: false,
        polygon_mode: PolygonMode::Fill,
    };

    pub fn for_material<M: MaterialHandle + ?Sized>(material: &M, polygon_mode: PolygonMode) -> Self {
        let base = if material.is_transparent() {
            Self::TRANSPARENT
        } else {
            Self::OPAQUE
        };
        Self {
            polygon_mode,
            ..base
        }
    }

    pub fn blend_enabled(&self) -> bool {
        self.blend == BlendMode::AlphaOver
    }
}
