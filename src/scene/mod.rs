pub mod transform;

pub use transform::Transform;

use std::path::Path;

use glam::Mat4;
use log::info;

use crate::error::Result;
use crate::gpu::{DrawTarget, GraphicsContext, MeshBuffer};
use crate::material::{MaterialHandle, MaterialResolver};
use crate::model::{self, MeshDescription, ParseOptions};
use crate::render::{MeshRenderer, RenderStats, SubmeshRegistry};

/// An uploaded mesh with its submesh table and placement.
///
/// Keeps the buffer and registry from one upload together, so the ranges the
/// renderer draws always fit the buffer.
pub struct Model<B> {
    buffer: MeshBuffer<B>,
    registry: SubmeshRegistry,
    normalization: Mat4,
    pub transform: Transform,
}

impl<B> Model<B> {
    pub fn load<C, P>(ctx: &mut C, path: P, options: ParseOptions) -> Result<Self>
    where
        C: GraphicsContext<Buffer = B>,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let description = model::load(path, options)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();
        let model = Self::from_description(ctx, &name, description);
        info!(
            "Loaded model '{}' with {} submeshes from {}",
            name,
            model.registry.len(),
            path.display()
        );
        Ok(model)
    }

    pub fn from_description<C>(ctx: &mut C, name: &str, description: MeshDescription) -> Self
    where
        C: GraphicsContext<Buffer = B>,
    {
        let normalization = description.normalization_matrix();
        let (buffer, registry) = MeshBuffer::upload(ctx, name, description);
        Self {
            buffer,
            registry,
            normalization,
            transform: Transform::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.buffer.name()
    }

    pub fn buffer(&self) -> &MeshBuffer<B> {
        &self.buffer
    }

    pub fn registry(&self) -> &SubmeshRegistry {
        &self.registry
    }

    /// Placement transform applied on top of the unit-box normalization.
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_matrix() * self.normalization
    }

    pub fn render<T, M, R>(&self, target: &mut T, renderer: &MeshRenderer<M>, resolver: &R) -> RenderStats
    where
        T: DrawTarget<Buffer = B, Material = M>,
        M: MaterialHandle,
        R: MaterialResolver<M> + ?Sized,
    {
        renderer.render(target, &self.buffer, &self.registry, resolver)
    }

    pub fn destroy<C>(&mut self, ctx: &mut C)
    where
        C: GraphicsContext<Buffer = B>,
    {
        self.buffer.destroy(ctx);
    }
}
