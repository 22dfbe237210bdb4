use log::trace;

use super::{Submesh, SubmeshRegistry};
use crate::gpu::{DrawTarget, MeshBuffer, PolygonMode, RenderState};
use crate::material::{MaterialHandle, MaterialResolver};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrawOrder {
    /// Registry order, i.e. the order groups appear in the mesh file.
    #[default]
    FileOrder,
    /// Opaque submeshes first, then transparent ones; file order within each.
    OpaqueFirst,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererOptions {
    pub draw_order: DrawOrder,
    pub polygon_mode: PolygonMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: usize,
    pub transparent_draws: usize,
    /// Submeshes drawn with the default material because nothing was mapped.
    pub fallback_materials: usize,
}

/// Draws every submesh of a mesh with the material resolved for its name.
pub struct MeshRenderer<M> {
    default_material: M,
    options: RendererOptions,
}

impl<M: MaterialHandle> MeshRenderer<M> {
    /// `default_material` is drawn for submeshes the resolver has no
    /// material for. Those draws always use an opaque render state, even if
    /// the material itself reports transparency.
    pub fn new(default_material: M) -> Self {
        Self::with_options(default_material, RendererOptions::default())
    }

    pub fn with_options(default_material: M, options: RendererOptions) -> Self {
        Self {
            default_material,
            options,
        }
    }

    pub fn options(&self) -> RendererOptions {
        self.options
    }

    pub fn set_options(&mut self, options: RendererOptions) {
        self.options = options;
    }

    pub fn default_material(&self) -> &M {
        &self.default_material
    }

    /// `buffer` and `registry` must come from the same upload; a registry
    /// range past the end of the buffer panics in [`MeshBuffer::draw_range`].
    pub fn render<T, R>(
        &self,
        target: &mut T,
        buffer: &MeshBuffer<T::Buffer>,
        registry: &SubmeshRegistry,
        resolver: &R,
    ) -> RenderStats
    where
        T: DrawTarget<Material = M>,
        R: MaterialResolver<M> + ?Sized,
    {
        debug_assert!(
            registry.required_index_count() <= buffer.index_count(),
            "submesh registry expects {} indices but mesh '{}' has {}",
            registry.required_index_count(),
            buffer.name(),
            buffer.index_count()
        );

        let mut stats = RenderStats::default();
        buffer.bind(target);

        let resolved: Vec<(&Submesh, &M, RenderState)> = registry
            .iter()
            .map(|submesh| match resolver.resolve(&submesh.name) {
                Some(material) => {
                    let state = RenderState::for_material(material, self.options.polygon_mode);
                    (submesh, material, state)
                }
                None => {
                    stats.fallback_materials += 1;
                    let state = RenderState {
                        polygon_mode: self.options.polygon_mode,
                        ..RenderState::OPAQUE
                    };
                    (submesh, &self.default_material, state)
                }
            })
            .collect();

        let ordered: Vec<&(&Submesh, &M, RenderState)> = match self.options.draw_order {
            DrawOrder::FileOrder => resolved.iter().collect(),
            DrawOrder::OpaqueFirst => {
                let (opaque, transparent): (Vec<_>, Vec<_>) =
                    resolved.iter().partition(|(_, _, state)| !state.blend_enabled());
                opaque.into_iter().chain(transparent).collect()
            }
        };

        for &&(submesh, material, state) in &ordered {
            trace!(
                "Drawing submesh '{}' ({}+{}) with {:?}",
                submesh.name,
                submesh.start_index,
                submesh.count,
                state
            );
            target.apply_render_state(state);
            target.use_material(material);
            buffer.draw_range(target, submesh.start_index, submesh.count);

            stats.draw_calls += 1;
            if state.blend_enabled() {
                stats.transparent_draws += 1;
            }
        }

        target.unbind_mesh();
        stats
    }
}
