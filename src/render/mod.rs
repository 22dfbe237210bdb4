mod registry;
mod renderer;

pub use registry::{Submesh, SubmeshRegistry};
pub use renderer::{DrawOrder, MeshRenderer, RenderStats, RendererOptions};

#[cfg(test)]
mod tests;
