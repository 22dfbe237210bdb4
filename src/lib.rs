//! Loader and renderer for `.model` meshes: a line-oriented text format of
//! interleaved vertices, triangle faces and named face groups, drawn one
//! indexed call per group with a material chosen by group name.

pub mod error;
pub mod gpu;
pub mod material;
pub mod model;
pub mod render;
pub mod scene;

pub use error::{FormatErrorKind, MeshError};
pub use gpu::{DrawTarget, GraphicsContext, MeshBuffer, RenderState};
pub use material::{Material, MaterialHandle, MaterialLibrary, MaterialResolver};
pub use model::{MeshDescription, ModelVertex, ParseOptions, SubmeshRange};
pub use render::{MeshRenderer, RendererOptions, SubmeshRegistry};
pub use scene::{Model, Transform};
