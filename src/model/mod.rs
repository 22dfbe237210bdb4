mod description;
mod parser;
pub mod primitives;
mod vertex;

pub use description::{Face, MeshDescription, MeshSource, SubmeshRange};
pub use parser::{load, parse, parse_str, parse_with, ParseOptions};
pub use primitives::Primitive;
pub use vertex::ModelVertex;
