use std::fmt;
use thiserror::Error;

/// Which counted block of a mesh file an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Vertices,
    Faces,
    Groups,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Vertices => f.write_str("vertex"),
            Block::Faces => f.write_str("face"),
            Block::Groups => f.write_str("group"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatErrorKind {
    #[error("missing {0} count")]
    MissingCount(Block),
    #[error("invalid {block} count `{token}`")]
    InvalidCount { block: Block, token: String },
    #[error("line is not valid text (bad byte at offset {offset})")]
    InvalidEncoding { offset: usize },
    #[error("vertex line has {0} values, expected 8")]
    VertexArity(usize),
    #[error("invalid float `{0}`")]
    InvalidFloat(String),
    #[error("face line has {0} indices, expected 3")]
    FaceArity(usize),
    #[error("invalid vertex index `{0}`")]
    InvalidIndex(String),
    #[error("vertex index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: u32 },
    #[error("malformed group line `{0}`")]
    MalformedGroup(String),
    #[error("group `{name}` spans faces {start}..{end} but the mesh has {face_count} faces")]
    GroupOutOfRange {
        name: String,
        start: u32,
        end: u32,
        face_count: u32,
    },
    #[error("faces {start}..{end} belong to no group")]
    CoverageGap { start: u32, end: u32 },
    #[error("groups `{first}` and `{second}` overlap")]
    CoverageOverlap { first: String, second: String },
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to read mesh data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed mesh data{}: {kind}", at_line(.line))]
    Format {
        line: Option<usize>,
        kind: FormatErrorKind,
    },

    #[error("no submesh named `{0}`")]
    NotFound(String),

    #[error("index range {start}+{count} exceeds index buffer of {len} indices")]
    Range { start: u32, count: u32, len: u32 },
}

impl MeshError {
    pub(crate) fn format(line: usize, kind: FormatErrorKind) -> Self {
        MeshError::Format {
            line: Some(line),
            kind,
        }
    }

    pub(crate) fn invalid(kind: FormatErrorKind) -> Self {
        MeshError::Format { line: None, kind }
    }

    /// The format error kind, if this is a format error.
    pub fn format_kind(&self) -> Option<&FormatErrorKind> {
        match self {
            MeshError::Format { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {line}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, MeshError>;
