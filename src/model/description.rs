use std::ops::Range;
use std::path::PathBuf;

use glam::{Mat4, Vec3};

use super::primitives::Primitive;
use super::ModelVertex;
use crate::error::{FormatErrorKind, MeshError, Result};

/// One triangle, as three indices into the vertex list.
pub type Face = [u32; 3];

/// A named half-open range of faces, `faces[start_face..end_face]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmeshRange {
    pub name: String,
    pub start_face: u32,
    pub end_face: u32,
}

impl SubmeshRange {
    pub fn new(name: impl Into<String>, start_face: u32, end_face: u32) -> Self {
        Self {
            name: name.into(),
            start_face,
            end_face,
        }
    }

    pub fn start_index(&self) -> u32 {
        self.start_face * 3
    }

    pub fn index_count(&self) -> u32 {
        (self.end_face - self.start_face) * 3
    }

    /// Element range within the flattened index buffer.
    pub fn index_range(&self) -> Range<u32> {
        self.start_index()..self.start_index() + self.index_count()
    }
}

/// Where a mesh description came from.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    File(PathBuf),
    Stream,
    Primitive(Primitive),
}

/// Parsed, validated mesh data waiting to be uploaded.
///
/// Immutable once built; [`crate::gpu::MeshBuffer::upload`] consumes it.
#[derive(Debug, Clone)]
pub struct MeshDescription {
    vertices: Vec<ModelVertex>,
    faces: Vec<Face>,
    submeshes: Vec<SubmeshRange>,
    source: MeshSource,
}

impl MeshDescription {
    /// Builds a description from in-memory parts, checking that every face
    /// index names a vertex and every group range lies within the face list.
    pub fn new(
        vertices: Vec<ModelVertex>,
        faces: Vec<Face>,
        submeshes: Vec<SubmeshRange>,
        source: MeshSource,
    ) -> Result<Self> {
        let vertex_count = vertices.len() as u32;
        for face in &faces {
            if let Some(&index) = face.iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::invalid(FormatErrorKind::IndexOutOfRange {
                    index,
                    vertex_count,
                }));
            }
        }

        let face_count = faces.len() as u32;
        for submesh in &submeshes {
            if submesh.start_face > submesh.end_face || submesh.end_face > face_count {
                return Err(MeshError::invalid(FormatErrorKind::GroupOutOfRange {
                    name: submesh.name.clone(),
                    start: submesh.start_face,
                    end: submesh.end_face,
                    face_count,
                }));
            }
        }

        Ok(Self::from_validated(vertices, faces, submeshes, source))
    }

    pub(crate) fn from_validated(
        vertices: Vec<ModelVertex>,
        faces: Vec<Face>,
        submeshes: Vec<SubmeshRange>,
        source: MeshSource,
    ) -> Self {
        Self {
            vertices,
            faces,
            submeshes,
            source,
        }
    }

    pub fn vertices(&self) -> &[ModelVertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Submesh ranges in declaration order.
    pub fn submeshes(&self) -> &[SubmeshRange] {
        &self.submeshes
    }

    pub fn source(&self) -> &MeshSource {
        &self.source
    }

    pub fn index_count(&self) -> u32 {
        self.faces.len() as u32 * 3
    }

    pub(crate) fn into_parts(self) -> (Vec<ModelVertex>, Vec<Face>, Vec<SubmeshRange>) {
        (self.vertices, self.faces, self.submeshes)
    }

    /// Axis-aligned bounds of the vertex positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Matrix that centres the mesh on the origin and scales its largest
    /// extent to 1.
    pub fn normalization_matrix(&self) -> Mat4 {
        let Some((min, max)) = self.bounds() else {
            return Mat4::IDENTITY;
        };
        let center = (min + max) * 0.5;
        let max_extent = (max - min).max_element();
        let scale = if max_extent > f32::EPSILON {
            1.0 / max_extent
        } else {
            1.0
        };
        Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-center)
    }

    /// Checks that the groups tile `[0, face_count)` with no gaps and no
    /// overlaps. Not part of the format; callers opt in.
    pub fn check_coverage(&self) -> Result<()> {
        let mut ranges: Vec<&SubmeshRange> = self
            .submeshes
            .iter()
            .filter(|s| s.start_face < s.end_face)
            .collect();
        ranges.sort_by_key(|s| (s.start_face, s.end_face));

        let mut covered = 0u32;
        let mut previous: Option<&SubmeshRange> = None;
        for range in ranges {
            if range.start_face < covered {
                let first = previous.map(|p| p.name.clone()).unwrap_or_default();
                return Err(MeshError::invalid(FormatErrorKind::CoverageOverlap {
                    first,
                    second: range.name.clone(),
                }));
            }
            if range.start_face > covered {
                return Err(MeshError::invalid(FormatErrorKind::CoverageGap {
                    start: covered,
                    end: range.start_face,
                }));
            }
            covered = range.end_face;
            previous = Some(range);
        }

        let face_count = self.faces.len() as u32;
        if covered < face_count {
            return Err(MeshError::invalid(FormatErrorKind::CoverageGap {
                start: covered,
                end: face_count,
            }));
        }
        Ok(())
    }
}
