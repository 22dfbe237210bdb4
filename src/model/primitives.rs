//! Built-in shapes, produced as ordinary [`MeshDescription`]s so they flow
//! through the same upload and render path as file-loaded meshes.

use super::description::{Face, MeshDescription, MeshSource, SubmeshRange};
use super::ModelVertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangle,
    Quad,
    Cube,
}

impl Primitive {
    pub fn build(self) -> MeshDescription {
        match self {
            Primitive::Triangle => triangle(),
            Primitive::Quad => quad(),
            Primitive::Cube => cube(),
        }
    }
}

const FACING_Z: [f32; 3] = [0.0, 0.0, 1.0];

/// Single triangle in the XY plane, one group named "Body".
pub fn triangle() -> MeshDescription {
    let vertices = vec![
        ModelVertex::new([0.0, 0.5, 0.0], FACING_Z, [0.5, 1.0]),
        ModelVertex::new([-0.5, -0.5, 0.0], FACING_Z, [0.0, 0.0]),
        ModelVertex::new([0.5, -0.5, 0.0], FACING_Z, [1.0, 0.0]),
    ];
    MeshDescription::from_validated(
        vertices,
        vec![[0, 1, 2]],
        vec![SubmeshRange::new("Body", 0, 1)],
        MeshSource::Primitive(Primitive::Triangle),
    )
}

/// Unit quad in the XY plane, one group named "Quad".
pub fn quad() -> MeshDescription {
    let vertices = vec![
        ModelVertex::new([-0.5, -0.5, 0.0], FACING_Z, [0.0, 0.0]),
        ModelVertex::new([0.5, -0.5, 0.0], FACING_Z, [1.0, 0.0]),
        ModelVertex::new([0.5, 0.5, 0.0], FACING_Z, [1.0, 1.0]),
        ModelVertex::new([-0.5, 0.5, 0.0], FACING_Z, [0.0, 1.0]),
    ];
    MeshDescription::from_validated(
        vertices,
        vec![[0, 1, 2], [0, 2, 3]],
        vec![SubmeshRange::new("Quad", 0, 2)],
        MeshSource::Primitive(Primitive::Quad),
    )
}

/// Unit cube with one group per side, so each side can take its own material.
pub fn cube() -> MeshDescription {
    // (group name, outward normal, tangent u, tangent v)
    const SIDES: [(&str, [f32; 3], [f32; 3], [f32; 3]); 6] = [
        ("Front", [0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ("Back", [0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ("Right", [1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ("Left", [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ("Top", [0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ("Bottom", [0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    const CORNERS: [(f32, f32); 4] = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

    let mut vertices = Vec::with_capacity(24);
    let mut faces: Vec<Face> = Vec::with_capacity(12);
    let mut submeshes = Vec::with_capacity(6);

    for (side, (name, normal, u, v)) in SIDES.iter().enumerate() {
        let base = vertices.len() as u32;
        for &(a, b) in &CORNERS {
            let position = [
                normal[0] * 0.5 + u[0] * a + v[0] * b,
                normal[1] * 0.5 + u[1] * a + v[1] * b,
                normal[2] * 0.5 + u[2] * a + v[2] * b,
            ];
            vertices.push(ModelVertex::new(position, *normal, [a + 0.5, b + 0.5]));
        }
        faces.push([base, base + 1, base + 2]);
        faces.push([base, base + 2, base + 3]);

        let first_face = side as u32 * 2;
        submeshes.push(SubmeshRange::new(*name, first_face, first_face + 2));
    }

    MeshDescription::from_validated(vertices, faces, submeshes, MeshSource::Primitive(Primitive::Cube))
}
