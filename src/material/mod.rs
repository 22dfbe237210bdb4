mod gpu;
mod texture;

pub use gpu::GpuMaterial;
pub use texture::{decode_flipped, Texture};

use std::collections::HashMap;

use glam::Vec3;

/// What the mesh renderer needs to know about a material to draw with it.
pub trait MaterialHandle {
    /// Transparent materials draw with alpha blending and without depth writes.
    fn is_transparent(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shading {
    #[default]
    Flat,
    Textured,
}

/// CPU-side material parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub shading: Shading,
    pub color: Vec3,
    pub opacity: f32,
    pub transparent: bool,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
}

impl Material {
    pub const FALLBACK_COLOR: Vec3 = Vec3::splat(0.5);

    pub fn flat(name: impl Into<String>, color: Vec3) -> Self {
        Self {
            name: name.into(),
            shading: Shading::Flat,
            color,
            opacity: 1.0,
            transparent: false,
        }
    }

    /// Textured material; the texture is modulated by `color`, white here.
    pub fn textured(name: impl Into<String>) -> Self {
        Self {
            shading: Shading::Textured,
            ..Self::flat(name, Vec3::ONE)
        }
    }

    /// Alpha-blended flat material, as used for window glass.
    pub fn glass(name: impl Into<String>, color: Vec3, opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            transparent: true,
            ..Self::flat(name, color)
        }
    }

    /// Flat gray, fully opaque. Drawn for submeshes with no mapped material.
    pub fn fallback() -> Self {
        Self::flat("default", Self::FALLBACK_COLOR)
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            color: self.color.extend(self.opacity).to_array(),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::fallback()
    }
}

impl MaterialHandle for Material {
    fn is_transparent(&self) -> bool {
        self.transparent
    }
}

/// Submesh name to material lookup, constant for a frame.
pub trait MaterialResolver<M> {
    fn resolve(&self, name: &str) -> Option<&M>;
}

impl<M> MaterialResolver<M> for HashMap<String, M> {
    fn resolve(&self, name: &str) -> Option<&M> {
        self.get(name)
    }
}

#[derive(Debug)]
pub struct MaterialLibrary<M> {
    materials: HashMap<String, M>,
}

impl<M> Default for MaterialLibrary<M> {
    fn default() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }
}

impl<M> MaterialLibrary<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, submesh: impl Into<String>, material: M) -> Self {
        self.insert(submesh, material);
        self
    }

    /// Maps a submesh name to a material, returning any material it replaces.
    pub fn insert(&mut self, submesh: impl Into<String>, material: M) -> Option<M> {
        self.materials.insert(submesh.into(), material)
    }

    pub fn get_mut(&mut self, submesh: &str) -> Option<&mut M> {
        self.materials.get_mut(submesh)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl<M> MaterialResolver<M> for MaterialLibrary<M> {
    fn resolve(&self, name: &str) -> Option<&M> {
        self.materials.get(name)
    }
}
