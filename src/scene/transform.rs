use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotates by `angle` degrees about `axis`, after any existing rotation.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        let axis = axis.try_normalize().unwrap_or(Vec3::Y);
        self.rotation = Quat::from_axis_angle(axis, angle.to_radians()) * self.rotation;
    }

    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
    }

    /// Translation * rotation * scale.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}
