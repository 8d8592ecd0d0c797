//! Position/rotation/scale transforms for scene nodes.

use cgmath::One;

/// Transformation made of position, rotation (as quaternion) and scale.
///
/// The scene root carries one, and placed models get their uniform scale from one.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_uniform_scale(scale: f32) -> Self {
        Self {
            scale: cgmath::Vector3::new(scale, scale, scale),
            ..Self::new()
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, Rotation3, SquareMatrix, Vector3, Vector4};

    use super::*;

    #[test]
    fn identity_is_identity_matrix() {
        assert_eq!(Instance::new().to_matrix(), cgmath::Matrix4::identity());
    }

    #[test]
    fn translation_rotation_then_scale() {
        let instance = Instance {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: cgmath::Quaternion::from_angle_y(Deg(90.0)),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        let p = instance.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        // scaled to x=2, turned onto -z, then moved
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
        assert!((p.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn uniform_scale_scales_all_axes() {
        let m = Instance::from_uniform_scale(3.0).to_matrix();
        assert_eq!((m.x.x, m.y.y, m.z.z), (3.0, 3.0, 3.0));
    }
}
