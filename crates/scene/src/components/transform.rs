use foundation::math::{Mat4, Vec3, mat4_from_trs};

/// Local transform. Rotation is Euler XYZ in radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn rotated(rotation: Vec3) -> Self {
        Self {
            rotation,
            ..Self::identity()
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        mat4_from_trs(self.position, self.rotation, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use foundation::math::{IDENTITY, Vec3, mat4_transform_point};

    #[test]
    fn identity_is_origin() {
        let transform = Transform::identity();
        assert_eq!(transform.position, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(transform.matrix(), IDENTITY);
    }

    #[test]
    fn scale_then_translate() {
        let t = Transform::translate(Vec3::new(1.0, 2.0, 3.0)).with_scale(2.0);
        let p = mat4_transform_point(t.matrix(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p, Vec3::new(3.0, 2.0, 3.0));
    }
}
