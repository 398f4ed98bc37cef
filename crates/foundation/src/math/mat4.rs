//! Column-major 4x4 matrices laid out the way WGSL expects (`m[col][row]`).

use super::vec::Vec3;

pub type Mat4 = [[f32; 4]; 4];

pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

pub fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    // Column-major matrix multiply: c = a * b
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

pub fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    // RH, depth range [0, 1].
    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

pub fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalize();
    let s = f.cross(up).normalize();
    let u = s.cross(f);

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, (-f.x) as f32, 0.0],
        [s.y as f32, u.y as f32, (-f.y) as f32, 0.0],
        [s.z as f32, u.z as f32, (-f.z) as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}

pub fn mat4_translation(t: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3] = [t.x as f32, t.y as f32, t.z as f32, 1.0];
    m
}

pub fn mat4_scale(s: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[0][0] = s.x as f32;
    m[1][1] = s.y as f32;
    m[2][2] = s.z as f32;
    m
}

pub fn mat4_rotation_x(rad: f64) -> Mat4 {
    let (s, c) = (rad.sin() as f32, rad.cos() as f32);
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, s, 0.0],
        [0.0, -s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_rotation_y(rad: f64) -> Mat4 {
    let (s, c) = (rad.sin() as f32, rad.cos() as f32);
    [
        [c, 0.0, -s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_rotation_z(rad: f64) -> Mat4 {
    let (s, c) = (rad.sin() as f32, rad.cos() as f32);
    [
        [c, s, 0.0, 0.0],
        [-s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Translation * Rx * Ry * Rz * Scale (Euler angles applied in XYZ order).
pub fn mat4_from_trs(translation: Vec3, euler_xyz: Vec3, scale: Vec3) -> Mat4 {
    let r = mat4_mul(
        mat4_rotation_x(euler_xyz.x),
        mat4_mul(mat4_rotation_y(euler_xyz.y), mat4_rotation_z(euler_xyz.z)),
    );
    mat4_mul(mat4_translation(translation), mat4_mul(r, mat4_scale(scale)))
}

pub fn mat4_transform_point(m: Mat4, p: Vec3) -> Vec3 {
    let (x, y, z) = (p.x as f32, p.y as f32, p.z as f32);
    Vec3::new(
        (m[0][0] * x + m[1][0] * y + m[2][0] * z + m[3][0]) as f64,
        (m[0][1] * x + m[1][1] * y + m[2][1] * z + m[3][1]) as f64,
        (m[0][2] * x + m[1][2] * y + m[2][2] * z + m[3][2]) as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec::approx_eq;

    #[test]
    fn identity_is_neutral() {
        let m = mat4_from_trs(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::ONE);
        assert_eq!(mat4_mul(IDENTITY, m), m);
        assert_eq!(mat4_mul(m, IDENTITY), m);
    }

    #[test]
    fn trs_applies_scale_then_rotation_then_translation() {
        let m = mat4_from_trs(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, std::f64::consts::FRAC_PI_2, 0.0),
            Vec3::splat(2.0),
        );
        // +X scaled to 2, rotated about Y by 90 degrees to -Z, then shifted.
        let p = mat4_transform_point(m, Vec3::new(1.0, 0.0, 0.0));
        assert!(approx_eq(p, Vec3::new(10.0, 0.0, -2.0), 1e-5), "{p:?}");
    }

    #[test]
    fn look_at_maps_target_onto_negative_z() {
        let view = mat4_look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let p = mat4_transform_point(view, Vec3::ZERO);
        assert!(approx_eq(p, Vec3::new(0.0, 0.0, -5.0), 1e-5), "{p:?}");
    }
}
