//! Triangle-list mesh generation. Every geometry, point clouds included,
//! ends up as indexed triangles with the same vertex layout.

use bytemuck::{Pod, Zeroable};

use crate::components::StarPoint;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl MeshVertex {
    fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            color: [1.0; 4],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_quad(&mut self, corners: [MeshVertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn push_triangle(&mut self, a: [f32; 3], b: [f32; 3], c: [f32; 3]) {
        let n = face_normal(a, b, c);
        let base = self.vertices.len() as u32;
        self.vertices.push(MeshVertex::new(a, n, [0.0, 0.0]));
        self.vertices.push(MeshVertex::new(b, n, [1.0, 0.0]));
        self.vertices.push(MeshVertex::new(c, n, [0.5, 1.0]));
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 0.0 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 1.0, 0.0]
    }
}

/// UV sphere. `u` runs with longitude, `v` from the north pole down, so an
/// equirectangular texture maps without seams other than the u=0/1 column.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let lon_segments = width_segments.max(3);
    let lat_segments = height_segments.max(3);

    let mut vertices = Vec::with_capacity(((lat_segments + 1) * (lon_segments + 1)) as usize);
    for lat in 0..=lat_segments {
        let v = lat as f32 / lat_segments as f32;
        let theta = v * std::f32::consts::PI;
        let (sin_t, cos_t) = theta.sin_cos();

        for lon in 0..=lon_segments {
            let u = lon as f32 / lon_segments as f32;
            let phi = u * std::f32::consts::TAU;
            let (sin_p, cos_p) = phi.sin_cos();

            // u grows to the right when seen from outside.
            let n = [-sin_t * cos_p, cos_t, sin_t * sin_p];
            vertices.push(MeshVertex::new(
                [n[0] * radius, n[1] * radius, n[2] * radius],
                n,
                [u, v],
            ));
        }
    }

    let stride = lon_segments + 1;
    let mut indices = Vec::with_capacity((lat_segments * lon_segments * 6) as usize);
    for lat in 0..lat_segments {
        for lon in 0..lon_segments {
            let i0 = lat * stride + lon;
            let i1 = i0 + 1;
            let i2 = i0 + stride;
            let i3 = i2 + 1;
            if lat != 0 {
                indices.extend_from_slice(&[i0, i2, i1]);
            }
            if lat != lat_segments - 1 {
                indices.extend_from_slice(&[i1, i2, i3]);
            }
        }
    }

    MeshData { vertices, indices }
}

/// Flat annulus facing +Y. `uv.x` is 0 on the inner edge and 1 on the outer.
pub fn ring(inner_radius: f32, outer_radius: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let (inner, outer) = if inner_radius <= outer_radius {
        (inner_radius, outer_radius)
    } else {
        (outer_radius, inner_radius)
    };

    let mut vertices = Vec::with_capacity(((segments + 1) * 2) as usize);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let (s, c) = (t * std::f32::consts::TAU).sin_cos();
        vertices.push(MeshVertex::new([c * inner, 0.0, s * inner], [0.0, 1.0, 0.0], [0.0, t]));
        vertices.push(MeshVertex::new([c * outer, 0.0, s * outer], [0.0, 1.0, 0.0], [1.0, t]));
    }

    let mut indices = Vec::with_capacity((segments * 6) as usize);
    for i in 0..segments {
        let a = i * 2;
        let (b, c, d) = (a + 1, a + 2, a + 3);
        indices.extend_from_slice(&[a, c, b, b, c, d]);
    }
    MeshData { vertices, indices }
}

/// One camera-facing quad per star. Every corner carries the star centre in
/// `position`, the corner offset in `uv` (-1..1), and the size in `normal.x`;
/// the vertex shader expands the quad in view space.
pub fn point_cloud(points: &[StarPoint]) -> MeshData {
    let mut mesh = MeshData {
        vertices: Vec::with_capacity(points.len() * 4),
        indices: Vec::with_capacity(points.len() * 6),
    };
    for p in points {
        let corner = |u: f32, v: f32| MeshVertex {
            position: p.position,
            normal: [p.size, 0.0, 0.0],
            uv: [u, v],
            color: [p.color[0], p.color[1], p.color[2], 1.0],
        };
        mesh.push_quad([
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ]);
    }
    mesh
}

/// Low-poly dart: nose at +Z, flat rear face, dorsal ridge.
pub fn ship(length: f32) -> MeshData {
    let h = length * 0.5;
    let w = length * 0.28;
    let t = length * 0.12;

    let nose = [0.0, 0.0, h];
    let left = [-w, 0.0, -h];
    let right = [w, 0.0, -h];
    let top = [0.0, t, -h * 0.6];
    let bottom = [0.0, -t * 0.5, -h * 0.6];

    let mut mesh = MeshData::default();
    mesh.push_triangle(nose, right, top);
    mesh.push_triangle(nose, top, left);
    mesh.push_triangle(nose, left, bottom);
    mesh.push_triangle(nose, bottom, right);
    mesh.push_triangle(left, top, right);
    mesh.push_triangle(left, right, bottom);
    mesh
}

/// Box from `z = -length/2` to `z = +length/2` with half-width `radius`.
pub fn bolt(length: f32, radius: f32) -> MeshData {
    let (l, r) = (length * 0.5, radius);
    let mut mesh = MeshData::default();
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-r, -r, l], [r, -r, l], [r, r, l], [-r, r, l]]),
        ([0.0, 0.0, -1.0], [[r, -r, -l], [-r, -r, -l], [-r, r, -l], [r, r, -l]]),
        ([1.0, 0.0, 0.0], [[r, -r, l], [r, -r, -l], [r, r, -l], [r, r, l]]),
        ([-1.0, 0.0, 0.0], [[-r, -r, -l], [-r, -r, l], [-r, r, l], [-r, r, -l]]),
        ([0.0, 1.0, 0.0], [[-r, r, l], [r, r, l], [r, r, -l], [-r, r, -l]]),
        ([0.0, -1.0, 0.0], [[-r, -r, -l], [r, -r, -l], [r, -r, l], [-r, -r, l]]),
    ];
    for (normal, corners) in faces {
        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        mesh.push_quad([
            MeshVertex::new(corners[0], normal, uvs[0]),
            MeshVertex::new(corners[1], normal, uvs[1]),
            MeshVertex::new(corners[2], normal, uvs[2]),
            MeshVertex::new(corners[3], normal, uvs[3]),
        ]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_range(mesh: &MeshData) {
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = sphere(2.0, 16, 8);
        assert_eq!(mesh.vertices.len(), 17 * 9);
        // Pole rows contribute one triangle per segment instead of two.
        assert_eq!(mesh.triangle_count(), 16 * 8 * 2 - 2 * 16);
        assert_indices_in_range(&mesh);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_triangles_wind_outward() {
        let mesh = sphere(1.0, 12, 6);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[tri[k] as usize].position);
            let n = face_normal(a, b, c);
            let centre = [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0, (a[2] + b[2] + c[2]) / 3.0];
            let d = n[0] * centre[0] + n[1] * centre[1] + n[2] * centre[2];
            assert!(d > 0.0, "inward-facing triangle {tri:?}");
        }
    }

    #[test]
    fn ring_spans_inner_to_outer() {
        let mesh = ring(3.0, 2.0, 32);
        assert_indices_in_range(&mesh);
        for v in &mesh.vertices {
            let r = (v.position[0].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((r - 2.0).abs() < 1e-5 || (r - 3.0).abs() < 1e-5);
            assert_eq!(v.position[1], 0.0);
        }
    }

    #[test]
    fn point_cloud_is_one_quad_per_star() {
        let stars = [
            StarPoint {
                position: [10.0, 0.0, 0.0],
                size: 0.05,
                color: [1.0, 0.9, 0.8],
            },
            StarPoint {
                position: [0.0, -12.0, 0.0],
                size: 0.02,
                color: [0.7, 0.8, 1.0],
            },
        ];
        let mesh = point_cloud(&stars);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.triangle_count(), 4);
        assert!(mesh.vertices[4..].iter().all(|v| v.position == [0.0, -12.0, 0.0]));
        assert_eq!(mesh.vertices[0].normal[0], 0.05);
    }

    #[test]
    fn ship_and_bolt_are_closed_and_nose_forward() {
        let s = ship(0.6);
        assert_indices_in_range(&s);
        let max_z = s.vertices.iter().map(|v| v.position[2]).fold(f32::MIN, f32::max);
        assert!((max_z - 0.3).abs() < 1e-6);

        let b = bolt(0.8, 0.02);
        assert_indices_in_range(&b);
        assert_eq!(b.triangle_count(), 12);
        for v in &b.vertices {
            assert!(v.position[2].abs() <= 0.4 + 1e-6);
        }
    }
}
