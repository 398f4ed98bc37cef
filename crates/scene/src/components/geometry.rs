use crate::mesh::{self, MeshData};

/// One star of a point cloud.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StarPoint {
    pub position: [f32; 3],
    /// Billboard half-size in world units.
    pub size: f32,
    pub color: [f32; 3],
}

/// CPU-side description of a geometry resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    /// Flat annulus in the XZ plane.
    Ring {
        inner_radius: f64,
        outer_radius: f64,
        segments: u32,
    },
    PointCloud {
        points: Vec<StarPoint>,
    },
    /// Small dart-shaped hull, nose toward +Z.
    Ship {
        length: f64,
    },
    /// Elongated box along +Z.
    Bolt {
        length: f64,
        radius: f64,
    },
}

impl Geometry {
    pub fn sphere(radius: f64, segments: u32) -> Self {
        Geometry::Sphere {
            radius,
            width_segments: segments,
            height_segments: (segments / 2).max(3),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Sphere { .. } => "sphere",
            Geometry::Ring { .. } => "ring",
            Geometry::PointCloud { .. } => "points",
            Geometry::Ship { .. } => "ship",
            Geometry::Bolt { .. } => "bolt",
        }
    }

    pub fn build(&self) -> MeshData {
        match self {
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => mesh::sphere(*radius as f32, *width_segments, *height_segments),
            Geometry::Ring {
                inner_radius,
                outer_radius,
                segments,
            } => mesh::ring(*inner_radius as f32, *outer_radius as f32, *segments),
            Geometry::PointCloud { points } => mesh::point_cloud(points),
            Geometry::Ship { length } => mesh::ship(*length as f32),
            Geometry::Bolt { length, radius } => mesh::bolt(*length as f32, *radius as f32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Geometry;

    #[test]
    fn sphere_helper_halves_height_segments() {
        let Geometry::Sphere {
            width_segments,
            height_segments,
            ..
        } = Geometry::sphere(1.0, 64)
        else {
            panic!("expected sphere");
        };
        assert_eq!((width_segments, height_segments), (64, 32));
    }
}
