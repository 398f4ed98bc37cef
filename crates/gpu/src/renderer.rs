use foundation::ids::ResourceId;
use foundation::math::{IDENTITY, Mat4, Vec3, mat4_look_at_rh, mat4_perspective_rh_z0};
use scene::{BlendMode, CameraRig, SceneGraph, Shading, Side};

use crate::backend::GpuBackend;
use crate::resources::ResourceManager;

/// Direction toward the key light, world space.
pub const LIGHT_DIR: [f32; 3] = [0.55, 0.25, 0.8];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera3D {
    pub fn look_at(position: Vec3, target: Vec3, fov_y_rad: f64, near: f64, far: f64) -> Self {
        Self {
            position,
            target,
            fov_y_rad,
            near,
            far,
        }
    }

    pub fn from_rig(rig: &CameraRig) -> Self {
        let [ex, ey, ez] = rig.eye;
        let [tx, ty, tz] = rig.target;
        Self::look_at(
            Vec3::new(ex, ey, ez),
            Vec3::new(tx, ty, tz),
            rig.fov_y_deg.to_radians(),
            rig.near,
            rig.far,
        )
    }

    pub fn view(&self) -> Mat4 {
        mat4_look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f64) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        mat4_perspective_rh_z0(self.fov_y_rad, aspect, self.near, self.far)
    }
}

/// Pipeline family a draw goes through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassKind {
    Opaque,
    Alpha,
    Additive,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCommand {
    pub geometry: ResourceId,
    pub material: ResourceId,
    pub model: Mat4,
    pub pass: PassKind,
    pub side: Side,
    pub depth_write: bool,
    pub shading: Shading,
    /// Material color with opacity folded into alpha.
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: [f32; 3],
    pub light_dir: [f32; 3],
    pub clear_color: [f32; 4],
    pub draws: Vec<DrawCommand>,
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self {
            view: IDENTITY,
            projection: IDENTITY,
            camera_position: [0.0; 3],
            light_dir: LIGHT_DIR,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            draws: Vec::new(),
        }
    }
}

pub struct Renderer;

impl Renderer {
    /// Turns the visible leaves into draw commands: opaque first, then
    /// alpha, then additive, each by ascending render order, ties kept in
    /// graph order. Leaves whose material is no longer tracked are skipped.
    pub fn collect<B: GpuBackend>(
        graph: &SceneGraph,
        resources: &ResourceManager<B>,
        camera: &Camera3D,
        aspect: f64,
    ) -> RenderFrame {
        let mut keyed: Vec<(PassKind, i32, DrawCommand)> = graph
            .leaves()
            .into_iter()
            .filter_map(|leaf| {
                let material = resources.material(leaf.material)?;
                let pass = match material.blend {
                    BlendMode::Opaque => PassKind::Opaque,
                    BlendMode::Alpha => PassKind::Alpha,
                    BlendMode::Additive => PassKind::Additive,
                };
                let mut color = material.color;
                color[3] *= material.opacity;
                Some((
                    pass,
                    leaf.render_order,
                    DrawCommand {
                        geometry: leaf.geometry,
                        material: leaf.material,
                        model: leaf.world,
                        pass,
                        side: material.side,
                        depth_write: material.depth_write,
                        shading: material.shading,
                        color,
                    },
                ))
            })
            .collect();
        keyed.sort_by_key(|(pass, order, _)| (*pass, *order));

        RenderFrame {
            view: camera.view(),
            projection: camera.projection(aspect),
            camera_position: camera.position.to_f32(),
            draws: keyed.into_iter().map(|(_, _, d)| d).collect(),
            ..RenderFrame::default()
        }
    }
}
