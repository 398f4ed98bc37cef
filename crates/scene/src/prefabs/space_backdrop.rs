use foundation::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim::{EmitterParams, LayerSpin, OrbitParams};
use texture::TextureData;

use super::{
    BodyParams, BuiltScene, CameraRig, StarfieldParams, add_bodies, add_bolt_template, bind_spin,
    generate_starfield,
};
use crate::allocator::Allocator;
use crate::components::{Geometry, Material, Transform};
use crate::graph::{Node, SceneGraph};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropParams {
    pub nebula_radius: f64,
    pub planet_position: [f64; 3],
    pub planet_radius: f64,
    pub planet_color: [f32; 4],
    pub nebula_spin: f64,
    pub starfield_spin: f64,
    pub starfield: StarfieldParams,
    pub bodies: Vec<BodyParams>,
    pub emitter: EmitterParams,
    pub bolt_color: [f32; 4],
    pub camera: CameraRig,
    pub texture_size: [u32; 2],
}

impl Default for BackdropParams {
    fn default() -> Self {
        let ship = |radius, speed, phase, k, height, inclination| {
            BodyParams::ship(
                OrbitParams {
                    radius,
                    speed,
                    phase,
                    vertical_radius: 1.2,
                    vertical_harmonic: k,
                    base_height: height,
                    inclination,
                },
                true,
            )
        };
        Self {
            nebula_radius: 90.0,
            planet_position: [-14.0, 5.0, -26.0],
            planet_radius: 3.2,
            planet_color: [0.42, 0.36, 0.62, 1.0],
            nebula_spin: 0.003,
            starfield_spin: 0.006,
            starfield: StarfieldParams {
                count: 2500,
                inner_radius: 20.0,
                outer_radius: 45.0,
                min_size: 0.03,
                max_size: 0.12,
            },
            bodies: vec![
                ship(7.0, 0.16, 0.0, 2, 0.5, 0.25),
                ship(9.5, -0.12, 2.1, 3, -0.8, -0.3),
                ship(12.0, 0.09, 4.2, 1, 1.5, 0.1),
            ],
            emitter: EmitterParams::default(),
            bolt_color: [0.4, 0.9, 1.0, 1.0],
            camera: CameraRig {
                eye: [0.0, 0.0, 16.0],
                target: [0.0, 0.0, 0.0],
                fov_y_deg: 60.0,
                near: 0.1,
                far: 400.0,
            },
            texture_size: [1024, 1024],
        }
    }
}

/// Builds the full-page backdrop: an inside-out galaxy shell, a wide
/// starfield, a distant planet, and ships trading fire.
pub fn build_space_backdrop<A, R>(
    params: &BackdropParams,
    galaxy: TextureData,
    alloc: &mut A,
    rng: &mut R,
) -> BuiltScene
where
    A: Allocator + ?Sized,
    R: Rng + ?Sized,
{
    let mut graph = SceneGraph::new();
    let mut spins = Vec::new();
    let root = graph.add_root(Node::group("backdrop-root"));

    let galaxy_tex = alloc.allocate_texture(&galaxy);
    let nebula_geo = alloc.allocate_geometry(&Geometry::sphere(params.nebula_radius, 48));
    let nebula_mat = alloc.allocate_material(&Material::backdrop(galaxy_tex));
    let nebula = graph.add_child(
        root,
        Node::mesh("nebula", nebula_geo, nebula_mat).with_render_order(-2),
    );
    bind_spin(&mut graph, nebula, LayerSpin::about_y(params.nebula_spin), &mut spins);

    let planet_geo = alloc.allocate_geometry(&Geometry::sphere(params.planet_radius, 48));
    let planet_mat = alloc.allocate_material(&Material::solid(params.planet_color));
    let [px, py, pz] = params.planet_position;
    graph.add_child(
        root,
        Node::mesh("distant-planet", planet_geo, planet_mat)
            .with_transform(Transform::translate(Vec3::new(px, py, pz))),
    );

    let stars = generate_starfield(&params.starfield, rng);
    let star_geo = alloc.allocate_geometry(&Geometry::PointCloud { points: stars });
    let star_mat = alloc.allocate_material(&Material::stars());
    let starfield = graph.add_child(
        root,
        Node::mesh("starfield", star_geo, star_mat).with_render_order(-1),
    );
    bind_spin(
        &mut graph,
        starfield,
        LayerSpin::about_y(params.starfield_spin),
        &mut spins,
    );

    let bodies = add_bodies(&mut graph, root, &params.bodies, alloc);
    let bolt = add_bolt_template(&params.bodies, params.bolt_color, alloc);

    BuiltScene {
        graph,
        root,
        spins,
        bodies,
        emitter: params.emitter,
        bolt,
        upgrade_targets: Vec::new(),
        camera: params.camera,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Side;
    use crate::prefabs::testing::TallyAllocator;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use texture::{AssetSlot, SamplingParams, TextureKind};

    #[test]
    fn backdrop_shell_faces_inward_and_stays_behind() {
        let mut alloc = TallyAllocator::default();
        let mut rng = StdRng::seed_from_u64(2);
        let galaxy = TextureData::blank(TextureKind::Galaxy, 4, 4, SamplingParams::default());
        let scene = build_space_backdrop(&BackdropParams::default(), galaxy, &mut alloc, &mut rng);

        assert_eq!(scene.graph.leaves().len(), 6);
        assert_eq!(scene.bodies.len(), 3);
        assert_eq!(scene.spins.len(), 2);
        assert!(scene.bolt.is_some());
        assert_eq!(scene.upgrade_target(AssetSlot::Day), None);

        let (_, shell) = &alloc.materials[0];
        assert_eq!(shell.side, Side::Back);
        assert!(!shell.depth_write);
        assert_eq!(alloc.textures.len(), 1);
    }

    #[test]
    fn camera_sits_inside_the_nebula() {
        let params = BackdropParams::default();
        let eye = params.camera.eye;
        let d = (eye[0] * eye[0] + eye[1] * eye[1] + eye[2] * eye[2]).sqrt();
        assert!(d < params.nebula_radius);
        assert!(params.camera.far > params.nebula_radius + d);
    }
}
