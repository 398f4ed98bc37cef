use foundation::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim::{EmitterParams, LayerSpin, OrbitParams};
use texture::{AssetSlot, TextureData};

use super::{
    BodyParams, BuiltScene, CameraRig, StarfieldParams, UpgradeTarget, add_bodies,
    add_bolt_template, bind_spin, generate_starfield,
};
use crate::allocator::Allocator;
use crate::components::{Geometry, MapSlot, Material, Side, Transform};
use crate::graph::{Node, SceneGraph};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroOrbParams {
    pub planet_radius: f64,
    pub sphere_segments: u32,
    /// Axial tilt of the planet stack, radians about Z.
    pub axial_tilt: f64,
    pub ring_inner: f64,
    pub ring_outer: f64,
    /// Ring plane tilt, radians about X.
    pub ring_tilt: f64,
    pub ring_color: [f32; 4],
    pub atmosphere_color: [f32; 4],
    pub planet_spin: f64,
    pub cloud_spin: f64,
    pub atmosphere_spin: f64,
    pub starfield_spin: f64,
    pub starfield: StarfieldParams,
    pub bodies: Vec<BodyParams>,
    pub emitter: EmitterParams,
    pub bolt_color: [f32; 4],
    pub camera: CameraRig,
    /// Procedural planet texture size in pixels.
    pub texture_size: [u32; 2],
}

impl Default for HeroOrbParams {
    fn default() -> Self {
        Self {
            planet_radius: 1.6,
            sphere_segments: 64,
            axial_tilt: 0.41,
            ring_inner: 2.3,
            ring_outer: 3.3,
            ring_tilt: 1.2,
            ring_color: [0.55, 0.7, 1.0, 0.35],
            atmosphere_color: [0.35, 0.6, 1.0, 1.0],
            planet_spin: 0.05,
            cloud_spin: 0.07,
            atmosphere_spin: 0.02,
            starfield_spin: 0.006,
            starfield: StarfieldParams::default(),
            bodies: vec![
                BodyParams::moon(
                    0.28,
                    OrbitParams {
                        radius: 3.9,
                        speed: 0.12,
                        phase: 0.8,
                        vertical_radius: 0.4,
                        vertical_harmonic: 1,
                        base_height: 0.3,
                        inclination: 0.15,
                    },
                ),
            ],
            emitter: EmitterParams::default(),
            bolt_color: [1.0, 0.35, 0.3, 1.0],
            camera: CameraRig::default(),
            texture_size: [1024, 512],
        }
    }
}

/// Procedural textures the planet layers start with.
#[derive(Debug)]
pub struct HeroTextures {
    pub day: TextureData,
    pub night: TextureData,
    pub clouds: TextureData,
}

/// Builds the hero orb:
///
/// ```text
/// root (pointer tilt)
/// ├── axis (axial tilt)
/// │   ├── planet (day map, spin)
/// │   │   └── night lights
/// │   ├── clouds (spin)
/// │   └── atmosphere (spin)
/// ├── ring
/// ├── starfield (spin)
/// └── bodies...
/// ```
pub fn build_hero_orb<A, R>(
    params: &HeroOrbParams,
    textures: HeroTextures,
    alloc: &mut A,
    rng: &mut R,
) -> BuiltScene
where
    A: Allocator + ?Sized,
    R: Rng + ?Sized,
{
    let mut graph = SceneGraph::new();
    let mut spins = Vec::new();
    let r = params.planet_radius;
    let seg = params.sphere_segments;

    let root = graph.add_root(Node::group("hero-root"));
    let axis = graph
        .add_child(
            root,
            Node::group("axis").with_transform(Transform::rotated(Vec3::new(0.0, 0.0, params.axial_tilt))),
        )
        .unwrap_or(root);

    let day_tex = alloc.allocate_texture(&textures.day);
    let night_tex = alloc.allocate_texture(&textures.night);
    let cloud_tex = alloc.allocate_texture(&textures.clouds);

    let planet_geo = alloc.allocate_geometry(&Geometry::sphere(r, seg));
    let planet_mat = alloc.allocate_material(&Material::lit(day_tex));
    let planet = graph.add_child(axis, Node::mesh("planet", planet_geo, planet_mat));
    bind_spin(&mut graph, planet, LayerSpin::about_y(params.planet_spin), &mut spins);

    let night_geo = alloc.allocate_geometry(&Geometry::sphere(r * 1.002, seg));
    let night_mat = alloc.allocate_material(&Material::night_lights(night_tex));
    if let Some(planet) = planet {
        graph.add_child(
            planet,
            Node::mesh("night-lights", night_geo, night_mat).with_render_order(1),
        );
    }

    let cloud_geo = alloc.allocate_geometry(&Geometry::sphere(r * 1.015, seg));
    let cloud_mat = alloc.allocate_material(&Material::clouds(cloud_tex));
    let clouds = graph.add_child(
        axis,
        Node::mesh("clouds", cloud_geo, cloud_mat).with_render_order(2),
    );
    bind_spin(&mut graph, clouds, LayerSpin::about_y(params.cloud_spin), &mut spins);

    let atmo_geo = alloc.allocate_geometry(&Geometry::sphere(r * 1.12, seg));
    let atmo_mat = alloc.allocate_material(&Material::atmosphere(params.atmosphere_color));
    let atmosphere = graph.add_child(
        axis,
        Node::mesh("atmosphere", atmo_geo, atmo_mat).with_render_order(3),
    );
    bind_spin(
        &mut graph,
        atmosphere,
        LayerSpin::about_y(params.atmosphere_spin),
        &mut spins,
    );

    let ring_geo = alloc.allocate_geometry(&Geometry::Ring {
        inner_radius: params.ring_inner,
        outer_radius: params.ring_outer,
        segments: 128,
    });
    let ring_mat = alloc.allocate_material(
        &Material::glow(params.ring_color)
            .with_opacity(params.ring_color[3])
            .with_side(Side::Double),
    );
    graph.add_child(
        root,
        Node::mesh("ring", ring_geo, ring_mat)
            .with_transform(Transform::rotated(Vec3::new(params.ring_tilt, 0.0, 0.0)))
            .with_render_order(4),
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

    let upgrade_targets = vec![
        UpgradeTarget {
            asset: AssetSlot::Day,
            material: planet_mat,
            slot: MapSlot::Color,
        },
        UpgradeTarget {
            asset: AssetSlot::Night,
            material: night_mat,
            slot: MapSlot::Color,
        },
        UpgradeTarget {
            asset: AssetSlot::Clouds,
            material: cloud_mat,
            slot: MapSlot::Color,
        },
        UpgradeTarget {
            asset: AssetSlot::Normal,
            material: planet_mat,
            slot: MapSlot::Normal,
        },
    ];

    BuiltScene {
        graph,
        root,
        spins,
        bodies,
        emitter: params.emitter,
        bolt,
        upgrade_targets,
        camera: params.camera,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Shading;
    use crate::prefabs::testing::TallyAllocator;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use texture::{SamplingParams, TextureKind};

    fn blank_textures() -> HeroTextures {
        let s = SamplingParams::default();
        HeroTextures {
            day: TextureData::blank(TextureKind::PlanetDay, 8, 4, s),
            night: TextureData::blank(TextureKind::NightLights, 8, 4, s),
            clouds: TextureData::blank(TextureKind::Clouds, 8, 4, s),
        }
    }

    fn build(params: &HeroOrbParams) -> (BuiltScene, TallyAllocator) {
        let mut alloc = TallyAllocator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let scene = build_hero_orb(params, blank_textures(), &mut alloc, &mut rng);
        (scene, alloc)
    }

    #[test]
    fn every_leaf_is_registered() {
        let (scene, alloc) = build(&HeroOrbParams::default());
        let leaves = scene.graph.leaves();
        // planet, night, clouds, atmosphere, ring, starfield, moon
        assert_eq!(leaves.len(), 7);
        for leaf in &leaves {
            assert!(alloc.geometries.iter().any(|(id, _)| *id == leaf.geometry));
            assert!(alloc.materials.iter().any(|(id, _)| *id == leaf.material));
        }
        assert_eq!(alloc.geometries.len(), 7);
        assert_eq!(alloc.materials.len(), 7);
        assert_eq!(alloc.textures.len(), 3);
    }

    #[test]
    fn hierarchy_hangs_off_one_root() {
        let (scene, _) = build(&HeroOrbParams::default());
        assert_eq!(scene.graph.roots(), &[scene.root]);
        let names: Vec<_> = scene
            .graph
            .leaves()
            .iter()
            .filter_map(|l| scene.graph.get(l.node).map(|n| n.name))
            .collect();
        assert_eq!(
            names,
            vec![
                "planet",
                "night-lights",
                "clouds",
                "atmosphere",
                "ring",
                "starfield",
                "moon"
            ]
        );
    }

    #[test]
    fn layers_spin_at_distinct_rates() {
        let (scene, _) = build(&HeroOrbParams::default());
        let mut rates: Vec<f64> = scene.spins.iter().map(|s| s.spin.rate.y).collect();
        assert_eq!(rates.len(), 4);
        rates.sort_by(f64::total_cmp);
        rates.dedup();
        assert_eq!(rates.len(), 4);
    }

    #[test]
    fn upgrade_targets_point_at_planet_materials() {
        let (scene, alloc) = build(&HeroOrbParams::default());
        let day = scene.upgrade_target(AssetSlot::Day).unwrap();
        let normal = scene.upgrade_target(AssetSlot::Normal).unwrap();
        assert_eq!(day.material, normal.material);
        assert_eq!(normal.slot, MapSlot::Normal);
        let (_, mat) = alloc
            .materials
            .iter()
            .find(|(id, _)| *id == day.material)
            .unwrap();
        assert_eq!(mat.shading, Shading::Lit);
        assert_eq!(mat.map, Some(alloc.textures[0]));
    }

    #[test]
    fn bolt_template_only_with_an_emitter_and_a_sibling() {
        let (scene, _) = build(&HeroOrbParams::default());
        assert!(scene.bolt.is_none());

        let mut params = HeroOrbParams::default();
        params.bodies.push(BodyParams::ship(OrbitParams::default(), true));
        let (scene, alloc) = build(&params);
        let bolt = scene.bolt.unwrap();
        assert!(alloc.geometries.contains(&(bolt.geometry, "bolt")));
        assert_eq!(scene.bodies.len(), 2);
    }
}
