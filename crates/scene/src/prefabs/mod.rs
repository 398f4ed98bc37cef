mod hero_orb;
mod space_backdrop;
mod starfield;

pub use hero_orb::*;
pub use space_backdrop::*;
pub use starfield::*;

use foundation::ids::{NodeId, ResourceId};
use serde::{Deserialize, Serialize};
use sim::{BodySpec, EmitterParams, Facing, LayerSpin, OrbitParams};
use texture::AssetSlot;

use crate::allocator::Allocator;
use crate::components::{Geometry, MapSlot, Material, Side};
use crate::graph::{Node, SceneGraph};

/// Fixed camera placement for a variant.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRig {
    pub eye: [f64; 3],
    pub target: [f64; 3],
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.6, 7.5],
            target: [0.0, 0.0, 0.0],
            fov_y_deg: 45.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyShape {
    Moon { radius: f64 },
    Ship { length: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyParams {
    pub shape: BodyShape,
    pub color: [f32; 4],
    #[serde(flatten)]
    pub spec: BodySpec,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self::ship(OrbitParams::default(), false)
    }
}

impl BodyParams {
    pub fn ship(orbit: OrbitParams, emits: bool) -> Self {
        Self {
            shape: BodyShape::Ship { length: 0.22 },
            color: [0.78, 0.82, 0.9, 1.0],
            spec: BodySpec {
                orbit,
                facing: Facing::AlongVelocity,
                emits,
            },
        }
    }

    pub fn moon(radius: f64, orbit: OrbitParams) -> Self {
        Self {
            shape: BodyShape::Moon { radius },
            color: [0.72, 0.7, 0.68, 1.0],
            spec: BodySpec {
                orbit,
                facing: Facing::TowardOrigin,
                emits: false,
            },
        }
    }
}

/// Node whose rotation is driven by a constant spin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpinBinding {
    pub node: NodeId,
    pub spin: LayerSpin,
}

/// Node whose transform follows an orbiting body.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BodyBinding {
    pub node: NodeId,
    pub spec: BodySpec,
}

/// Material slot that an externally loaded asset may replace.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UpgradeTarget {
    pub asset: AssetSlot,
    pub material: ResourceId,
    pub slot: MapSlot,
}

/// Shared bolt geometry plus what each per-effect material looks like.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoltTemplate {
    pub geometry: ResourceId,
    pub color: [f32; 4],
}

impl BoltTemplate {
    pub fn material(&self) -> Material {
        Material::glow(self.color).with_side(Side::Double)
    }
}

/// Output of a prefab: the graph plus the handles the simulation drives.
#[derive(Debug)]
pub struct BuiltScene {
    pub graph: SceneGraph,
    /// Receives the pointer-eased rotation; transient effects hang off it.
    pub root: NodeId,
    pub spins: Vec<SpinBinding>,
    pub bodies: Vec<BodyBinding>,
    pub emitter: EmitterParams,
    pub bolt: Option<BoltTemplate>,
    pub upgrade_targets: Vec<UpgradeTarget>,
    pub camera: CameraRig,
}

impl BuiltScene {
    pub fn upgrade_target(&self, asset: AssetSlot) -> Option<UpgradeTarget> {
        self.upgrade_targets.iter().copied().find(|t| t.asset == asset)
    }
}

pub(crate) fn add_bodies<A: Allocator + ?Sized>(
    graph: &mut SceneGraph,
    parent: NodeId,
    bodies: &[BodyParams],
    alloc: &mut A,
) -> Vec<BodyBinding> {
    let mut out = Vec::with_capacity(bodies.len());
    for body in bodies {
        let (geometry, material, name) = match body.shape {
            BodyShape::Moon { radius } => (
                Geometry::sphere(radius, 24),
                Material::solid(body.color),
                "moon",
            ),
            BodyShape::Ship { length } => (
                Geometry::Ship { length },
                Material::solid(body.color).with_side(Side::Double),
                "ship",
            ),
        };
        let geometry = alloc.allocate_geometry(&geometry);
        let material = alloc.allocate_material(&material);
        let Some(node) = graph.add_child(parent, Node::mesh(name, geometry, material)) else {
            continue;
        };
        out.push(BodyBinding {
            node,
            spec: body.spec,
        });
    }
    out
}

pub(crate) fn add_bolt_template<A: Allocator + ?Sized>(
    bodies: &[BodyParams],
    color: [f32; 4],
    alloc: &mut A,
) -> Option<BoltTemplate> {
    if !bodies.iter().any(|b| b.spec.emits) || bodies.len() < 2 {
        return None;
    }
    let geometry = alloc.allocate_geometry(&Geometry::Bolt {
        length: 0.45,
        radius: 0.012,
    });
    Some(BoltTemplate { geometry, color })
}

pub(crate) fn bind_spin(
    graph: &mut SceneGraph,
    node: Option<NodeId>,
    spin: LayerSpin,
    spins: &mut Vec<SpinBinding>,
) {
    if let Some(node) = node {
        graph.set_rotation(node, spin.rotation_at(0.0));
        spins.push(SpinBinding { node, spin });
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use foundation::ids::{IdAllocator, ResourceId, ResourceKind};
    use texture::TextureData;

    use crate::allocator::Allocator;
    use crate::components::{Geometry, Material};

    /// Records what was allocated; ids come from a plain counter.
    #[derive(Default)]
    pub struct TallyAllocator {
        ids: IdAllocator,
        pub geometries: Vec<(ResourceId, &'static str)>,
        pub materials: Vec<(ResourceId, Material)>,
        pub textures: Vec<ResourceId>,
    }

    impl Allocator for TallyAllocator {
        fn allocate_geometry(&mut self, geometry: &Geometry) -> ResourceId {
            let id = self.ids.next(ResourceKind::Geometry);
            self.geometries.push((id, geometry.kind()));
            id
        }

        fn allocate_material(&mut self, material: &Material) -> ResourceId {
            let id = self.ids.next(ResourceKind::Material);
            self.materials.push((id, material.clone()));
            id
        }

        fn allocate_texture(&mut self, _texture: &TextureData) -> ResourceId {
            let id = self.ids.next(ResourceKind::Texture);
            self.textures.push(id);
            id
        }
    }
}
