use foundation::ids::ResourceId;
use texture::TextureData;

use crate::components::{Geometry, Material};

/// Registers GPU-side resources as the scene is built.
///
/// Every id returned here is owned by the implementor's tracking
/// collections and is released by it; the scene graph only refers to ids.
pub trait Allocator {
    fn allocate_geometry(&mut self, geometry: &Geometry) -> ResourceId;
    fn allocate_material(&mut self, material: &Material) -> ResourceId;
    fn allocate_texture(&mut self, texture: &TextureData) -> ResourceId;
}
