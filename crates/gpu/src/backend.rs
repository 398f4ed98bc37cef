use foundation::ids::ResourceId;
use scene::{Material, MeshData};
use texture::TextureData;

use crate::error::GpuError;
use crate::renderer::RenderFrame;

/// The device-side half of resource management.
///
/// Ids are assigned by [`crate::ResourceManager`]; a backend only mirrors
/// them. `dispose` is called at most once per created id.
pub trait GpuBackend {
    fn create_geometry(&mut self, id: ResourceId, mesh: &MeshData) -> Result<(), GpuError>;
    fn create_material(&mut self, id: ResourceId, material: &Material) -> Result<(), GpuError>;
    fn update_material(&mut self, id: ResourceId, material: &Material) -> Result<(), GpuError>;
    fn create_texture(&mut self, id: ResourceId, texture: &TextureData) -> Result<(), GpuError>;
    fn dispose(&mut self, id: ResourceId);

    /// Physical surface size in pixels.
    fn resize(&mut self, width: u32, height: u32);
    fn render(&mut self, frame: &RenderFrame) -> Result<(), GpuError>;

    /// Drops the device context. Called once, after every resource has
    /// been disposed.
    fn release_context(&mut self);
}
