use std::collections::BTreeMap;

use foundation::ids::{IdAllocator, ResourceId, ResourceKind};
use scene::{Allocator, Geometry, MapSlot, Material};
use texture::TextureData;
use tracing::{debug, warn};

use crate::backend::GpuBackend;
use crate::error::GpuError;
use crate::renderer::RenderFrame;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ResourceCounts {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

impl ResourceCounts {
    pub fn total(&self) -> usize {
        self.geometries + self.materials + self.textures
    }

    fn bump(&mut self, kind: ResourceKind) {
        match kind {
            ResourceKind::Geometry => self.geometries += 1,
            ResourceKind::Material => self.materials += 1,
            ResourceKind::Texture => self.textures += 1,
        }
    }
}

/// Per-session tracking of every GPU-side object.
///
/// Each allocation is appended to its tracking collection immediately; each
/// tracked id is disposed exactly once, either individually through
/// [`ResourceManager::release`] or in bulk by [`ResourceManager::release_all`].
#[derive(Debug)]
pub struct ResourceManager<B> {
    backend: B,
    ids: IdAllocator,
    geometries: Vec<ResourceId>,
    materials: BTreeMap<ResourceId, Material>,
    textures: Vec<ResourceId>,
    allocated: ResourceCounts,
    released: ResourceCounts,
    context_released: bool,
}

impl<B: GpuBackend> ResourceManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            ids: IdAllocator::new(),
            geometries: Vec::new(),
            materials: BTreeMap::new(),
            textures: Vec::new(),
            allocated: ResourceCounts::default(),
            released: ResourceCounts::default(),
            context_released: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn material(&self, id: ResourceId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn is_tracked(&self, id: ResourceId) -> bool {
        match id.kind {
            ResourceKind::Geometry => self.geometries.contains(&id),
            ResourceKind::Material => self.materials.contains_key(&id),
            ResourceKind::Texture => self.textures.contains(&id),
        }
    }

    /// Live tracked resources.
    pub fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            textures: self.textures.len(),
        }
    }

    /// Everything ever allocated through this manager.
    pub fn allocated(&self) -> ResourceCounts {
        self.allocated
    }

    /// Everything ever disposed through this manager.
    pub fn released(&self) -> ResourceCounts {
        self.released
    }

    pub fn context_released(&self) -> bool {
        self.context_released
    }

    fn next_id(&mut self, kind: ResourceKind) -> ResourceId {
        self.allocated.bump(kind);
        self.ids.next(kind)
    }

    pub fn update_material(
        &mut self,
        id: ResourceId,
        f: impl FnOnce(&mut Material),
    ) -> Result<(), GpuError> {
        if self.context_released {
            return Err(GpuError::ContextLost);
        }
        let material = self
            .materials
            .get_mut(&id)
            .ok_or(GpuError::UnknownResource(id))?;
        f(material);
        self.backend.update_material(id, material)
    }

    /// Points `slot` of a live material at `texture` and returns the texture
    /// it referenced before. The caller decides whether the old one is
    /// released.
    pub fn swap_material_map(
        &mut self,
        material: ResourceId,
        slot: MapSlot,
        texture: ResourceId,
    ) -> Result<Option<ResourceId>, GpuError> {
        if !self.textures.contains(&texture) {
            return Err(GpuError::UnknownResource(texture));
        }
        let mut previous = None;
        self.update_material(material, |m| previous = m.set_slot(slot, Some(texture)))?;
        Ok(previous)
    }

    /// Disposes one tracked resource. Returns false if it was not tracked
    /// (never allocated, or already released).
    pub fn release(&mut self, id: ResourceId) -> bool {
        let tracked = match id.kind {
            ResourceKind::Geometry => remove_item(&mut self.geometries, id),
            ResourceKind::Material => self.materials.remove(&id).is_some(),
            ResourceKind::Texture => remove_item(&mut self.textures, id),
        };
        if tracked {
            self.backend.dispose(id);
            self.released.bump(id.kind);
        }
        tracked
    }

    /// Disposes every tracked resource, materials first so nothing refers
    /// to a texture after it is gone. Returns what was disposed by this
    /// call; a second call disposes nothing.
    pub fn release_all(&mut self) -> ResourceCounts {
        let mut disposed = ResourceCounts::default();
        let materials = std::mem::take(&mut self.materials);
        let geometries = std::mem::take(&mut self.geometries);
        let textures = std::mem::take(&mut self.textures);
        for id in materials
            .into_keys()
            .chain(geometries)
            .chain(textures)
        {
            self.backend.dispose(id);
            self.released.bump(id.kind);
            disposed.bump(id.kind);
        }
        if disposed.total() > 0 {
            debug!(
                geometries = disposed.geometries,
                materials = disposed.materials,
                textures = disposed.textures,
                "released tracked resources"
            );
        }
        disposed
    }

    /// Releases the device context once. Later calls are no-ops.
    pub fn release_context(&mut self) {
        if self.context_released {
            return;
        }
        self.context_released = true;
        self.backend.release_context();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.context_released {
            self.backend.resize(width, height);
        }
    }

    pub fn render(&mut self, frame: &RenderFrame) -> Result<(), GpuError> {
        if self.context_released {
            return Err(GpuError::ContextLost);
        }
        self.backend.render(frame)
    }
}

fn remove_item(items: &mut Vec<ResourceId>, id: ResourceId) -> bool {
    match items.iter().position(|x| *x == id) {
        Some(pos) => {
            items.swap_remove(pos);
            true
        }
        None => false,
    }
}

impl<B: GpuBackend> Allocator for ResourceManager<B> {
    fn allocate_geometry(&mut self, geometry: &Geometry) -> ResourceId {
        let id = self.next_id(ResourceKind::Geometry);
        let mesh = geometry.build();
        if let Err(err) = self.backend.create_geometry(id, &mesh) {
            warn!(%id, kind = geometry.kind(), %err, "geometry upload failed");
        }
        self.geometries.push(id);
        id
    }

    fn allocate_material(&mut self, material: &Material) -> ResourceId {
        let id = self.next_id(ResourceKind::Material);
        if let Err(err) = self.backend.create_material(id, material) {
            warn!(%id, %err, "material creation failed");
        }
        self.materials.insert(id, material.clone());
        id
    }

    fn allocate_texture(&mut self, texture: &TextureData) -> ResourceId {
        let id = self.next_id(ResourceKind::Texture);
        if let Err(err) = self.backend.create_texture(id, texture) {
            warn!(%id, %err, "texture upload failed");
        }
        self.textures.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{BackendCall, RecordingBackend};
    use pretty_assertions::assert_eq;
    use texture::{SamplingParams, TextureKind};

    fn blank() -> TextureData {
        TextureData::blank(TextureKind::Clouds, 2, 2, SamplingParams::default())
    }

    #[test]
    fn release_all_disposes_each_allocation_once() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut rm = ResourceManager::new(backend);
        let tex = rm.allocate_texture(&blank());
        rm.allocate_geometry(&Geometry::sphere(1.0, 8));
        rm.allocate_material(&Material::lit(tex));

        let disposed = rm.release_all();
        assert_eq!(disposed.total(), 3);
        assert_eq!(rm.counts().total(), 0);
        assert_eq!(log.dispose_count(), 3);
        assert_eq!(log.double_frees(), 0);

        assert_eq!(rm.release_all().total(), 0);
        assert_eq!(log.dispose_count(), 3);
        assert_eq!(rm.allocated(), rm.released());
    }

    #[test]
    fn individual_release_is_not_repeated_by_release_all() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut rm = ResourceManager::new(backend);
        let geo = rm.allocate_geometry(&Geometry::Bolt {
            length: 1.0,
            radius: 0.1,
        });
        let mat = rm.allocate_material(&Material::glow([1.0; 4]));
        assert!(rm.release(mat));
        assert!(!rm.release(mat));
        rm.release_all();
        assert_eq!(log.disposed(), vec![mat, geo]);
        assert_eq!(log.double_frees(), 0);
    }

    #[test]
    fn swap_returns_previous_texture() {
        let mut rm = ResourceManager::new(RecordingBackend::new());
        let procedural = rm.allocate_texture(&blank());
        let loaded = rm.allocate_texture(&blank());
        let mat = rm.allocate_material(&Material::lit(procedural));

        let previous = rm.swap_material_map(mat, MapSlot::Color, loaded).unwrap();
        assert_eq!(previous, Some(procedural));
        assert_eq!(rm.material(mat).unwrap().map, Some(loaded));

        let none = rm.swap_material_map(mat, MapSlot::Normal, procedural).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn swap_rejects_released_targets() {
        let mut rm = ResourceManager::new(RecordingBackend::new());
        let tex = rm.allocate_texture(&blank());
        let mat = rm.allocate_material(&Material::lit(tex));
        rm.release(mat);
        assert_eq!(
            rm.swap_material_map(mat, MapSlot::Color, tex),
            Err(GpuError::UnknownResource(mat))
        );
        rm.release(tex);
        let mat = rm.allocate_material(&Material::stars());
        assert_eq!(
            rm.swap_material_map(mat, MapSlot::Color, tex),
            Err(GpuError::UnknownResource(tex))
        );
    }

    #[test]
    fn context_is_released_once() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut rm = ResourceManager::new(backend);
        rm.release_context();
        rm.release_context();
        let releases = log
            .calls()
            .into_iter()
            .filter(|c| *c == BackendCall::ReleaseContext)
            .count();
        assert_eq!(releases, 1);
        assert_eq!(
            rm.render(&crate::RenderFrame::default()),
            Err(GpuError::ContextLost)
        );
    }
}
