use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use foundation::ids::ResourceId;
use scene::{Material, MeshData};
use texture::TextureData;

use crate::backend::GpuBackend;
use crate::error::GpuError;
use crate::renderer::RenderFrame;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateGeometry(ResourceId),
    CreateMaterial(ResourceId),
    UpdateMaterial(ResourceId),
    CreateTexture(ResourceId),
    Dispose(ResourceId),
    Resize { width: u32, height: u32 },
    Render { draws: usize },
    ReleaseContext,
}

#[derive(Debug, Default)]
struct LogInner {
    calls: Vec<BackendCall>,
    live: BTreeSet<ResourceId>,
    double_frees: usize,
}

/// Shared view of what a [`RecordingBackend`] was asked to do. Survives the
/// backend itself so tests can inspect a torn-down session.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog(Rc<RefCell<LogInner>>);

impl RecordingLog {
    pub fn calls(&self) -> Vec<BackendCall> {
        self.0.borrow().calls.clone()
    }

    pub fn created_count(&self) -> usize {
        self.0
            .borrow()
            .calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    BackendCall::CreateGeometry(_)
                        | BackendCall::CreateMaterial(_)
                        | BackendCall::CreateTexture(_)
                )
            })
            .count()
    }

    pub fn disposed(&self) -> Vec<ResourceId> {
        self.0
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Dispose(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn dispose_count(&self) -> usize {
        self.disposed().len()
    }

    /// Ids disposed while not live: never created or disposed before.
    pub fn double_frees(&self) -> usize {
        self.0.borrow().double_frees
    }

    pub fn live(&self) -> usize {
        self.0.borrow().live.len()
    }

    pub fn render_count(&self) -> usize {
        self.0
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Render { .. }))
            .count()
    }

    fn push(&self, call: BackendCall) {
        let mut inner = self.0.borrow_mut();
        match &call {
            BackendCall::CreateGeometry(id)
            | BackendCall::CreateMaterial(id)
            | BackendCall::CreateTexture(id) => {
                inner.live.insert(*id);
            }
            BackendCall::Dispose(id) => {
                if !inner.live.remove(id) {
                    inner.double_frees += 1;
                }
            }
            _ => {}
        }
        inner.calls.push(call);
    }
}

/// Headless backend that records every call.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: RecordingLog,
    released: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> RecordingLog {
        self.log.clone()
    }

    fn check_context(&self) -> Result<(), GpuError> {
        if self.released {
            Err(GpuError::ContextLost)
        } else {
            Ok(())
        }
    }
}

impl GpuBackend for RecordingBackend {
    fn create_geometry(&mut self, id: ResourceId, _mesh: &MeshData) -> Result<(), GpuError> {
        self.check_context()?;
        self.log.push(BackendCall::CreateGeometry(id));
        Ok(())
    }

    fn create_material(&mut self, id: ResourceId, _material: &Material) -> Result<(), GpuError> {
        self.check_context()?;
        self.log.push(BackendCall::CreateMaterial(id));
        Ok(())
    }

    fn update_material(&mut self, id: ResourceId, _material: &Material) -> Result<(), GpuError> {
        self.check_context()?;
        self.log.push(BackendCall::UpdateMaterial(id));
        Ok(())
    }

    fn create_texture(&mut self, id: ResourceId, _texture: &TextureData) -> Result<(), GpuError> {
        self.check_context()?;
        self.log.push(BackendCall::CreateTexture(id));
        Ok(())
    }

    fn dispose(&mut self, id: ResourceId) {
        self.log.push(BackendCall::Dispose(id));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.log.push(BackendCall::Resize { width, height });
    }

    fn render(&mut self, frame: &RenderFrame) -> Result<(), GpuError> {
        self.check_context()?;
        self.log.push(BackendCall::Render {
            draws: frame.draws.len(),
        });
        Ok(())
    }

    fn release_context(&mut self) {
        self.released = true;
        self.log.push(BackendCall::ReleaseContext);
    }
}
