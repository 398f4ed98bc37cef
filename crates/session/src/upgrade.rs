use std::cell::Cell;
use std::rc::Rc;

use foundation::ids::ResourceId;
use scene::MapSlot;
use texture::{AssetError, AssetSlot};

/// Shared flag that goes false once, when teardown starts.
#[derive(Debug, Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_live(&self) -> bool {
        self.0.get()
    }

    pub fn same_as(&self, other: &Liveness) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn revoke(&self) {
        self.0.set(false);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// One outstanding asset fetch. Carries everything the completion needs
/// so the fetch itself holds no reference to the session.
#[derive(Debug, Clone)]
pub struct UpgradeTicket {
    pub asset: AssetSlot,
    pub path: String,
    pub(crate) material: ResourceId,
    pub(crate) slot: MapSlot,
    pub(crate) liveness: Liveness,
}

impl UpgradeTicket {
    /// False once the issuing session started tearing down.
    pub fn is_live(&self) -> bool {
        self.liveness.is_live()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpgradeOutcome {
    /// The material now samples the loaded texture.
    Applied { texture: ResourceId },
    /// The load failed; the procedural texture stays for good.
    KeptProcedural(AssetError),
    /// The session or target material is gone, or the slot was already
    /// upgraded. Nothing was touched.
    Discarded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_revocation() {
        let live = Liveness::new();
        let ticket_side = live.clone();
        assert!(ticket_side.is_live());
        live.revoke();
        assert!(!ticket_side.is_live());
    }
}
