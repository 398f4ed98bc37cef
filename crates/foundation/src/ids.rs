use crate::handles::Handle;

/// Kind of GPU-side resource a [`ResourceId`] refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
}

/// Session-unique id of an allocated GPU-side resource.
///
/// Ids are never reused within a session, so a released id cannot be
/// confused with a later allocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub serial: u64,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, serial: u64) -> Self {
        Self { kind, serial }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.kind {
            ResourceKind::Geometry => "geo",
            ResourceKind::Material => "mat",
            ResourceKind::Texture => "tex",
        };
        write!(f, "{tag}#{}", self.serial)
    }
}

/// Monotonic serial source for [`ResourceId`]s.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, kind: ResourceKind) -> ResourceId {
        let id = ResourceId::new(kind, self.next);
        self.next += 1;
        id
    }
}

/// Scene node id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub Handle);

#[cfg(test)]
mod tests {
    use super::{IdAllocator, ResourceKind};

    #[test]
    fn ids_are_unique_across_kinds() {
        let mut ids = IdAllocator::new();
        let a = ids.next(ResourceKind::Geometry);
        let b = ids.next(ResourceKind::Material);
        let c = ids.next(ResourceKind::Geometry);
        assert_ne!(a, c);
        assert_ne!(a.serial, b.serial);
        assert_eq!(c.to_string(), "geo#2");
    }
}
