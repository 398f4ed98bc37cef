//! Scene graph, mesh generation, and the two decorative prefabs.

pub mod allocator;
pub mod components;
pub mod graph;
pub mod mesh;
pub mod prefabs;

pub use allocator::*;
pub use components::*;
pub use graph::*;
pub use mesh::{MeshData, MeshVertex};
pub use prefabs::*;
