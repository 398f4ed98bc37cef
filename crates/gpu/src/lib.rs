//! Backend-agnostic GPU resource tracking and frame collection.
//!
//! [`ResourceManager`] is the only place GPU-side objects are created and
//! destroyed. It forwards to a [`GpuBackend`]: wgpu in the browser,
//! [`RecordingBackend`] in tests.

pub mod backend;
pub mod error;
pub mod recording;
pub mod renderer;
pub mod resources;

pub use backend::*;
pub use error::*;
pub use recording::*;
pub use renderer::*;
pub use resources::*;
