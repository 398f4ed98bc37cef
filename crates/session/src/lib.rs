//! One mounted decorative visual: quality gate, texture synthesis, scene
//! construction, the per-frame loop, async texture upgrades, and teardown.

pub mod config;
pub mod error;
pub mod host;
pub mod session;
pub mod upgrade;

pub use config::*;
pub use error::*;
pub use host::*;
pub use session::*;
pub use upgrade::*;
