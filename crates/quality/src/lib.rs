//! Adaptive quality gate: decides between the full decorative simulation
//! and a static placeholder from read-only platform signals.

pub mod ambient;
pub mod gate;
pub mod profile;
pub mod scroll;
pub mod signals;

pub use ambient::*;
pub use gate::*;
pub use profile::*;
pub use scroll::*;
pub use signals::*;
