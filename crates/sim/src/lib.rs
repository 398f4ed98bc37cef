//! Per-frame simulation for the decorative scenes.
//!
//! Everything positional is a closed-form function of elapsed time; only
//! pointer easing, emitter cooldowns, and transient effects carry state
//! between frames.

pub mod effects;
pub mod orbit;
pub mod pointer;
pub mod simulator;
pub mod spin;

pub use effects::*;
pub use orbit::*;
pub use pointer::*;
pub use simulator::*;
pub use spin::*;
