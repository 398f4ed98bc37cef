pub mod frame;
pub mod lifecycle;

pub use frame::*;
pub use lifecycle::*;
