//! Procedural texture synthesis.
//!
//! A [`TextureSynthesizer`] acquires an offscreen [`Raster`] from a
//! [`SurfaceProvider`], runs a painting routine against the [`Canvas2d`]
//! trait, and wraps the pixels as immutable [`TextureData`] with fixed
//! sampling parameters. When no surface can be acquired the synthesizer
//! still returns a usable (blank) texture.

pub mod asset;
pub mod color;
pub mod data;
pub mod raster;
pub mod routines;
pub mod synth;

pub use asset::*;
pub use color::*;
pub use data::*;
pub use raster::*;
pub use synth::*;
