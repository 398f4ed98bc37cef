use rand::Rng;
use tracing::debug;

use crate::data::{SamplingParams, TextureData, TextureKind, TextureSource};
use crate::raster::{Canvas2d, Raster};
use crate::routines;

/// Hands out offscreen drawing surfaces.
///
/// Returning `None` means no 2D drawing capability is available for the
/// requested size; synthesis then degrades to a blank texture.
pub trait SurfaceProvider {
    fn acquire(&mut self, width: u32, height: u32) -> Option<Raster>;
}

/// Always succeeds with a CPU raster.
#[derive(Debug, Default, Copy, Clone)]
pub struct SoftwareSurfaces;

impl SurfaceProvider for SoftwareSurfaces {
    fn acquire(&mut self, width: u32, height: u32) -> Option<Raster> {
        Some(Raster::new(width, height))
    }
}

/// Refuses surfaces larger than the device can sample from.
#[derive(Debug, Copy, Clone)]
pub struct LimitedSurfaces {
    pub max_dimension: u32,
}

impl SurfaceProvider for LimitedSurfaces {
    fn acquire(&mut self, width: u32, height: u32) -> Option<Raster> {
        if width == 0 || height == 0 || width > self.max_dimension || height > self.max_dimension {
            return None;
        }
        Some(Raster::new(width, height))
    }
}

/// No drawing capability at all.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoSurfaces;

impl SurfaceProvider for NoSurfaces {
    fn acquire(&mut self, _width: u32, _height: u32) -> Option<Raster> {
        None
    }
}

#[derive(Debug)]
pub struct TextureSynthesizer<P> {
    surfaces: P,
    sampling: SamplingParams,
}

impl<P: SurfaceProvider> TextureSynthesizer<P> {
    pub fn new(surfaces: P) -> Self {
        Self {
            surfaces,
            sampling: SamplingParams::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Paints one of the canonical routines into a fresh surface.
    pub fn synthesize<R: Rng + ?Sized>(
        &mut self,
        kind: TextureKind,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> TextureData {
        self.synthesize_with(kind, width, height, |canvas| match kind {
            TextureKind::PlanetDay => routines::paint_planet_day(canvas, rng),
            TextureKind::NightLights => routines::paint_night_lights(canvas, rng),
            TextureKind::Clouds => routines::paint_clouds(canvas, rng),
            TextureKind::Galaxy => routines::paint_galaxy(canvas, rng),
        })
    }

    /// Runs an arbitrary painting routine. The routine is skipped when no
    /// surface is available.
    pub fn synthesize_with<F>(&mut self, kind: TextureKind, width: u32, height: u32, paint: F) -> TextureData
    where
        F: FnOnce(&mut dyn Canvas2d),
    {
        let Some(raster) = self.surfaces.acquire(width, height) else {
            debug!(kind = kind.as_str(), width, height, "no drawing surface; using blank texture");
            return TextureData::blank(kind, width, height, self.sampling);
        };
        let mut raster = raster.wrapping(kind.wraps_horizontally());
        paint(&mut raster);
        TextureData::from_raster(raster, self.sampling, TextureSource::Procedural(kind))
    }
}
