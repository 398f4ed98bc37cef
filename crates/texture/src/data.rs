use image::RgbaImage;

use crate::raster::Raster;

/// Which procedural routine produced a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureKind {
    PlanetDay,
    NightLights,
    Clouds,
    Galaxy,
}

impl TextureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TextureKind::PlanetDay => "planet-day",
            TextureKind::NightLights => "night-lights",
            TextureKind::Clouds => "clouds",
            TextureKind::Galaxy => "galaxy",
        }
    }

    /// Equirectangular maps wrap around the sphere horizontally.
    pub fn wraps_horizontally(self) -> bool {
        !matches!(self, TextureKind::Galaxy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    Procedural(TextureKind),
    /// Synthesis could not acquire a drawing surface.
    Blank(TextureKind),
    /// Decoded from an external asset at this path.
    Asset(String),
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ColorSpace {
    #[default]
    Srgb,
    Linear,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    Repeat,
    ClampToEdge,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SamplingParams {
    pub color_space: ColorSpace,
    pub anisotropy: u16,
    pub wrap: WrapMode,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            color_space: ColorSpace::Srgb,
            anisotropy: 8,
            wrap: WrapMode::Repeat,
        }
    }
}

/// Immutable RGBA8 texture plus how it should be sampled.
#[derive(Debug, Clone)]
pub struct TextureData {
    pixels: RgbaImage,
    pub sampling: SamplingParams,
    pub source: TextureSource,
}

impl TextureData {
    pub fn from_raster(raster: Raster, sampling: SamplingParams, source: TextureSource) -> Self {
        Self {
            pixels: raster.into_image(),
            sampling,
            source,
        }
    }

    pub fn from_image(pixels: RgbaImage, sampling: SamplingParams, source: TextureSource) -> Self {
        Self {
            pixels,
            sampling,
            source,
        }
    }

    /// Fully transparent texture of the requested size.
    pub fn blank(kind: TextureKind, width: u32, height: u32, sampling: SamplingParams) -> Self {
        Self {
            pixels: RgbaImage::new(width.max(1), height.max(1)),
            sampling,
            source: TextureSource::Blank(kind),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Tightly packed RGBA8 rows, top row first.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.source, TextureSource::Blank(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{SamplingParams, TextureData, TextureKind, TextureSource};

    #[test]
    fn blank_texture_is_transparent_and_sized() {
        let t = TextureData::blank(TextureKind::Clouds, 8, 4, SamplingParams::default());
        assert_eq!((t.width(), t.height()), (8, 4));
        assert_eq!(t.as_bytes().len(), 8 * 4 * 4);
        assert!(t.as_bytes().iter().all(|b| *b == 0));
        assert_eq!(t.source, TextureSource::Blank(TextureKind::Clouds));
    }

    #[test]
    fn default_sampling_is_srgb_with_anisotropy() {
        let s = SamplingParams::default();
        assert_eq!(s.anisotropy, 8);
        assert_eq!(s.color_space, super::ColorSpace::Srgb);
    }
}
