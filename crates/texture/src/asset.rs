use crate::data::{SamplingParams, TextureData, TextureSource};

/// Externally loaded higher-fidelity maps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetSlot {
    Day,
    Night,
    Clouds,
    Normal,
}

impl AssetSlot {
    pub const ALL: [AssetSlot; 4] = [AssetSlot::Day, AssetSlot::Night, AssetSlot::Clouds, AssetSlot::Normal];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetSlot::Day => "day",
            AssetSlot::Night => "night",
            AssetSlot::Clouds => "clouds",
            AssetSlot::Normal => "normal",
        }
    }

    /// Normal maps hold vectors, not colors.
    pub fn color_space(self) -> crate::data::ColorSpace {
        match self {
            AssetSlot::Normal => crate::data::ColorSpace::Linear,
            _ => crate::data::ColorSpace::Srgb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    NotFound(String),
    Network(String),
    Decode(String),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::NotFound(path) => write!(f, "texture asset not found: {path}"),
            AssetError::Network(msg) => write!(f, "texture asset fetch failed: {msg}"),
            AssetError::Decode(msg) => write!(f, "texture asset decode failed: {msg}"),
        }
    }
}

impl std::error::Error for AssetError {}

/// Decodes PNG or JPEG bytes into an RGBA8 texture.
pub fn decode_asset(
    path: &str,
    bytes: &[u8],
    slot: AssetSlot,
    sampling: SamplingParams,
) -> Result<TextureData, AssetError> {
    let image = image::load_from_memory(bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
    let sampling = SamplingParams {
        color_space: slot.color_space(),
        ..sampling
    };
    Ok(TextureData::from_image(
        image.to_rgba8(),
        sampling,
        TextureSource::Asset(path.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColorSpace;
    use image::{ImageFormat, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_asset() {
        let tex = decode_asset("textures/day.png", &png_bytes(4, 2), AssetSlot::Day, SamplingParams::default()).unwrap();
        assert_eq!((tex.width(), tex.height()), (4, 2));
        assert_eq!(tex.pixel(1, 1), [10, 20, 30, 255]);
        assert_eq!(tex.source, TextureSource::Asset("textures/day.png".into()));
    }

    #[test]
    fn normal_maps_sample_linearly() {
        let tex = decode_asset("n.png", &png_bytes(1, 1), AssetSlot::Normal, SamplingParams::default()).unwrap();
        assert_eq!(tex.sampling.color_space, ColorSpace::Linear);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = decode_asset("x.jpg", b"not an image", AssetSlot::Day, SamplingParams::default()).unwrap_err();
        assert!(matches!(err, AssetError::Decode(_)));
    }
}
