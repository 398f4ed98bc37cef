/// Straight (non-premultiplied) RGBA color with channels in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// `0xRRGGBB` with the given alpha.
    pub fn hex(rgb: u32, a: f32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
            a,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self {
            r: px[0] as f32 / 255.0,
            g: px[1] as f32 / 255.0,
            b: px[2] as f32 / 255.0,
            a: px[3] as f32 / 255.0,
        }
    }

    /// Source-over compositing of `self` onto `dst`.
    pub fn over(self, dst: Rgba) -> Rgba {
        let a = self.a + dst.a * (1.0 - self.a);
        if a <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        let mix = |s: f32, d: f32| (s * self.a + d * dst.a * (1.0 - self.a)) / a;
        Rgba {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a,
        }
    }
}

/// A color stop at `offset` in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Samples a gradient. Stops must be sorted by offset.
pub fn sample_gradient(stops: &[GradientStop], t: f32) -> Rgba {
    let Some(first) = stops.first() else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            return a.color.lerp(b.color, (t - a.offset) / span);
        }
    }
    stops[stops.len() - 1].color
}

#[cfg(test)]
mod tests {
    use super::{GradientStop, Rgba, sample_gradient};

    #[test]
    fn hex_decodes_channels() {
        let c = Rgba::hex(0xff8000, 1.0);
        assert_eq!(c.to_rgba8(), [255, 128, 0, 255]);
    }

    #[test]
    fn opaque_source_replaces_destination() {
        let out = Rgba::hex(0x00ff00, 1.0).over(Rgba::hex(0xff0000, 1.0));
        assert_eq!(out.to_rgba8(), [0, 255, 0, 255]);
    }

    #[test]
    fn half_alpha_mixes_evenly() {
        let out = Rgba::WHITE.with_alpha(0.5).over(Rgba::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(out.to_rgba8(), [128, 128, 128, 255]);
    }

    #[test]
    fn gradient_clamps_and_interpolates() {
        let stops = [
            GradientStop::new(0.0, Rgba::new(0.0, 0.0, 0.0, 1.0)),
            GradientStop::new(1.0, Rgba::new(1.0, 1.0, 1.0, 1.0)),
        ];
        assert_eq!(sample_gradient(&stops, -1.0), stops[0].color);
        assert_eq!(sample_gradient(&stops, 2.0), stops[1].color);
        assert_eq!(sample_gradient(&stops, 0.5).to_rgba8(), [128, 128, 128, 255]);
        assert_eq!(sample_gradient(&[], 0.5), Rgba::TRANSPARENT);
    }
}
