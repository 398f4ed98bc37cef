use image::RgbaImage;

use crate::color::{GradientStop, Rgba, sample_gradient};

/// Immediate-mode 2D drawing context used by the synthesis routines.
///
/// Coordinates are in pixels with the origin at the top-left corner. All
/// fills composite source-over.
pub trait Canvas2d {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Replaces every pixel with `color`.
    fn clear(&mut self, color: Rgba);

    /// Composites a top-to-bottom gradient over the rows `y0..y1`.
    fn fill_vertical_gradient(&mut self, y0: f32, y1: f32, stops: &[GradientStop]);

    /// Composites a radial gradient centered at `(cx, cy)`; offset 1.0 sits at
    /// `radius`. Pixels beyond the radius are untouched.
    fn fill_radial_gradient(&mut self, cx: f32, cy: f32, radius: f32, stops: &[GradientStop]);

    /// Composites a rotated ellipse. `feather` in `[0, 1]` is the fraction of
    /// the radius over which the edge fades out.
    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, rotation: f32, color: Rgba, feather: f32);

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgba) {
        self.fill_ellipse(cx, cy, r, r, 0.0, color, 0.35);
    }
}

/// Software raster surface backed by an [`RgbaImage`].
///
/// With `wrap_x` set, shapes crossing the left or right edge continue on the
/// opposite side, which keeps equirectangular planet maps seamless.
#[derive(Debug, Clone)]
pub struct Raster {
    image: RgbaImage,
    wrap_x: bool,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
            wrap_x: false,
        }
    }

    pub fn wrapping(mut self, wrap_x: bool) -> Self {
        self.wrap_x = wrap_x;
        self
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        Rgba::from_rgba8(self.image.get_pixel(x, y).0)
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn blend(&mut self, x: u32, y: u32, src: Rgba) {
        if src.a <= 0.0 {
            return;
        }
        let px = self.image.get_pixel_mut(x, y);
        let dst = Rgba::from_rgba8(px.0);
        px.0 = src.over(dst).to_rgba8();
    }

    fn ellipse_pass(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, rotation: f32, color: Rgba, feather: f32) {
        let (w, h) = (self.image.width() as i64, self.image.height() as i64);
        let reach = rx.max(ry);
        let x0 = ((cx - reach).floor() as i64).max(0);
        let x1 = ((cx + reach).ceil() as i64).min(w - 1);
        let y0 = ((cy - reach).floor() as i64).max(0);
        let y1 = ((cy + reach).ceil() as i64).min(h - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        let (sin_r, cos_r) = rotation.sin_cos();
        let feather = feather.clamp(0.0, 1.0);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let u = (dx * cos_r + dy * sin_r) / rx;
                let v = (-dx * sin_r + dy * cos_r) / ry;
                let d = (u * u + v * v).sqrt();
                if d >= 1.0 {
                    continue;
                }
                let coverage = if feather <= 0.0 || d <= 1.0 - feather {
                    1.0
                } else {
                    (1.0 - d) / feather
                };
                self.blend(x as u32, y as u32, color.with_alpha(color.a * coverage));
            }
        }
    }
}

impl Canvas2d for Raster {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn clear(&mut self, color: Rgba) {
        let px = image::Rgba(color.to_rgba8());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn fill_vertical_gradient(&mut self, y0: f32, y1: f32, stops: &[GradientStop]) {
        let h = self.image.height();
        let start = y0.max(0.0).floor() as u32;
        let end = (y1.ceil().max(0.0) as u32).min(h);
        let span = (y1 - y0).max(f32::EPSILON);
        for y in start..end {
            let t = (y as f32 + 0.5 - y0) / span;
            let color = sample_gradient(stops, t);
            for x in 0..self.image.width() {
                self.blend(x, y, color);
            }
        }
    }

    fn fill_radial_gradient(&mut self, cx: f32, cy: f32, radius: f32, stops: &[GradientStop]) {
        if radius <= 0.0 {
            return;
        }
        let (w, h) = (self.image.width() as i64, self.image.height() as i64);
        let x0 = ((cx - radius).floor() as i64).max(0);
        let x1 = ((cx + radius).ceil() as i64).min(w - 1);
        let y0 = ((cy - radius).floor() as i64).max(0);
        let y1 = ((cy + radius).ceil() as i64).min(h - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let t = (dx * dx + dy * dy).sqrt() / radius;
                if t > 1.0 {
                    continue;
                }
                self.blend(x as u32, y as u32, sample_gradient(stops, t));
            }
        }
    }

    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, rotation: f32, color: Rgba, feather: f32) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        self.ellipse_pass(cx, cy, rx, ry, rotation, color, feather);
        if self.wrap_x {
            let w = self.image.width() as f32;
            let reach = rx.max(ry);
            if cx - reach < 0.0 {
                self.ellipse_pass(cx + w, cy, rx, ry, rotation, color, feather);
            }
            if cx + reach > w {
                self.ellipse_pass(cx - w, cy, rx, ry, rotation, color, feather);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Canvas2d, Raster};
    use crate::color::{GradientStop, Rgba};

    #[test]
    fn clear_fills_every_pixel() {
        let mut r = Raster::new(4, 2);
        r.clear(Rgba::hex(0x102030, 1.0));
        assert_eq!(r.pixel(3, 1).to_rgba8(), [0x10, 0x20, 0x30, 255]);
    }

    #[test]
    fn ellipse_covers_center_not_corners() {
        let mut r = Raster::new(16, 16);
        r.fill_ellipse(8.0, 8.0, 4.0, 4.0, 0.0, Rgba::WHITE, 0.0);
        assert_eq!(r.pixel(8, 8).to_rgba8(), [255, 255, 255, 255]);
        assert_eq!(r.pixel(0, 0).a, 0.0);
        assert_eq!(r.pixel(15, 15).a, 0.0);
    }

    #[test]
    fn wrapping_ellipse_reappears_on_opposite_edge() {
        let mut r = Raster::new(32, 8).wrapping(true);
        r.fill_ellipse(0.5, 4.0, 3.0, 3.0, 0.0, Rgba::WHITE, 0.0);
        assert!(r.pixel(31, 4).a > 0.0);

        let mut r = Raster::new(32, 8);
        r.fill_ellipse(0.5, 4.0, 3.0, 3.0, 0.0, Rgba::WHITE, 0.0);
        assert_eq!(r.pixel(31, 4).a, 0.0);
    }

    #[test]
    fn radial_gradient_fades_outward() {
        let mut r = Raster::new(20, 20);
        r.fill_radial_gradient(
            10.0,
            10.0,
            10.0,
            &[
                GradientStop::new(0.0, Rgba::WHITE),
                GradientStop::new(1.0, Rgba::WHITE.with_alpha(0.0)),
            ],
        );
        assert!(r.pixel(10, 10).a > r.pixel(16, 10).a);
        assert_eq!(r.pixel(0, 0).a, 0.0);
    }

    #[test]
    fn vertical_gradient_only_touches_its_rows() {
        let mut r = Raster::new(4, 10);
        r.fill_vertical_gradient(2.0, 4.0, &[GradientStop::new(0.0, Rgba::WHITE)]);
        assert_eq!(r.pixel(0, 1).a, 0.0);
        assert_eq!(r.pixel(0, 2).a, 1.0);
        assert_eq!(r.pixel(0, 3).a, 1.0);
        assert_eq!(r.pixel(0, 4).a, 0.0);
    }
}
