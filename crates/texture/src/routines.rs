//! The four canonical painting routines.
//!
//! Randomness is injected so callers can seed it; production callers pass an
//! entropy-seeded generator and every session gets unique textures.

use std::f32::consts::TAU;

use rand::Rng;

use crate::color::{GradientStop, Rgba};
use crate::raster::Canvas2d;

const LAND_PALETTE: [u32; 5] = [0x2f6b3a, 0x3d7f45, 0x5b8c3e, 0x7a7044, 0x8c7a52];
const CITY_PALETTE: [u32; 3] = [0xffd27a, 0xffb347, 0xfff1c1];
const NEBULA_PALETTE: [u32; 4] = [0xc06cff, 0x6c8cff, 0xff6cb5, 0x7be0ff];

/// Feature counts scale with the area relative to a 1024-wide map.
fn scale_of(canvas: &dyn Canvas2d) -> f32 {
    canvas.width() as f32 / 1024.0
}

/// Ocean gradient, landmass blobs, scattered islands, and an equatorial haze band.
pub fn paint_planet_day<R: Rng + ?Sized>(canvas: &mut dyn Canvas2d, rng: &mut R) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let s = scale_of(canvas);

    canvas.clear(Rgba::hex(0x0b2a4a, 1.0));
    canvas.fill_vertical_gradient(
        0.0,
        h,
        &[
            GradientStop::new(0.0, Rgba::hex(0x0a2240, 1.0)),
            GradientStop::new(0.5, Rgba::hex(0x1a5f8f, 1.0)),
            GradientStop::new(1.0, Rgba::hex(0x0a2240, 1.0)),
        ],
    );

    let continents = rng.gen_range(7..=11);
    for _ in 0..continents {
        let cx = rng.gen_range(0.0..w);
        let cy = rng.gen_range(0.2 * h..0.8 * h);
        let lobes = rng.gen_range(6..=14);
        let base = Rgba::hex(LAND_PALETTE[rng.gen_range(0..LAND_PALETTE.len())], 0.85);
        for _ in 0..lobes {
            let ox = rng.gen_range(-0.06f32..0.06) * w;
            let oy = rng.gen_range(-0.08f32..0.08) * h;
            let rx = rng.gen_range(0.02f32..0.07) * w;
            let ry = rx * rng.gen_range(0.45f32..1.0);
            let tone = base.lerp(Rgba::hex(0x9c8a5e, 0.85), rng.gen_range(0.0..0.35));
            canvas.fill_ellipse(cx + ox, cy + oy, rx, ry, rng.gen_range(0.0..TAU), tone, 0.25);
        }
    }

    let islands = (rng.gen_range(40..=80) as f32 * s).ceil() as u32;
    for _ in 0..islands {
        let r = rng.gen_range(1.0f32..4.0) * s.max(0.25);
        let color = Rgba::hex(LAND_PALETTE[rng.gen_range(0..LAND_PALETTE.len())], 0.9);
        canvas.fill_circle(rng.gen_range(0.0..w), rng.gen_range(0.1 * h..0.9 * h), r, color);
    }

    canvas.fill_vertical_gradient(
        0.44 * h,
        0.56 * h,
        &[
            GradientStop::new(0.0, Rgba::hex(0xbfe6ff, 0.0)),
            GradientStop::new(0.5, Rgba::hex(0xbfe6ff, 0.12)),
            GradientStop::new(1.0, Rgba::hex(0xbfe6ff, 0.0)),
        ],
    );
}

/// Sparse warm point lights on a near-black field.
pub fn paint_night_lights<R: Rng + ?Sized>(canvas: &mut dyn Canvas2d, rng: &mut R) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let s = scale_of(canvas);

    canvas.clear(Rgba::hex(0x02030a, 1.0));
    let lights = (rng.gen_range(600..=900) as f32 * s * s).ceil() as u32;
    for _ in 0..lights {
        let color = Rgba::hex(CITY_PALETTE[rng.gen_range(0..CITY_PALETTE.len())], rng.gen_range(0.5..1.0));
        let r = rng.gen_range(0.5f32..1.8) * s.max(1.0);
        canvas.fill_circle(rng.gen_range(0.0..w), rng.gen_range(0.15 * h..0.85 * h), r, color);
    }
}

/// Soft translucent ellipses on a transparent field.
pub fn paint_clouds<R: Rng + ?Sized>(canvas: &mut dyn Canvas2d, rng: &mut R) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let s = scale_of(canvas);

    canvas.clear(Rgba::TRANSPARENT);
    let puffs = (rng.gen_range(120..=180) as f32 * s).ceil() as u32;
    for _ in 0..puffs {
        let rx = rng.gen_range(0.02f32..0.09) * w;
        let ry = rx * rng.gen_range(0.3f32..0.6);
        let color = Rgba::WHITE.with_alpha(rng.gen_range(0.05..0.25));
        canvas.fill_ellipse(
            rng.gen_range(0.0..w),
            rng.gen_range(0.08 * h..0.92 * h),
            rx,
            ry,
            rng.gen_range(-0.3..0.3),
            color,
            0.8,
        );
    }
}

/// Radial nebula, angularly distributed spiral-arm glows, and a dense star speckle.
pub fn paint_galaxy<R: Rng + ?Sized>(canvas: &mut dyn Canvas2d, rng: &mut R) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let (cx, cy) = (0.5 * w, 0.5 * h);
    let extent = 0.5 * w.min(h);

    canvas.clear(Rgba::hex(0x02010a, 1.0));
    canvas.fill_radial_gradient(
        cx,
        cy,
        1.2 * extent,
        &[
            GradientStop::new(0.0, Rgba::hex(0x6b3fa0, 0.55)),
            GradientStop::new(0.35, Rgba::hex(0x2a1f6b, 0.35)),
            GradientStop::new(1.0, Rgba::hex(0x02010a, 0.0)),
        ],
    );

    let arms = rng.gen_range(4..=6);
    for arm in 0..arms {
        let base_angle = arm as f32 / arms as f32 * TAU + rng.gen_range(-0.2f32..0.2);
        let color = Rgba::hex(NEBULA_PALETTE[rng.gen_range(0..NEBULA_PALETTE.len())], 1.0);
        let glows = rng.gen_range(10..=16);
        for i in 0..glows {
            let t = (i as f32 + 1.0) / glows as f32;
            // Logarithmic-ish spiral: angle grows as the arm reaches outward.
            let angle = base_angle + t * 2.4;
            let dist = t * 0.85 * extent;
            let r = extent * rng.gen_range(0.08f32..0.16) * (1.0 - 0.5 * t);
            let alpha = rng.gen_range(0.08..0.18);
            canvas.fill_radial_gradient(
                cx + angle.cos() * dist,
                cy + angle.sin() * dist,
                r,
                &[
                    GradientStop::new(0.0, color.with_alpha(alpha)),
                    GradientStop::new(1.0, color.with_alpha(0.0)),
                ],
            );
        }
    }

    let stars = (w * h / 250.0).ceil() as u32;
    for _ in 0..stars {
        let brightness = rng.gen_range(0.35f32..1.0);
        let color = Rgba::new(1.0, 1.0, 1.0, brightness * brightness);
        canvas.fill_circle(rng.gen_range(0.0..w), rng.gen_range(0.0..h), rng.gen_range(0.4..1.3), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn planet_day_is_opaque_with_land_and_ocean() {
        let mut raster = Raster::new(128, 64).wrapping(true);
        paint_planet_day(&mut raster, &mut StdRng::seed_from_u64(7));

        let mut bluish = 0;
        let mut greenish = 0;
        for y in 0..64 {
            for x in 0..128 {
                let px = raster.pixel(x, y);
                assert!(px.a > 0.99);
                if px.b > px.g && px.b > px.r {
                    bluish += 1;
                } else if px.g >= px.b {
                    greenish += 1;
                }
            }
        }
        assert!(bluish > 0, "no ocean");
        assert!(greenish > 0, "no land");
    }

    #[test]
    fn night_lights_are_sparse() {
        let mut raster = Raster::new(256, 128);
        paint_night_lights(&mut raster, &mut StdRng::seed_from_u64(3));
        let lit = (0..128)
            .flat_map(|y| (0..256).map(move |x| (x, y)))
            .filter(|&(x, y)| raster.pixel(x, y).r > 0.2)
            .count();
        assert!(lit > 0);
        assert!(lit < 256 * 128 / 4, "lights cover {lit} pixels");
    }

    #[test]
    fn clouds_leave_transparent_gaps() {
        let mut raster = Raster::new(128, 64);
        paint_clouds(&mut raster, &mut StdRng::seed_from_u64(11));
        let alphas: Vec<f32> = (0..64)
            .flat_map(|y| (0..128).map(move |x| (x, y)))
            .map(|(x, y)| raster.pixel(x, y).a)
            .collect();
        assert!(alphas.iter().any(|a| *a > 0.0));
        assert!(alphas.iter().any(|a| *a < 0.5));
    }

    #[test]
    fn galaxy_core_is_brighter_than_corner() {
        let mut raster = Raster::new(128, 128);
        paint_galaxy(&mut raster, &mut StdRng::seed_from_u64(5));
        let luma = |x0: u32, y0: u32| -> f32 {
            let mut sum = 0.0;
            for y in y0..y0 + 16 {
                for x in x0..x0 + 16 {
                    let px = raster.pixel(x, y);
                    sum += px.r + px.g + px.b;
                }
            }
            sum
        };
        assert!(luma(56, 56) > luma(0, 0));
    }

    #[test]
    fn same_seed_paints_same_pixels() {
        let mut a = Raster::new(64, 32);
        let mut b = Raster::new(64, 32);
        paint_clouds(&mut a, &mut StdRng::seed_from_u64(1));
        paint_clouds(&mut b, &mut StdRng::seed_from_u64(1));
        assert_eq!(a.into_image(), b.into_image());
    }
}
