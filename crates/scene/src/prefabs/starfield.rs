use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::StarPoint;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldParams {
    pub count: u32,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub min_size: f64,
    pub max_size: f64,
}

impl Default for StarfieldParams {
    fn default() -> Self {
        Self {
            count: 1500,
            inner_radius: 8.0,
            outer_radius: 14.0,
            min_size: 0.02,
            max_size: 0.08,
        }
    }
}

const TINTS: [[f32; 3]; 4] = [
    [1.0, 1.0, 1.0],
    [0.74, 0.84, 1.0],
    [1.0, 0.88, 0.72],
    [0.86, 0.78, 1.0],
];

fn range<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64) -> f64 {
    if b > a { rng.gen_range(a..=b) } else { a }
}

/// Stars spread uniformly over directions, radius uniform in
/// `[inner_radius, outer_radius]`.
pub fn generate_starfield<R: Rng + ?Sized>(params: &StarfieldParams, rng: &mut R) -> Vec<StarPoint> {
    (0..params.count)
        .map(|_| {
            let z: f64 = rng.gen_range(-1.0..=1.0);
            let phi: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let ring = (1.0 - z * z).max(0.0).sqrt();
            let r = range(rng, params.inner_radius, params.outer_radius);
            let tint = TINTS[rng.gen_range(0..TINTS.len())];
            let brightness: f32 = rng.gen_range(0.55..=1.0);
            StarPoint {
                position: [
                    (ring * phi.cos() * r) as f32,
                    (z * r) as f32,
                    (ring * phi.sin() * r) as f32,
                ],
                size: range(rng, params.min_size, params.max_size) as f32,
                color: tint.map(|c| c * brightness),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn stars_sit_on_the_shell() {
        let params = StarfieldParams::default();
        let mut rng = StdRng::seed_from_u64(9);
        let stars = generate_starfield(&params, &mut rng);
        assert_eq!(stars.len(), 1500);
        for s in &stars {
            let [x, y, z] = s.position;
            let r = (x * x + y * y + z * z).sqrt() as f64;
            assert!(r >= 8.0 - 1e-3 && r <= 14.0 + 1e-3, "{r}");
            assert!((0.02 - 1e-6..=0.08 + 1e-6).contains(&(s.size as f64)));
        }
    }

    #[test]
    fn directions_cover_both_hemispheres() {
        let mut rng = StdRng::seed_from_u64(10);
        let stars = generate_starfield(&StarfieldParams::default(), &mut rng);
        let above = stars.iter().filter(|s| s.position[1] > 0.0).count();
        assert!(above > 600 && above < 900, "{above}");
    }
}
