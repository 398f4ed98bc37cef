use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerParams {
    /// Fraction of the remaining distance covered each frame.
    pub smoothing: f64,
    /// Root yaw (radians) at the horizontal edge of the viewport.
    pub max_yaw: f64,
    /// Root pitch (radians) at the vertical edge of the viewport.
    pub max_pitch: f64,
}

impl Default for PointerParams {
    fn default() -> Self {
        Self {
            smoothing: 0.045,
            max_yaw: 0.35,
            max_pitch: 0.18,
        }
    }
}

/// Maps a viewport pixel position into `[-1, 1]` on both axes, +Y up.
pub fn normalize_pointer(x_px: f64, y_px: f64, width: f64, height: f64) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    let nx = (x_px / width) * 2.0 - 1.0;
    let ny = -((y_px / height) * 2.0 - 1.0);
    Vec2::new(nx.clamp(-1.0, 1.0), ny.clamp(-1.0, 1.0))
}

/// Exponential ease of the root tilt toward the latest pointer target.
///
/// Frame-count based: every `step` covers `smoothing` of the remaining gap
/// regardless of frame duration.
#[derive(Debug, Clone)]
pub struct PointerEase {
    params: PointerParams,
    target: Vec2,
    current: Vec2,
}

impl PointerEase {
    pub fn new(params: PointerParams) -> Self {
        Self {
            params,
            target: Vec2::ZERO,
            current: Vec2::ZERO,
        }
    }

    /// `normalized` as produced by [`normalize_pointer`].
    pub fn set_target(&mut self, normalized: Vec2) {
        self.target = Vec2::new(
            normalized.x * self.params.max_yaw,
            normalized.y * self.params.max_pitch,
        );
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Current (yaw, pitch) in radians.
    pub fn current(&self) -> Vec2 {
        self.current
    }

    pub fn step(&mut self) -> Vec2 {
        let s = self.params.smoothing.clamp(0.0, 1.0);
        self.current = self.current + (self.target - self.current) * s;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_corners_and_center() {
        let c = normalize_pointer(400.0, 300.0, 800.0, 600.0);
        assert!(c.x.abs() < 1e-12 && c.y.abs() < 1e-12);
        let tl = normalize_pointer(0.0, 0.0, 800.0, 600.0);
        assert_eq!(tl, Vec2::new(-1.0, 1.0));
        let br = normalize_pointer(800.0, 600.0, 800.0, 600.0);
        assert_eq!(br, Vec2::new(1.0, -1.0));
        assert_eq!(normalize_pointer(5.0, 5.0, 0.0, 600.0), Vec2::ZERO);
    }

    #[test]
    fn first_step_covers_smoothing_fraction() {
        let mut ease = PointerEase::new(PointerParams::default());
        ease.set_target(Vec2::new(1.0, 0.0));
        let v = ease.step();
        assert!((v.x - 0.35 * 0.045).abs() < 1e-12);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn gap_shrinks_monotonically() {
        let mut ease = PointerEase::new(PointerParams::default());
        ease.set_target(Vec2::new(-0.6, 0.8));
        let mut prev_gap = f64::INFINITY;
        for _ in 0..200 {
            let cur = ease.step();
            let d = ease.target() - cur;
            let gap = (d.x * d.x + d.y * d.y).sqrt();
            assert!(gap < prev_gap);
            prev_gap = gap;
        }
        assert!(prev_gap < 1e-3);
    }
}
