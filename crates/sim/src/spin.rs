use foundation::math::Vec3;

/// Constant angular velocity of a layer, radians per second per axis.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct LayerSpin {
    pub base: Vec3,
    pub rate: Vec3,
}

impl LayerSpin {
    pub fn about_y(rate: f64) -> Self {
        Self {
            base: Vec3::ZERO,
            rate: Vec3::new(0.0, rate, 0.0),
        }
    }

    pub fn with_base(mut self, base: Vec3) -> Self {
        self.base = base;
        self
    }

    pub fn rotation_at(&self, elapsed: f64) -> Vec3 {
        self.base + self.rate * elapsed
    }
}
