use quality::QualityThresholds;
use scene::{BackdropParams, BodyParams, HeroOrbParams, StarfieldParams};
use serde::{Deserialize, Serialize};
use sim::{EmitterParams, PointerParams};
use texture::{AssetSlot, SamplingParams};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub day: String,
    pub night: String,
    pub clouds: String,
    pub normal: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            day: "textures/planet_day.jpg".to_string(),
            night: "textures/planet_night.jpg".to_string(),
            clouds: "textures/planet_clouds.png".to_string(),
            normal: "textures/planet_normal.jpg".to_string(),
        }
    }
}

impl AssetPaths {
    pub fn path(&self, slot: AssetSlot) -> &str {
        match slot {
            AssetSlot::Day => &self.day,
            AssetSlot::Night => &self.night,
            AssetSlot::Clouds => &self.clouds,
            AssetSlot::Normal => &self.normal,
        }
    }
}

/// Every tunable of a visual session. Missing JSON fields keep defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    pub smoothing_factor: f64,
    pub max_frame_dt_s: f64,
    pub pointer_yaw_rad: f64,
    pub pointer_pitch_rad: f64,
    pub max_pixel_ratio: f64,
    pub anisotropy: u16,
    /// Try to replace procedural planet textures with image assets.
    pub load_assets: bool,
    pub assets: AssetPaths,
    pub thresholds: QualityThresholds,
    pub hero: HeroOrbParams,
    pub backdrop: BackdropParams,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.045,
            max_frame_dt_s: 0.05,
            pointer_yaw_rad: 0.35,
            pointer_pitch_rad: 0.18,
            max_pixel_ratio: 2.0,
            anisotropy: 8,
            load_assets: true,
            assets: AssetPaths::default(),
            thresholds: QualityThresholds::default(),
            hero: HeroOrbParams::default(),
            backdrop: BackdropParams::default(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be > 0, got {value}")))
    }
}

fn check_size(field: &'static str, size: [u32; 2]) -> Result<(), ConfigError> {
    if size[0] == 0 || size[1] == 0 {
        return Err(invalid(field, format!("must be non-zero, got {}x{}", size[0], size[1])));
    }
    Ok(())
}

fn check_emitter(emitter: &EmitterParams) -> Result<(), ConfigError> {
    check_positive("emitter.bolt_max_life_s", emitter.bolt_max_life_s)?;
    if !(emitter.bolt_speed.is_finite() && emitter.bolt_speed >= 0.0) {
        return Err(invalid("emitter.bolt_speed", "must be >= 0"));
    }
    if !(emitter.cooldown_min_s >= 0.0 && emitter.cooldown_min_s <= emitter.cooldown_max_s) {
        return Err(invalid(
            "emitter.cooldown_min_s",
            format!(
                "must satisfy 0 <= min <= max, got {}..{}",
                emitter.cooldown_min_s, emitter.cooldown_max_s
            ),
        ));
    }
    if !(emitter.jitter_rad >= 0.0 && emitter.jitter_rad < std::f64::consts::FRAC_PI_2) {
        return Err(invalid("emitter.jitter_rad", "must be in [0, pi/2)"));
    }
    Ok(())
}

fn check_starfield(stars: &StarfieldParams) -> Result<(), ConfigError> {
    if !(stars.inner_radius >= 0.0 && stars.inner_radius <= stars.outer_radius) {
        return Err(invalid("starfield.inner_radius", "must be in [0, outer_radius]"));
    }
    if !(stars.min_size > 0.0 && stars.min_size <= stars.max_size) {
        return Err(invalid("starfield.min_size", "must be in (0, max_size]"));
    }
    Ok(())
}

fn check_bodies(bodies: &[BodyParams]) -> Result<(), ConfigError> {
    for body in bodies {
        if !body.spec.orbit.speed.is_finite() || !body.spec.orbit.radius.is_finite() {
            return Err(invalid("bodies.orbit", "speed and radius must be finite"));
        }
    }
    Ok(())
}

impl VisualConfig {
    /// Parses a (possibly partial) JSON object and validates the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: VisualConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(invalid(
                "smoothing_factor",
                format!("must be in (0, 1], got {}", self.smoothing_factor),
            ));
        }
        check_positive("max_frame_dt_s", self.max_frame_dt_s)?;
        check_positive("max_pixel_ratio", self.max_pixel_ratio)?;
        check_size("hero.texture_size", self.hero.texture_size)?;
        check_size("backdrop.texture_size", self.backdrop.texture_size)?;
        check_positive("hero.planet_radius", self.hero.planet_radius)?;
        check_positive("backdrop.nebula_radius", self.backdrop.nebula_radius)?;
        check_emitter(&self.hero.emitter)?;
        check_emitter(&self.backdrop.emitter)?;
        check_starfield(&self.hero.starfield)?;
        check_starfield(&self.backdrop.starfield)?;
        check_bodies(&self.hero.bodies)?;
        check_bodies(&self.backdrop.bodies)?;
        Ok(())
    }

    pub fn pointer(&self) -> PointerParams {
        PointerParams {
            smoothing: self.smoothing_factor,
            max_yaw: self.pointer_yaw_rad,
            max_pitch: self.pointer_pitch_rad,
        }
    }

    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            anisotropy: self.anisotropy.max(1),
            ..SamplingParams::default()
        }
    }
}
