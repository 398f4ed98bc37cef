use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// Fixed per-body trajectory constants.
///
/// `x = cos(t*speed + phase) * radius`
/// `z = sin(t*speed + phase) * radius`
/// `y = sin(t*speed*k + phase) * vertical_radius + base_height`
///
/// The vertical harmonic `k` is an integer so the whole path repeats every
/// `2π / speed`. The path is then tilted about the X axis by `inclination`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitParams {
    pub radius: f64,
    pub speed: f64,
    pub phase: f64,
    pub vertical_radius: f64,
    pub vertical_harmonic: u32,
    pub base_height: f64,
    pub inclination: f64,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            radius: 2.6,
            speed: 0.25,
            phase: 0.0,
            vertical_radius: 0.3,
            vertical_harmonic: 1,
            base_height: 0.0,
            inclination: 0.0,
        }
    }
}

impl OrbitParams {
    pub fn period(&self) -> Option<f64> {
        if self.speed == 0.0 {
            None
        } else {
            Some(std::f64::consts::TAU / self.speed.abs())
        }
    }
}

fn tilt(p: Vec3, inclination: f64) -> Vec3 {
    if inclination == 0.0 {
        return p;
    }
    let (s, c) = inclination.sin_cos();
    Vec3::new(p.x, p.y * c - p.z * s, p.y * s + p.z * c)
}

pub fn orbit_position(p: &OrbitParams, elapsed: f64) -> Vec3 {
    let a = elapsed * p.speed + p.phase;
    let k = p.vertical_harmonic as f64;
    let local = Vec3::new(
        a.cos() * p.radius,
        (elapsed * p.speed * k + p.phase).sin() * p.vertical_radius + p.base_height,
        a.sin() * p.radius,
    );
    tilt(local, p.inclination)
}

/// Analytic time derivative of [`orbit_position`].
pub fn orbit_velocity(p: &OrbitParams, elapsed: f64) -> Vec3 {
    let a = elapsed * p.speed + p.phase;
    let k = p.vertical_harmonic as f64;
    let local = Vec3::new(
        -a.sin() * p.radius * p.speed,
        (elapsed * p.speed * k + p.phase).cos() * p.vertical_radius * p.speed * k,
        a.cos() * p.radius * p.speed,
    );
    tilt(local, p.inclination)
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Forward axis points at the scene origin.
    #[default]
    TowardOrigin,
    /// Forward axis follows the instantaneous velocity.
    AlongVelocity,
}

/// Euler XYZ angles that turn local +Z toward `direction`.
///
/// Returns zero rotation for a zero direction.
pub fn look_rotation(direction: Vec3) -> Vec3 {
    let d = direction.normalize();
    if d == Vec3::ZERO {
        return Vec3::ZERO;
    }
    Vec3::new((-d.y).atan2(d.z), d.x.clamp(-1.0, 1.0).asin(), 0.0)
}

pub fn facing_rotation(facing: Facing, position: Vec3, velocity: Vec3) -> Vec3 {
    match facing {
        Facing::TowardOrigin => look_rotation(-position),
        Facing::AlongVelocity => look_rotation(velocity),
    }
}
