use foundation::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tolerance on the expiry check so accumulated `dt` rounding cannot keep an
/// effect alive for one extra frame.
const EXPIRY_EPSILON: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterParams {
    pub cooldown_min_s: f64,
    pub cooldown_max_s: f64,
    pub bolt_speed: f64,
    pub bolt_max_life_s: f64,
    /// Maximum random deviation of the aim, radians per axis.
    pub jitter_rad: f64,
}

impl Default for EmitterParams {
    fn default() -> Self {
        Self {
            cooldown_min_s: 1.5,
            cooldown_max_s: 4.0,
            bolt_speed: 14.0,
            bolt_max_life_s: 2.1,
            jitter_rad: 0.06,
        }
    }
}

impl EmitterParams {
    pub fn sample_cooldown<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let lo = self.cooldown_min_s.min(self.cooldown_max_s);
        let hi = self.cooldown_min_s.max(self.cooldown_max_s);
        if hi <= lo {
            lo
        } else {
            rng.gen_range(lo..hi)
        }
    }

    /// Unit direction from `from` to `to` perturbed by up to `jitter_rad`
    /// around the two axes perpendicular to it.
    pub fn aim<R: Rng + ?Sized>(&self, from: Vec3, to: Vec3, rng: &mut R) -> Vec3 {
        let dir = (to - from).normalize();
        if dir == Vec3::ZERO || self.jitter_rad <= 0.0 {
            return dir;
        }
        let helper = if dir.y.abs() < 0.99 { Vec3::Y } else { Vec3::new(1.0, 0.0, 0.0) };
        let u = dir.cross(helper).normalize();
        let v = dir.cross(u).normalize();
        let j = self.jitter_rad;
        let a = rng.gen_range(-j..=j);
        let b = rng.gen_range(-j..=j);
        (dir + u * a.tan() + v * b.tan()).normalize()
    }
}

/// Cooldown state for one emitting body.
#[derive(Debug, Clone)]
pub struct Emitter {
    pub cooldown_s: f64,
}

impl Emitter {
    pub fn new<R: Rng + ?Sized>(params: &EmitterParams, rng: &mut R) -> Self {
        Self {
            cooldown_s: params.sample_cooldown(rng),
        }
    }

    /// Counts down by `dt_s`; true when the emitter fires this frame.
    pub fn tick(&mut self, dt_s: f64) -> bool {
        self.cooldown_s -= dt_s;
        self.cooldown_s <= 0.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct TransientEffect {
    pub id: EffectId,
    /// Index of the body that emitted it.
    pub owner: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    pub life_s: f64,
    pub max_life_s: f64,
    pub opacity: f64,
}

impl TransientEffect {
    pub fn is_expired(&self) -> bool {
        self.life_s >= self.max_life_s - EXPIRY_EPSILON
    }
}

/// Live projectiles. Every spawned id is reported back exactly once by
/// [`EffectPool::update`] (or [`EffectPool::drain`]).
#[derive(Debug, Default)]
pub struct EffectPool {
    active: Vec<TransientEffect>,
    next_id: u64,
}

impl EffectPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, owner: usize, origin: Vec3, velocity: Vec3, max_life_s: f64) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.active.push(TransientEffect {
            id,
            owner,
            position: origin,
            velocity,
            life_s: 0.0,
            max_life_s,
            opacity: 1.0,
        });
        id
    }

    /// Advances all effects by `dt_s` and removes the ones whose life ran
    /// out. Returns the removed ids in spawn order.
    pub fn update(&mut self, dt_s: f64) -> Vec<EffectId> {
        let mut expired = Vec::new();
        self.active.retain_mut(|e| {
            e.life_s += dt_s;
            e.position += e.velocity * dt_s;
            if e.is_expired() {
                e.opacity = 0.0;
                expired.push(e.id);
                false
            } else {
                e.opacity = if e.max_life_s > 0.0 {
                    (1.0 - e.life_s / e.max_life_s).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                true
            }
        });
        expired
    }

    /// Removes everything without advancing time.
    pub fn drain(&mut self) -> Vec<EffectId> {
        self.active.drain(..).map(|e| e.id).collect()
    }

    pub fn active(&self) -> &[TransientEffect] {
        &self.active
    }

    pub fn get(&self, id: EffectId) -> Option<&TransientEffect> {
        self.active.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::approx_eq;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn expires_after_max_life_at_sixty_hz() {
        let mut pool = EffectPool::new();
        let id = pool.spawn(0, Vec3::ZERO, Vec3::new(14.0, 0.0, 0.0), 2.1);
        let dt = 1.0 / 60.0;
        let mut frames = 0;
        loop {
            frames += 1;
            let expired = pool.update(dt);
            if !expired.is_empty() {
                assert_eq!(expired, vec![id]);
                break;
            }
            assert!(frames < 1000);
        }
        assert_eq!(frames, 126);
        assert!(pool.is_empty());
    }

    #[test]
    fn opacity_fades_linearly() {
        let mut pool = EffectPool::new();
        let id = pool.spawn(0, Vec3::ZERO, Vec3::ZERO, 2.0);
        pool.update(0.5);
        assert!((pool.get(id).unwrap().opacity - 0.75).abs() < 1e-12);
        pool.update(1.0);
        assert!((pool.get(id).unwrap().opacity - 0.25).abs() < 1e-12);
    }

    #[test]
    fn moves_along_velocity() {
        let mut pool = EffectPool::new();
        let id = pool.spawn(3, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), 5.0);
        pool.update(0.25);
        let e = pool.get(id).unwrap();
        assert_eq!(e.owner, 3);
        assert!(approx_eq(e.position, Vec3::new(1.0, 0.5, 0.0), 1e-12));
    }

    #[test]
    fn drain_reports_every_live_id() {
        let mut pool = EffectPool::new();
        let a = pool.spawn(0, Vec3::ZERO, Vec3::ZERO, 1.0);
        let b = pool.spawn(1, Vec3::ZERO, Vec3::ZERO, 1.0);
        assert_eq!(pool.drain(), vec![a, b]);
        assert!(pool.is_empty());
    }

    #[test]
    fn cooldown_stays_in_range() {
        let params = EmitterParams::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let c = params.sample_cooldown(&mut rng);
            assert!((1.5..4.0).contains(&c));
        }
    }

    #[test]
    fn aim_stays_within_jitter_cone() {
        let params = EmitterParams::default();
        let mut rng = StdRng::seed_from_u64(5);
        let from = Vec3::new(4.0, 1.0, -2.0);
        let to = Vec3::new(-3.0, 0.5, 6.0);
        let exact = (to - from).normalize();
        // Two independent offsets of at most `j` each.
        let max_angle = (2.0f64).sqrt() * params.jitter_rad.tan();
        for _ in 0..200 {
            let dir = params.aim(from, to, &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-9);
            let angle = dir.dot(exact).clamp(-1.0, 1.0).acos();
            assert!(angle <= max_angle + 1e-9, "{angle}");
        }
    }
}
