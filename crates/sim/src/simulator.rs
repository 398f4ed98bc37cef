use foundation::math::{Vec2, Vec3};
use rand::Rng;
use runtime::Frame;
use serde::{Deserialize, Serialize};

use crate::effects::{EffectId, EffectPool, Emitter, EmitterParams, TransientEffect};
use crate::orbit::{Facing, OrbitParams, facing_rotation, orbit_position, orbit_velocity};
use crate::pointer::{PointerEase, PointerParams};
use crate::spin::LayerSpin;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySpec {
    pub orbit: OrbitParams,
    pub facing: Facing,
    /// Whether the body fires transient effects at its siblings.
    pub emits: bool,
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            orbit: OrbitParams::default(),
            facing: Facing::TowardOrigin,
            emits: false,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler XYZ.
    pub rotation: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedEffect {
    pub id: EffectId,
    pub owner: usize,
    pub target: usize,
    pub origin: Vec3,
    pub velocity: Vec3,
}

/// What changed structurally during one [`Simulator::step`]. Continuous
/// state (positions, rotations, opacities) is read back through accessors.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepReport {
    pub spawned: Vec<SpawnedEffect>,
    pub expired: Vec<EffectId>,
}

#[derive(Debug)]
pub struct Simulator {
    specs: Vec<BodySpec>,
    bodies: Vec<BodyState>,
    emitters: Vec<Option<Emitter>>,
    spins: Vec<LayerSpin>,
    spin_rotations: Vec<Vec3>,
    pointer: PointerEase,
    emitter_params: EmitterParams,
    effects: EffectPool,
    elapsed_s: f64,
}

impl Simulator {
    pub fn new<R: Rng + ?Sized>(
        specs: Vec<BodySpec>,
        spins: Vec<LayerSpin>,
        pointer: PointerParams,
        emitter_params: EmitterParams,
        rng: &mut R,
    ) -> Self {
        let emitters = specs
            .iter()
            .map(|s| s.emits.then(|| Emitter::new(&emitter_params, rng)))
            .collect();
        let mut sim = Self {
            bodies: vec![BodyState::default(); specs.len()],
            specs,
            emitters,
            spin_rotations: spins.iter().map(|s| s.rotation_at(0.0)).collect(),
            spins,
            pointer: PointerEase::new(pointer),
            emitter_params,
            effects: EffectPool::new(),
            elapsed_s: 0.0,
        };
        sim.update_bodies(0.0);
        sim
    }

    /// Normalized pointer offset, see [`crate::normalize_pointer`].
    pub fn set_pointer(&mut self, normalized: Vec2) {
        self.pointer.set_target(normalized);
    }

    /// Advances one frame.
    ///
    /// Order: pointer ease, body positions, layer spins, existing effects,
    /// then emitters. Spawned effects therefore aim at this frame's body
    /// positions and are not advanced until the next frame.
    pub fn step<R: Rng + ?Sized>(&mut self, frame: &Frame, rng: &mut R) -> StepReport {
        let elapsed = frame.time.seconds();
        let dt = frame.dt_s.max(0.0);
        self.elapsed_s = elapsed;

        self.pointer.step();
        self.update_bodies(elapsed);
        for (rot, spin) in self.spin_rotations.iter_mut().zip(&self.spins) {
            *rot = spin.rotation_at(elapsed);
        }

        let expired = self.effects.update(dt);
        let spawned = self.tick_emitters(dt, rng);
        StepReport { spawned, expired }
    }

    fn update_bodies(&mut self, elapsed: f64) {
        for (state, spec) in self.bodies.iter_mut().zip(&self.specs) {
            let position = orbit_position(&spec.orbit, elapsed);
            let velocity = orbit_velocity(&spec.orbit, elapsed);
            *state = BodyState {
                position,
                velocity,
                rotation: facing_rotation(spec.facing, position, velocity),
            };
        }
    }

    fn tick_emitters<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> Vec<SpawnedEffect> {
        let mut spawned = Vec::new();
        let count = self.bodies.len();
        for owner in 0..count {
            let Some(emitter) = self.emitters[owner].as_mut() else {
                continue;
            };
            if !emitter.tick(dt) {
                continue;
            }
            emitter.cooldown_s = self.emitter_params.sample_cooldown(rng);
            if count < 2 {
                continue;
            }
            // Uniform over the other bodies.
            let mut target = rng.gen_range(0..count - 1);
            if target >= owner {
                target += 1;
            }
            let origin = self.bodies[owner].position;
            let dir = self
                .emitter_params
                .aim(origin, self.bodies[target].position, rng);
            if dir == Vec3::ZERO {
                continue;
            }
            let velocity = dir * self.emitter_params.bolt_speed;
            let id = self
                .effects
                .spawn(owner, origin, velocity, self.emitter_params.bolt_max_life_s);
            spawned.push(SpawnedEffect {
                id,
                owner,
                target,
                origin,
                velocity,
            });
        }
        spawned
    }

    /// Current (yaw, pitch) of the root group.
    pub fn root_tilt(&self) -> Vec2 {
        self.pointer.current()
    }

    /// Root group rotation as Euler XYZ.
    pub fn root_rotation(&self) -> Vec3 {
        let tilt = self.pointer.current();
        Vec3::new(tilt.y, tilt.x, 0.0)
    }

    pub fn bodies(&self) -> &[BodyState] {
        &self.bodies
    }

    pub fn spin_rotations(&self) -> &[Vec3] {
        &self.spin_rotations
    }

    pub fn effects(&self) -> &[TransientEffect] {
        self.effects.active()
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    /// Drops every live effect; used at teardown.
    pub fn clear_effects(&mut self) -> Vec<EffectId> {
        self.effects.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::approx_eq;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn two_ships() -> Vec<BodySpec> {
        vec![
            BodySpec {
                orbit: OrbitParams {
                    radius: 6.0,
                    speed: 0.3,
                    ..OrbitParams::default()
                },
                facing: Facing::AlongVelocity,
                emits: true,
            },
            BodySpec {
                orbit: OrbitParams {
                    radius: 9.0,
                    speed: -0.2,
                    phase: 2.0,
                    vertical_harmonic: 2,
                    ..OrbitParams::default()
                },
                facing: Facing::AlongVelocity,
                emits: false,
            },
        ]
    }

    fn quick_fire() -> EmitterParams {
        EmitterParams {
            cooldown_min_s: 0.1,
            cooldown_max_s: 0.2,
            jitter_rad: 0.0,
            ..EmitterParams::default()
        }
    }

    #[test]
    fn bodies_follow_closed_form_every_frame() {
        let mut rng = StdRng::seed_from_u64(1);
        let specs = two_ships();
        let mut sim = Simulator::new(
            specs.clone(),
            vec![],
            PointerParams::default(),
            EmitterParams::default(),
            &mut rng,
        );
        let mut frame = Frame::new(0, 1.0 / 60.0);
        for _ in 0..90 {
            frame = frame.next();
            sim.step(&frame, &mut rng);
        }
        let t = frame.time.seconds();
        for (state, spec) in sim.bodies().iter().zip(&specs) {
            assert!(approx_eq(state.position, orbit_position(&spec.orbit, t), 1e-12));
        }
    }

    #[test]
    fn spawned_effect_aims_at_this_frame_target() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut sim = Simulator::new(two_ships(), vec![], PointerParams::default(), quick_fire(), &mut rng);
        let mut frame = Frame::new(0, 1.0 / 60.0);
        let spawn = loop {
            frame = frame.next();
            let report = sim.step(&frame, &mut rng);
            if let Some(s) = report.spawned.into_iter().next() {
                break s;
            }
            assert!(frame.index < 120);
        };
        assert_eq!((spawn.owner, spawn.target), (0, 1));
        let bodies = sim.bodies();
        assert!(approx_eq(spawn.origin, bodies[0].position, 1e-12));
        let expected = (bodies[1].position - bodies[0].position).normalize() * 14.0;
        assert!(approx_eq(spawn.velocity, expected, 1e-9));
        // Not advanced on its spawn frame.
        let live = &sim.effects()[0];
        assert_eq!(live.life_s, 0.0);
        assert_eq!(live.opacity, 1.0);
    }

    #[test]
    fn lone_emitter_never_spawns() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut specs = two_ships();
        specs.truncate(1);
        let mut sim = Simulator::new(specs, vec![], PointerParams::default(), quick_fire(), &mut rng);
        let mut frame = Frame::new(0, 1.0 / 60.0);
        for _ in 0..120 {
            frame = frame.next();
            assert!(sim.step(&frame, &mut rng).spawned.is_empty());
        }
    }

    #[test]
    fn every_spawn_expires_exactly_once() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut specs = two_ships();
        specs[1].emits = true;
        let mut sim = Simulator::new(specs, vec![], PointerParams::default(), quick_fire(), &mut rng);
        let mut spawned = Vec::new();
        let mut expired = Vec::new();
        let mut frame = Frame::new(0, 1.0 / 30.0);
        for _ in 0..300 {
            frame = frame.next();
            let report = sim.step(&frame, &mut rng);
            spawned.extend(report.spawned.into_iter().map(|s| s.id));
            expired.extend(report.expired);
        }
        expired.extend(sim.clear_effects());
        spawned.sort();
        expired.sort();
        assert!(!spawned.is_empty());
        assert_eq!(spawned, expired);
    }

    #[test]
    fn root_eases_toward_pointer_and_layers_spin() {
        let mut rng = StdRng::seed_from_u64(5);
        let spins = vec![LayerSpin::about_y(0.07), LayerSpin::about_y(0.02)];
        let mut sim = Simulator::new(vec![], spins, PointerParams::default(), EmitterParams::default(), &mut rng);
        sim.set_pointer(Vec2::new(1.0, -1.0));
        let frame = Frame::new(60, 1.0 / 60.0);
        sim.step(&frame, &mut rng);
        let rot = sim.root_rotation();
        assert!((rot.y - 0.35 * 0.045).abs() < 1e-12);
        assert!((rot.x + 0.18 * 0.045).abs() < 1e-12);
        let layers = sim.spin_rotations();
        assert!((layers[0].y - 0.07).abs() < 1e-12);
        assert!((layers[1].y - 0.02).abs() < 1e-12);
    }
}
