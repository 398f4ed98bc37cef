use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use foundation::ids::{NodeId, ResourceId};
use foundation::math::Vec2;
use foundation::time::Time;
use gpu::{Camera3D, GpuBackend, Renderer, ResourceCounts, ResourceManager};
use quality::{StaticFallback, Variant};
use rand::SeedableRng;
use rand::rngs::StdRng;
use runtime::{FrameClock, Lifecycle, SessionState};
use scene::{Allocator, BuiltScene, HeroTextures, Node, Transform, build_hero_orb, build_space_backdrop};
use sim::{BodySpec, EffectId, Simulator, look_rotation};
use texture::{
    AssetError, AssetSlot, SoftwareSurfaces, SurfaceProvider, TextureKind, TextureSynthesizer,
    decode_asset,
};
use tracing::{debug, info, warn};

use crate::config::VisualConfig;
use crate::error::SessionError;
use crate::host::{FrameHandle, ListenerId, ListenerKind, SessionHost, Viewport};
use crate::upgrade::{Liveness, UpgradeOutcome, UpgradeTicket};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Draw order of transient effects relative to the prefab layers.
const EFFECT_RENDER_ORDER: i32 = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub state: SessionState,
    pub frames: u64,
    pub active_effects: usize,
    pub live: ResourceCounts,
    pub allocated: ResourceCounts,
    pub released: ResourceCounts,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    pub released: ResourceCounts,
    pub cancelled_frame: bool,
    pub removed_listeners: usize,
    pub removed_nodes: usize,
    pub surface_detached: bool,
}

#[derive(Debug, Copy, Clone)]
struct LiveEffect {
    node: NodeId,
    material: ResourceId,
}

/// Applies the CSS placeholder when the gate denies the full simulation.
pub fn mount_fallback<H: SessionHost>(host: &mut H, variant: Variant) -> StaticFallback {
    let fallback = StaticFallback::for_variant(variant);
    host.apply_fallback(&fallback);
    debug!(variant = variant.as_str(), "static fallback mounted");
    fallback
}

/// One mounted decorative visual and everything it allocated.
///
/// All state lives here and is touched only from host callbacks on one
/// thread. Dropping a session tears it down.
pub struct VisualSession<B: GpuBackend, H: SessionHost> {
    id: u64,
    variant: Variant,
    config: VisualConfig,
    lifecycle: Lifecycle,
    host: H,
    resources: ResourceManager<B>,
    scene: Option<BuiltScene>,
    sim: Option<Simulator>,
    clock: FrameClock,
    camera: Option<Camera3D>,
    viewport: Viewport,
    pending_frame: Option<FrameHandle>,
    listeners: Vec<ListenerId>,
    liveness: Liveness,
    effects: BTreeMap<EffectId, LiveEffect>,
    settled_assets: BTreeSet<AssetSlot>,
    rng: StdRng,
}

impl<B: GpuBackend, H: SessionHost> VisualSession<B, H> {
    /// Full mount with software texture surfaces and an entropy-seeded rng.
    pub fn mount(variant: Variant, config: VisualConfig, backend: B, host: H) -> Result<Self, SessionError> {
        Self::mount_with(
            variant,
            config,
            backend,
            host,
            SoftwareSurfaces,
            StdRng::from_entropy(),
        )
    }

    /// Synchronous construction: texture synthesis, scene build, listener
    /// registration, first frame request. Any failure tears down what was
    /// already allocated before returning.
    pub fn mount_with<P: SurfaceProvider>(
        variant: Variant,
        config: VisualConfig,
        backend: B,
        host: H,
        surfaces: P,
        rng: StdRng,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let viewport = host.viewport();
        let mut session = Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            variant,
            clock: FrameClock::new(config.max_frame_dt_s),
            config,
            lifecycle: Lifecycle::new(),
            host,
            resources: ResourceManager::new(backend),
            scene: None,
            sim: None,
            camera: None,
            viewport,
            pending_frame: None,
            listeners: Vec::new(),
            liveness: Liveness::new(),
            effects: BTreeMap::new(),
            settled_assets: BTreeSet::new(),
            rng,
        };
        if let Err(err) = session.initialize(surfaces) {
            warn!(session = session.id, %err, "mount failed");
            session.teardown();
            return Err(err);
        }
        Ok(session)
    }

    fn initialize<P: SurfaceProvider>(&mut self, surfaces: P) -> Result<(), SessionError> {
        self.lifecycle.advance(SessionState::Initializing)?;

        let mut synth = TextureSynthesizer::new(surfaces).with_sampling(self.config.sampling());
        let built = match self.variant {
            Variant::HeroOrb => {
                let [w, h] = self.config.hero.texture_size;
                let textures = HeroTextures {
                    day: synth.synthesize(TextureKind::PlanetDay, w, h, &mut self.rng),
                    night: synth.synthesize(TextureKind::NightLights, w, h, &mut self.rng),
                    clouds: synth.synthesize(TextureKind::Clouds, w, h, &mut self.rng),
                };
                build_hero_orb(&self.config.hero, textures, &mut self.resources, &mut self.rng)
            }
            Variant::SpaceBackdrop => {
                let [w, h] = self.config.backdrop.texture_size;
                let galaxy = synth.synthesize(TextureKind::Galaxy, w, h, &mut self.rng);
                build_space_backdrop(&self.config.backdrop, galaxy, &mut self.resources, &mut self.rng)
            }
        };

        let specs: Vec<BodySpec> = built.bodies.iter().map(|b| b.spec).collect();
        let spins = built.spins.iter().map(|s| s.spin).collect();
        self.sim = Some(Simulator::new(
            specs,
            spins,
            self.config.pointer(),
            built.emitter,
            &mut self.rng,
        ));
        self.camera = Some(Camera3D::from_rig(&built.camera));
        self.scene = Some(built);

        for kind in [ListenerKind::Resize, ListenerKind::PointerMove] {
            let id = self.host.add_listener(kind);
            self.listeners.push(id);
        }
        self.on_resize();
        self.pending_frame = Some(self.host.request_frame());
        self.lifecycle.advance(SessionState::Running)?;

        let counts = self.resources.counts();
        info!(
            session = self.id,
            variant = self.variant.as_str(),
            geometries = counts.geometries,
            materials = counts.materials,
            textures = counts.textures,
            "visual session running"
        );
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn resources(&self) -> &ResourceManager<B> {
        &self.resources
    }

    pub fn scene(&self) -> Option<&BuiltScene> {
        self.scene.as_ref()
    }

    pub fn simulator(&self) -> Option<&Simulator> {
        self.sim.as_ref()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            state: self.state(),
            frames: self.clock.frames_ticked(),
            active_effects: self.effects.len(),
            live: self.resources.counts(),
            allocated: self.resources.allocated(),
            released: self.resources.released(),
        }
    }

    /// Texture currently bound to the material slot an asset would replace.
    pub fn upgrade_slot_texture(&self, asset: AssetSlot) -> Option<ResourceId> {
        let target = self.scene.as_ref()?.upgrade_target(asset)?;
        self.resources.material(target.material)?.slot(target.slot)
    }

    /// Animation-frame callback. `now` is the host timestamp. Reschedules
    /// itself first; does nothing once teardown has started.
    pub fn on_frame(&mut self, now: Time) -> Result<(), SessionError> {
        if self.state() != SessionState::Running {
            return Ok(());
        }
        self.pending_frame = Some(self.host.request_frame());

        let frame = self.clock.tick(now);
        let (Some(scene), Some(sim)) = (self.scene.as_mut(), self.sim.as_mut()) else {
            return Ok(());
        };
        let report = sim.step(&frame, &mut self.rng);

        let graph = &mut scene.graph;
        graph.set_rotation(scene.root, sim.root_rotation());
        for (binding, rotation) in scene.spins.iter().zip(sim.spin_rotations()) {
            graph.set_rotation(binding.node, *rotation);
        }
        for (binding, body) in scene.bodies.iter().zip(sim.bodies()) {
            graph.set_position(binding.node, body.position);
            graph.set_rotation(binding.node, body.rotation);
        }

        for id in &report.expired {
            if let Some(live) = self.effects.remove(id) {
                graph.remove_subtree(live.node);
                self.resources.release(live.material);
            }
        }

        if let Some(bolt) = scene.bolt {
            for spawn in &report.spawned {
                let material = self.resources.allocate_material(&bolt.material());
                let node = Node::mesh("bolt", bolt.geometry, material)
                    .with_transform(Transform {
                        position: spawn.origin,
                        rotation: look_rotation(spawn.velocity),
                        ..Transform::identity()
                    })
                    .with_render_order(EFFECT_RENDER_ORDER);
                match graph.add_child(scene.root, node) {
                    Some(node) => {
                        self.effects.insert(spawn.id, LiveEffect { node, material });
                    }
                    None => {
                        self.resources.release(material);
                    }
                }
            }
        }

        for effect in sim.effects() {
            if let Some(live) = self.effects.get(&effect.id) {
                graph.set_position(live.node, effect.position);
                let opacity = effect.opacity as f32;
                if let Err(err) = self
                    .resources
                    .update_material(live.material, |m| m.opacity = opacity)
                {
                    warn!(
                        session = self.id,
                        effect = effect.id.0,
                        %err,
                        "effect fade update failed"
                    );
                }
            }
        }

        if let Some(camera) = &self.camera {
            let out = Renderer::collect(graph, &self.resources, camera, self.viewport.aspect());
            if let Err(err) = self.resources.render(&out) {
                warn!(session = self.id, %err, "frame render failed");
            }
        }
        Ok(())
    }

    /// `normalized` is the window pointer position mapped to `[-1, 1]`.
    pub fn on_pointer_move(&mut self, normalized: Vec2) {
        if self.state() != SessionState::Running {
            return;
        }
        if let Some(sim) = self.sim.as_mut() {
            sim.set_pointer(normalized);
        }
    }

    /// Re-reads the container size and resizes the surface.
    pub fn on_resize(&mut self) {
        if !self.state().is_live() {
            return;
        }
        self.viewport = self.host.viewport();
        let (w, h) = self.viewport.physical_size(self.config.max_pixel_ratio);
        self.resources.resize(w, h);
    }

    /// Tickets for every asset that may still replace a procedural texture.
    pub fn begin_texture_upgrades(&mut self) -> Vec<UpgradeTicket> {
        AssetSlot::ALL
            .into_iter()
            .filter_map(|asset| self.begin_texture_upgrade(asset))
            .collect()
    }

    pub fn begin_texture_upgrade(&mut self, asset: AssetSlot) -> Option<UpgradeTicket> {
        if !self.config.load_assets
            || self.state() != SessionState::Running
            || self.settled_assets.contains(&asset)
        {
            return None;
        }
        let target = self.scene.as_ref()?.upgrade_target(asset)?;
        Some(UpgradeTicket {
            asset,
            path: self.config.assets.path(asset).to_string(),
            material: target.material,
            slot: target.slot,
            liveness: self.liveness.clone(),
        })
    }

    /// Applies the result of an asset fetch, or discards it when the
    /// session is gone. Every check happens before any GPU call.
    pub fn complete_texture_upgrade(
        &mut self,
        ticket: UpgradeTicket,
        fetched: Result<Vec<u8>, AssetError>,
    ) -> UpgradeOutcome {
        if !ticket.liveness.is_live()
            || !ticket.liveness.same_as(&self.liveness)
            || !self.state().is_live()
            || self.settled_assets.contains(&ticket.asset)
            || self.resources.material(ticket.material).is_none()
        {
            debug!(session = self.id, path = %ticket.path, "stale texture upgrade discarded");
            return UpgradeOutcome::Discarded;
        }
        self.settled_assets.insert(ticket.asset);

        let texture = match fetched.and_then(|bytes| {
            decode_asset(&ticket.path, &bytes, ticket.asset, self.config.sampling())
        }) {
            Ok(texture) => texture,
            Err(err) => {
                debug!(session = self.id, path = %ticket.path, %err, "asset unavailable; keeping procedural texture");
                return UpgradeOutcome::KeptProcedural(err);
            }
        };

        let id = self.resources.allocate_texture(&texture);
        match self.resources.swap_material_map(ticket.material, ticket.slot, id) {
            Ok(previous) => {
                if let Some(previous) = previous {
                    self.resources.release(previous);
                }
                info!(session = self.id, path = %ticket.path, texture = %id, "texture upgraded");
                UpgradeOutcome::Applied { texture: id }
            }
            Err(err) => {
                warn!(session = self.id, path = %ticket.path, %err, "texture swap failed");
                self.resources.release(id);
                UpgradeOutcome::Discarded
            }
        }
    }

    /// Releases everything this session created. Safe to call in any state;
    /// only the first call does work.
    pub fn teardown(&mut self) -> Option<TeardownReport> {
        let state = self.state();
        if !state.is_live() {
            return None;
        }
        // Pending texture completions check this before touching anything.
        self.liveness.revoke();
        if let Err(err) = self.lifecycle.advance(SessionState::Disposing) {
            warn!(session = self.id, %err, "unexpected lifecycle state at teardown");
        }

        let cancelled_frame = match self.pending_frame.take() {
            Some(handle) => {
                self.host.cancel_frame(handle);
                true
            }
            None => false,
        };

        let removed_listeners = self.listeners.len();
        for id in self.listeners.drain(..) {
            self.host.remove_listener(id);
        }

        if let Some(sim) = self.sim.as_mut() {
            sim.clear_effects();
        }
        self.effects.clear();
        let removed_nodes = self.scene.as_mut().map(|s| s.graph.clear()).unwrap_or(0);

        let released = self.resources.release_all();
        self.resources.release_context();
        let surface_detached = self.host.detach_surface();

        if let Err(err) = self.lifecycle.advance(SessionState::Disposed) {
            warn!(session = self.id, %err, "unexpected lifecycle state at teardown");
        }
        info!(
            session = self.id,
            from = state.as_str(),
            released = released.total(),
            "visual session disposed"
        );
        Some(TeardownReport {
            released,
            cancelled_frame,
            removed_listeners,
            removed_nodes,
            surface_detached,
        })
    }
}

impl<B: GpuBackend, H: SessionHost> Drop for VisualSession<B, H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
