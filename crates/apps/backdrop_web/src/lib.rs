use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use foundation::time::Time;
use quality::{
    AmbientEffects, EnvironmentChange, MountDecision, PlatformProbe, QualityGate, ScrollContext,
    ScrollTarget, Variant,
};
use session::{UpgradeTicket, VisualConfig, VisualSession, mount_fallback};
use sim::normalize_pointer;
use texture::AssetError;
use tracing::{debug, info, warn};

mod dom;
mod platform;
mod wgpu;
use dom::{DomHost, HostCallbacks};
use platform::{WebProbe, WebScroll};
use wgpu::WgpuBackend;

type Session = VisualSession<WgpuBackend, DomHost>;

enum View {
    /// Waiting for the async GPU adapter; holds the canvas already placed.
    Pending(web_sys::HtmlCanvasElement),
    Full(Session),
    Fallback(DomHost),
}

struct Mount {
    generation: u64,
    container_id: String,
    variant: Variant,
    config: VisualConfig,
    view: View,
}

thread_local! {
    static GATE: RefCell<Option<QualityGate<WebProbe>>> = const { RefCell::new(None) };
    static SCROLL: RefCell<ScrollContext> = RefCell::new(ScrollContext::noop());
    static MOUNT: RefCell<Option<Mount>> = const { RefCell::new(None) };
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn with_gate<T>(f: impl FnOnce(&mut QualityGate<WebProbe>) -> T) -> T {
    GATE.with(|gate| {
        let mut gate = gate.borrow_mut();
        f(gate.get_or_insert_with(|| QualityGate::new(WebProbe::new())))
    })
}

fn with_session(f: impl FnOnce(&mut Session)) {
    MOUNT.with(|mount| {
        if let Some(Mount {
            view: View::Full(session),
            ..
        }) = mount.borrow_mut().as_mut()
        {
            f(session);
        }
    });
}

fn install_scroll(effects: AmbientEffects) {
    SCROLL.with(|scroll| {
        let mut scroll = scroll.borrow_mut();
        if effects.smooth_scroll && !scroll.is_active() {
            *scroll = ScrollContext::new(Rc::new(WebScroll::new()));
        } else if !effects.smooth_scroll && scroll.is_active() {
            scroll.stop();
            *scroll = ScrollContext::noop();
        }
    });
}

fn current_ambient_effects() -> AmbientEffects {
    with_gate(|gate| AmbientEffects::from_profile(gate.profile(), &gate.probe().read()))
}

fn on_environment_change(change: EnvironmentChange) {
    let Some(update) = with_gate(|gate| gate.on_change(change)) else {
        return;
    };
    install_scroll(current_ambient_effects());
    if !update.flips_mount() {
        return;
    }
    let current = MOUNT.with(|m| {
        m.borrow()
            .as_ref()
            .map(|m| (m.container_id.clone(), m.variant, m.config.clone()))
    });
    if let Some((container_id, variant, config)) = current {
        info!(change = change.as_str(), "quality decision flipped; remounting");
        if let Err(err) = mount_with_config(&container_id, variant, config) {
            warn!(?err, "remount failed");
        }
    }
}

fn watch_environment(window: &web_sys::Window) {
    let add = |target: &web_sys::EventTarget, event: &str, change: EnvironmentChange| {
        let closure = Closure::<dyn FnMut()>::new(move || on_environment_change(change));
        if target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .is_ok()
        {
            // Page-lifetime listener.
            closure.forget();
        }
    };
    add(window, "resize", EnvironmentChange::ViewportResize);
    add(window, "focus", EnvironmentChange::WindowFocus);
    if let Ok(Some(list)) = window.match_media("(prefers-reduced-motion: reduce)") {
        add(&list, "change", EnvironmentChange::DisplayPreference);
    }
    let connection = js_sys::Reflect::get(&window.navigator(), &JsValue::from_str("connection"))
        .ok()
        .and_then(|c| c.dyn_into::<web_sys::EventTarget>().ok());
    if let Some(connection) = connection {
        add(&connection, "change", EnvironmentChange::NetworkChange);
    }
}

fn host_callbacks(generation: u64) -> HostCallbacks {
    let current = move || GENERATION.with(Cell::get) == generation;
    HostCallbacks {
        frame: Closure::new(move |now_ms: f64| {
            if !current() {
                return;
            }
            with_session(|session| {
                if let Err(err) = session.on_frame(Time::from_millis(now_ms)) {
                    warn!(%err, "frame failed");
                }
            });
        }),
        resize: Closure::new(move || {
            if !current() {
                return;
            }
            MOUNT.with(|m| {
                if let Some(Mount {
                    view: View::Full(session),
                    config,
                    ..
                }) = m.borrow_mut().as_mut()
                {
                    session.host().sync_canvas_size(config.max_pixel_ratio);
                    session.on_resize();
                }
            });
        }),
        pointer: Closure::new(move |event: web_sys::PointerEvent| {
            if !current() {
                return;
            }
            with_session(|session| {
                let window = session.host().window();
                let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
                let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
                let offset = normalize_pointer(
                    event.client_x() as f64,
                    event.client_y() as f64,
                    width,
                    height,
                );
                session.on_pointer_move(offset);
            });
        }),
    }
}

async fn fetch_asset(path: &str) -> Result<Vec<u8>, AssetError> {
    let resp = Request::get(path)
        .send()
        .await
        .map_err(|e| AssetError::Network(e.to_string()))?;
    if resp.status() == 404 {
        return Err(AssetError::NotFound(path.to_string()));
    }
    if !resp.ok() {
        return Err(AssetError::Network(format!("HTTP {}", resp.status())));
    }
    resp.binary()
        .await
        .map_err(|e| AssetError::Network(e.to_string()))
}

fn spawn_upgrade(ticket: UpgradeTicket) {
    spawn_local(async move {
        let fetched = fetch_asset(&ticket.path).await;
        if !ticket.is_live() {
            debug!(path = %ticket.path, "session gone before asset arrived");
            return;
        }
        with_session(|session| {
            session.complete_texture_upgrade(ticket, fetched);
        });
    });
}

fn container_element(container_id: &str) -> Result<(web_sys::Window, web_sys::HtmlElement), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document missing"))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str("container missing"))?
        .dyn_into::<web_sys::HtmlElement>()?;
    Ok((window, container))
}

fn unmount_current() {
    // Dropping a full session runs its teardown.
    let previous = MOUNT.with(|m| m.borrow_mut().take());
    match previous.map(|m| m.view) {
        Some(View::Pending(canvas)) => canvas.remove(),
        Some(View::Fallback(host)) => host.clear_fallback(),
        Some(View::Full(session)) => drop(session),
        None => {}
    }
}

fn mount_with_config(container_id: &str, variant: Variant, config: VisualConfig) -> Result<(), JsValue> {
    unmount_current();
    let generation = GENERATION.with(|g| {
        g.set(g.get() + 1);
        g.get()
    });
    let (window, container) = container_element(container_id)?;
    let decision = with_gate(|gate| MountDecision::for_profile(gate.profile(), variant));

    let view = match decision {
        MountDecision::Fallback(_) => {
            let mut host = DomHost::new(window, container, None, None);
            mount_fallback(&mut host, variant);
            View::Fallback(host)
        }
        MountDecision::Full(_) => {
            let document = window
                .document()
                .ok_or_else(|| JsValue::from_str("document missing"))?;
            let canvas = document
                .create_element("canvas")?
                .dyn_into::<web_sys::HtmlCanvasElement>()?;
            canvas.style().set_property("width", "100%")?;
            canvas.style().set_property("height", "100%")?;
            canvas.style().set_property("display", "block")?;
            container.append_child(&canvas)?;
            let host = DomHost::new(window, container, Some(canvas.clone()), None);
            host.sync_canvas_size(config.max_pixel_ratio);
            spawn_local(start_full(generation, host, canvas.clone()));
            View::Pending(canvas)
        }
    };

    MOUNT.with(|m| {
        *m.borrow_mut() = Some(Mount {
            generation,
            container_id: container_id.to_string(),
            variant,
            config,
            view,
        });
    });
    Ok(())
}

/// Second half of a full mount, after the GPU adapter resolves. A newer
/// mount or an unmount in between makes this a no-op.
async fn start_full(generation: u64, sizing: DomHost, canvas: web_sys::HtmlCanvasElement) {
    let (width, height) = (canvas.width(), canvas.height());
    let backend = WgpuBackend::from_canvas(canvas.clone(), width, height).await;

    MOUNT.with(|m| {
        let mut slot = m.borrow_mut();
        let Some(mount) = slot.as_mut().filter(|m| m.generation == generation) else {
            return;
        };
        let View::Pending(_) = mount.view else {
            return;
        };
        let backend = match backend {
            Ok(backend) => backend,
            Err(err) => {
                web_sys::console::log_1(&JsValue::from_str(&format!("wgpu init error: {err}")));
                canvas.remove();
                let mut host = sizing;
                mount_fallback(&mut host, mount.variant);
                mount.view = View::Fallback(host);
                return;
            }
        };
        let (window, container, _) = sizing.into_parts();
        let host = DomHost::new(window, container, Some(canvas.clone()), Some(host_callbacks(generation)));
        match VisualSession::mount(mount.variant, mount.config.clone(), backend, host) {
            Ok(mut session) => {
                for ticket in session.begin_texture_upgrades() {
                    spawn_upgrade(ticket);
                }
                mount.view = View::Full(session);
            }
            Err(err) => {
                web_sys::console::log_1(&JsValue::from_str(&format!("visual mount error: {err}")));
                if let Ok((window, container)) = container_element(&mount.container_id) {
                    let mut host = DomHost::new(window, container, None, None);
                    mount_fallback(&mut host, mount.variant);
                    mount.view = View::Fallback(host);
                }
            }
        }
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    static INIT: std::sync::Once = std::sync::Once::new();
    set_once();
    INIT.call_once(|| {
        tracing_wasm::set_as_global_default();
        if let Some(window) = web_sys::window() {
            watch_environment(&window);
        }
    });
    install_scroll(current_ambient_effects());
    Ok(())
}

/// Mounts `variant` ("hero_orb" or "space_backdrop") into the element with
/// `container_id`, replacing whatever was mounted before. `config_json` may
/// override any subset of the visual configuration.
#[wasm_bindgen]
pub fn mount_visual(container_id: &str, variant: &str, config_json: Option<String>) -> Result<(), JsValue> {
    let variant =
        Variant::parse(variant).ok_or_else(|| JsValue::from_str(&format!("unknown variant: {variant}")))?;
    let config = match config_json {
        Some(json) => VisualConfig::from_json(&json).map_err(js_err)?,
        None => VisualConfig::default(),
    };
    mount_with_config(container_id, variant, config)
}

#[wasm_bindgen]
pub fn unmount_visual() {
    unmount_current();
    GENERATION.with(|g| g.set(g.get() + 1));
}

#[wasm_bindgen]
pub fn performance_profile_json() -> Result<String, JsValue> {
    with_gate(|gate| serde_json::to_string(gate.profile())).map_err(js_err)
}

#[wasm_bindgen]
pub fn ambient_effects_json() -> Result<String, JsValue> {
    serde_json::to_string(&current_ambient_effects()).map_err(js_err)
}

/// Scrolls to the first element matching `selector`; smooth only when
/// ambient effects allow it.
#[wasm_bindgen]
pub fn scroll_to_selector(selector: &str) {
    SCROLL.with(|scroll| {
        let scroll = scroll.borrow();
        if scroll.is_active() {
            scroll.scroll_to(&ScrollTarget::Selector(selector.to_string()));
        } else if let Some(element) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.query_selector(selector).ok().flatten())
        {
            element.scroll_into_view();
        }
    });
}
