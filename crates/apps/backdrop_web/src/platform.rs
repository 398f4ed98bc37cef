//! Browser readings behind [`PlatformProbe`] and the smooth-scroll
//! controller installed when ambient effects allow it.

use std::cell::{Cell, OnceCell};

use quality::{
    NetworkClass, PlatformProbe, PlatformSignals, ScrollController, ScrollTarget, WebGlSupport,
    classify_renderer,
};
use wasm_bindgen::{JsCast, JsValue};

/// `UNMASKED_RENDERER_WEBGL` from `WEBGL_debug_renderer_info`.
const UNMASKED_RENDERER_WEBGL: u32 = 0x9246;

fn media_matches(window: &web_sys::Window, query: &str) -> bool {
    matches!(window.match_media(query), Ok(Some(list)) if list.matches())
}

fn reflect_get(target: &JsValue, key: &str) -> Option<JsValue> {
    js_sys::Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Throwaway WebGL context; any failure reads as `Unknown` or `Unavailable`.
fn probe_webgl(document: &web_sys::Document) -> WebGlSupport {
    let Ok(element) = document.create_element("canvas") else {
        return WebGlSupport::Unknown;
    };
    let Ok(canvas) = element.dyn_into::<web_sys::HtmlCanvasElement>() else {
        return WebGlSupport::Unknown;
    };
    let context = canvas
        .get_context("webgl")
        .ok()
        .flatten()
        .or_else(|| canvas.get_context("experimental-webgl").ok().flatten())
        .and_then(|c| c.dyn_into::<web_sys::WebGlRenderingContext>().ok());
    let Some(gl) = context else {
        return classify_renderer(false, None);
    };
    let renderer = gl
        .get_extension("WEBGL_debug_renderer_info")
        .ok()
        .flatten()
        .and_then(|_| gl.get_parameter(UNMASKED_RENDERER_WEBGL).ok())
        .and_then(|v| v.as_string());
    let support = classify_renderer(true, renderer.as_deref());
    if let Some(lose) = gl
        .get_extension("WEBGL_lose_context")
        .ok()
        .flatten()
        .and_then(|ext| ext.dyn_into::<web_sys::WebglLoseContext>().ok())
    {
        lose.lose_context();
    }
    support
}

/// Reads signals from `window`. The WebGL probe runs once per page.
#[derive(Debug, Default)]
pub struct WebProbe {
    webgl: OnceCell<WebGlSupport>,
}

impl WebProbe {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlatformProbe for WebProbe {
    fn read(&self) -> PlatformSignals {
        let Some(window) = web_sys::window() else {
            return PlatformSignals::default();
        };
        let navigator: JsValue = window.navigator().into();
        let connection = reflect_get(&navigator, "connection");

        let webgl = *self.webgl.get_or_init(|| match window.document() {
            Some(document) => probe_webgl(&document),
            None => WebGlSupport::Unknown,
        });

        PlatformSignals {
            prefers_reduced_motion: media_matches(&window, "(prefers-reduced-motion: reduce)"),
            device_memory_gb: reflect_get(&navigator, "deviceMemory").and_then(|v| v.as_f64()),
            hardware_concurrency: reflect_get(&navigator, "hardwareConcurrency")
                .and_then(|v| v.as_f64())
                .filter(|n| *n > 0.0)
                .map(|n| n as u32),
            network: connection
                .as_ref()
                .and_then(|c| reflect_get(c, "effectiveType"))
                .and_then(|v| v.as_string())
                .map(|s| NetworkClass::from_effective_type(&s))
                .unwrap_or_default(),
            save_data: connection
                .as_ref()
                .and_then(|c| reflect_get(c, "saveData"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            coarse_pointer: media_matches(&window, "(pointer: coarse)"),
            webgl,
        }
    }
}

/// Native smooth scrolling through `scrollIntoView` / `scrollTo`.
#[derive(Debug)]
pub struct WebScroll {
    running: Cell<bool>,
}

impl WebScroll {
    pub fn new() -> Self {
        Self {
            running: Cell::new(true),
        }
    }
}

impl ScrollController for WebScroll {
    fn scroll_to(&self, target: &ScrollTarget) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let behavior = if self.running.get() {
            web_sys::ScrollBehavior::Smooth
        } else {
            web_sys::ScrollBehavior::Instant
        };
        match target {
            ScrollTarget::Selector(selector) => {
                let element = window
                    .document()
                    .and_then(|d| d.query_selector(selector).ok().flatten());
                if let Some(element) = element {
                    let options = web_sys::ScrollIntoViewOptions::new();
                    options.set_behavior(behavior);
                    element.scroll_into_view_with_scroll_into_view_options(&options);
                }
            }
            ScrollTarget::Offset(y) => {
                let options = web_sys::ScrollToOptions::new();
                options.set_top(*y);
                options.set_behavior(behavior);
                window.scroll_to_with_scroll_to_options(&options);
            }
        }
    }

    fn stop(&self) {
        self.running.set(false);
    }

    fn start(&self) {
        self.running.set(true);
    }
}
