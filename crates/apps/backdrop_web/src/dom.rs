use quality::StaticFallback;
use session::{FrameHandle, ListenerId, ListenerKind, SessionHost, Viewport};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Closures the host hands to the browser. They outlive every registration
/// made with them because the host owns both.
pub struct HostCallbacks {
    pub frame: Closure<dyn FnMut(f64)>,
    pub resize: Closure<dyn FnMut()>,
    pub pointer: Closure<dyn FnMut(web_sys::PointerEvent)>,
}

/// [`SessionHost`] over the real page: `requestAnimationFrame`, passive
/// window listeners, and a canvas inside the sizing container.
pub struct DomHost {
    window: web_sys::Window,
    container: web_sys::HtmlElement,
    canvas: Option<web_sys::HtmlCanvasElement>,
    callbacks: Option<HostCallbacks>,
    listeners: Vec<(ListenerId, ListenerKind)>,
    next_listener: u32,
}

fn event_name(kind: ListenerKind) -> &'static str {
    match kind {
        ListenerKind::Resize => "resize",
        ListenerKind::PointerMove => "pointermove",
    }
}

impl DomHost {
    pub fn new(
        window: web_sys::Window,
        container: web_sys::HtmlElement,
        canvas: Option<web_sys::HtmlCanvasElement>,
        callbacks: Option<HostCallbacks>,
    ) -> Self {
        Self {
            window,
            container,
            canvas,
            callbacks,
            listeners: Vec::new(),
            next_listener: 1,
        }
    }

    pub fn into_parts(
        self,
    ) -> (
        web_sys::Window,
        web_sys::HtmlElement,
        Option<web_sys::HtmlCanvasElement>,
    ) {
        (self.window, self.container, self.canvas)
    }

    pub fn window(&self) -> &web_sys::Window {
        &self.window
    }

    /// Matches the canvas backing store to the container at the capped
    /// pixel ratio.
    pub fn sync_canvas_size(&self, max_pixel_ratio: f64) {
        if let Some(canvas) = &self.canvas {
            let (w, h) = self.viewport().physical_size(max_pixel_ratio);
            canvas.set_width(w);
            canvas.set_height(h);
        }
    }

    /// Removes a static fallback gradient, if one was applied.
    pub fn clear_fallback(&self) {
        if let Err(err) = self.container.style().remove_property("background") {
            warn!(?err, "could not clear fallback background");
        }
    }

    fn listener_callback(&self, kind: ListenerKind) -> Option<&js_sys::Function> {
        let callbacks = self.callbacks.as_ref()?;
        Some(match kind {
            ListenerKind::Resize => callbacks.resize.as_ref().unchecked_ref(),
            ListenerKind::PointerMove => callbacks.pointer.as_ref().unchecked_ref(),
        })
    }
}

impl SessionHost for DomHost {
    fn request_frame(&mut self) -> FrameHandle {
        let Some(callbacks) = &self.callbacks else {
            return FrameHandle(0);
        };
        match self
            .window
            .request_animation_frame(callbacks.frame.as_ref().unchecked_ref())
        {
            Ok(handle) => FrameHandle(handle),
            Err(err) => {
                warn!(?err, "requestAnimationFrame failed");
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            warn!(?err, handle = handle.0, "cancelAnimationFrame failed");
        }
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        if let Some(callback) = self.listener_callback(kind) {
            let options = web_sys::AddEventListenerOptions::new();
            options.set_passive(true);
            let added = self
                .window
                .add_event_listener_with_callback_and_add_event_listener_options(
                    event_name(kind),
                    callback,
                    &options,
                );
            if let Err(err) = added {
                warn!(?err, event = event_name(kind), "addEventListener failed");
            }
        }
        self.listeners.push((id, kind));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        let Some(pos) = self.listeners.iter().position(|(l, _)| *l == id) else {
            return;
        };
        let (_, kind) = self.listeners.remove(pos);
        if let Some(callback) = self.listener_callback(kind) {
            let removed = self
                .window
                .remove_event_listener_with_callback(event_name(kind), callback);
            if let Err(err) = removed {
                warn!(?err, event = event_name(kind), "removeEventListener failed");
            }
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.container.client_width() as f64,
            height: self.container.client_height() as f64,
            device_pixel_ratio: self.window.device_pixel_ratio(),
        }
    }

    fn detach_surface(&mut self) -> bool {
        match self.canvas.take() {
            Some(canvas) if canvas.is_connected() => {
                canvas.remove();
                true
            }
            _ => false,
        }
    }

    fn apply_fallback(&mut self, fallback: &StaticFallback) {
        if let Err(err) = self
            .container
            .style()
            .set_property("background", fallback.css_background)
        {
            warn!(?err, "could not apply fallback background");
        }
    }
}
