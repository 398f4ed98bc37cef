use quality::StaticFallback;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Resize,
    PointerMove,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

/// Container size in CSS pixels plus the display's device pixel ratio.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Surface size in physical pixels, with the pixel ratio capped.
    pub fn physical_size(&self, max_pixel_ratio: f64) -> (u32, u32) {
        let dpr = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio.min(max_pixel_ratio)
        } else {
            1.0
        };
        let w = (self.width.max(0.0) * dpr).round() as u32;
        let h = (self.height.max(0.0) * dpr).round() as u32;
        (w.max(1), h.max(1))
    }
}

/// The page-side collaborator of a session: frame scheduling, window
/// listeners, and the rendering surface element.
pub trait SessionHost {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
    /// Registers a passive window listener.
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;
    fn remove_listener(&mut self, id: ListenerId);
    fn viewport(&self) -> Viewport;
    /// Removes the surface from the document. Returns false if it was
    /// already gone.
    fn detach_surface(&mut self) -> bool;
    fn apply_fallback(&mut self, fallback: &StaticFallback);
}

/// In-memory host that records scheduling and listener traffic.
#[derive(Debug)]
pub struct ScriptedHost {
    pub viewport: Viewport,
    next_handle: i32,
    next_listener: u32,
    pending: Vec<FrameHandle>,
    listeners: Vec<(ListenerId, ListenerKind)>,
    pub frames_requested: usize,
    pub frames_cancelled: usize,
    pub listeners_added: usize,
    pub listeners_removed: usize,
    pub surface_attached: bool,
    pub fallback: Option<StaticFallback>,
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new(Viewport {
            width: 1280.0,
            height: 720.0,
            device_pixel_ratio: 1.0,
        })
    }
}

impl ScriptedHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            next_handle: 1,
            next_listener: 1,
            pending: Vec::new(),
            listeners: Vec::new(),
            frames_requested: 0,
            frames_cancelled: 0,
            listeners_added: 0,
            listeners_removed: 0,
            surface_attached: true,
            fallback: None,
        }
    }

    /// Outstanding frame requests not yet fired or cancelled.
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// Marks the oldest pending request as fired. Returns false if none
    /// was pending.
    pub fn fire_frame(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        self.pending.remove(0);
        true
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.len()
    }
}

impl SessionHost for ScriptedHost {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.frames_requested += 1;
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(pos) = self.pending.iter().position(|h| *h == handle) {
            self.pending.remove(pos);
            self.frames_cancelled += 1;
        }
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners_added += 1;
        self.listeners.push((id, kind));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        if let Some(pos) = self.listeners.iter().position(|(l, _)| *l == id) {
            self.listeners.remove(pos);
            self.listeners_removed += 1;
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn detach_surface(&mut self) -> bool {
        std::mem::replace(&mut self.surface_attached, false)
    }

    fn apply_fallback(&mut self, fallback: &StaticFallback) {
        self.fallback = Some(*fallback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        let v = Viewport {
            width: 800.0,
            height: 400.0,
            device_pixel_ratio: 3.0,
        };
        assert_eq!(v.physical_size(2.0), (1600, 800));
        assert_eq!(v.aspect(), 2.0);
        let odd = Viewport {
            width: 0.0,
            height: 0.0,
            device_pixel_ratio: f64::NAN,
        };
        assert_eq!(odd.physical_size(2.0), (1, 1));
        assert_eq!(odd.aspect(), 1.0);
    }

    #[test]
    fn cancel_only_counts_pending_frames() {
        let mut host = ScriptedHost::default();
        let h = host.request_frame();
        assert!(host.fire_frame());
        host.cancel_frame(h);
        assert_eq!(host.frames_cancelled, 0);
        let h = host.request_frame();
        host.cancel_frame(h);
        assert_eq!(host.frames_cancelled, 1);
        assert_eq!(host.pending_frames(), 0);
    }
}
