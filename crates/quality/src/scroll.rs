use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum ScrollTarget {
    /// CSS selector of the element to bring into view.
    Selector(String),
    /// Absolute vertical offset in CSS pixels.
    Offset(f64),
}

/// Page-level smooth scrolling.
pub trait ScrollController {
    fn scroll_to(&self, target: &ScrollTarget);
    /// Pauses inertial scrolling, e.g. while a modal is open.
    fn stop(&self);
    fn start(&self);
}

/// Used when smooth scrolling is disabled: every call does nothing.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopScroll;

impl ScrollController for NoopScroll {
    fn scroll_to(&self, _target: &ScrollTarget) {}
    fn stop(&self) {}
    fn start(&self) {}
}

/// Handle to the active scroll controller, passed to whatever needs to
/// scroll. Cloning shares the controller.
#[derive(Clone)]
pub struct ScrollContext {
    controller: Rc<dyn ScrollController>,
    active: bool,
}

impl Default for ScrollContext {
    fn default() -> Self {
        Self::noop()
    }
}

impl std::fmt::Debug for ScrollContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollContext")
            .field("active", &self.active)
            .finish()
    }
}

impl ScrollContext {
    pub fn noop() -> Self {
        Self {
            controller: Rc::new(NoopScroll),
            active: false,
        }
    }

    pub fn new(controller: Rc<dyn ScrollController>) -> Self {
        Self {
            controller,
            active: true,
        }
    }

    /// Whether a real controller is installed.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn scroll_to(&self, target: &ScrollTarget) {
        self.controller.scroll_to(target);
    }

    pub fn stop(&self) {
        self.controller.stop();
    }

    pub fn start(&self) {
        self.controller.start();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl ScrollController for Recorder {
        fn scroll_to(&self, target: &ScrollTarget) {
            self.0.borrow_mut().push(format!("{target:?}"));
        }
        fn stop(&self) {
            self.0.borrow_mut().push("stop".into());
        }
        fn start(&self) {
            self.0.borrow_mut().push("start".into());
        }
    }

    #[test]
    fn default_context_is_inert() {
        let ctx = ScrollContext::default();
        assert!(!ctx.is_active());
        ctx.scroll_to(&ScrollTarget::Offset(100.0));
        ctx.stop();
        ctx.start();
    }

    #[test]
    fn clones_share_the_controller() {
        let recorder = Rc::new(Recorder::default());
        let ctx = ScrollContext::new(recorder.clone());
        let other = ctx.clone();
        ctx.scroll_to(&ScrollTarget::Selector("#contact".into()));
        other.stop();
        assert_eq!(
            *recorder.0.borrow(),
            vec!["Selector(\"#contact\")".to_string(), "stop".to_string()]
        );
    }
}
