/// Lifecycle of one visual session.
///
/// `Uninitialized -> Initializing -> Running -> Disposing -> Disposed`.
/// Teardown may start from any non-terminal state; `Disposed` is terminal.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initializing,
    Running,
    Disposing,
    Disposed,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Uninitialized, Initializing)
                | (Initializing, Running)
                | (Uninitialized | Initializing | Running, Disposing)
                | (Disposing, Disposed)
        )
    }

    /// True until teardown begins.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            SessionState::Uninitialized | SessionState::Initializing | SessionState::Running
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initializing => "initializing",
            SessionState::Running => "running",
            SessionState::Disposing => "disposing",
            SessionState::Disposed => "disposed",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: SessionState,
    pub to: SessionState,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid session transition {} -> {}",
            self.from.as_str(),
            self.to.as_str()
        )
    }
}

impl std::error::Error for InvalidTransition {}

#[derive(Debug, Default, Clone)]
pub struct Lifecycle {
    state: SessionState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn advance(&mut self, next: SessionState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Lifecycle, SessionState};

    #[test]
    fn happy_path() {
        let mut lc = Lifecycle::new();
        for next in [
            SessionState::Initializing,
            SessionState::Running,
            SessionState::Disposing,
            SessionState::Disposed,
        ] {
            lc.advance(next).unwrap();
        }
        assert_eq!(lc.state(), SessionState::Disposed);
    }

    #[test]
    fn disposed_is_terminal() {
        let mut lc = Lifecycle::new();
        lc.advance(SessionState::Disposing).unwrap();
        lc.advance(SessionState::Disposed).unwrap();
        for next in [
            SessionState::Uninitialized,
            SessionState::Initializing,
            SessionState::Running,
            SessionState::Disposing,
        ] {
            let err = lc.advance(next).unwrap_err();
            assert_eq!(err.from, SessionState::Disposed);
        }
    }

    #[test]
    fn teardown_allowed_before_running() {
        assert!(SessionState::Initializing.can_transition_to(SessionState::Disposing));
        assert!(!SessionState::Running.can_transition_to(SessionState::Initializing));
        assert!(!SessionState::Disposing.is_live());
    }
}
