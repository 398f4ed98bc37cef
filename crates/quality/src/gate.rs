use tracing::debug;

use crate::profile::{PerformanceProfile, QualityThresholds, evaluate_with};
use crate::signals::PlatformProbe;

/// Host events after which the profile is re-evaluated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnvironmentChange {
    /// Reduced-motion or pointer media query changed.
    DisplayPreference,
    ViewportResize,
    WindowFocus,
    NetworkChange,
}

impl EnvironmentChange {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvironmentChange::DisplayPreference => "display-preference",
            EnvironmentChange::ViewportResize => "viewport-resize",
            EnvironmentChange::WindowFocus => "window-focus",
            EnvironmentChange::NetworkChange => "network-change",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub previous: PerformanceProfile,
    pub current: PerformanceProfile,
}

impl ProfileUpdate {
    /// The full-versus-fallback decision changed.
    pub fn flips_mount(&self) -> bool {
        self.previous.allows_full_simulation() != self.current.allows_full_simulation()
    }
}

/// Holds the current [`PerformanceProfile`] and refreshes it on demand.
#[derive(Debug)]
pub struct QualityGate<P> {
    probe: P,
    thresholds: QualityThresholds,
    profile: PerformanceProfile,
}

impl<P: PlatformProbe> QualityGate<P> {
    /// Evaluates synchronously on construction.
    pub fn new(probe: P) -> Self {
        Self::with_thresholds(probe, QualityThresholds::default())
    }

    pub fn with_thresholds(probe: P, thresholds: QualityThresholds) -> Self {
        let profile = evaluate_with(&probe.read(), &thresholds);
        debug!(
            low_power = profile.is_low_power,
            reduce_motion = profile.should_reduce_motion,
            webgl = profile.webgl_supported,
            "quality profile evaluated"
        );
        Self {
            probe,
            thresholds,
            profile,
        }
    }

    pub fn profile(&self) -> &PerformanceProfile {
        &self.profile
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Re-reads the signals. Returns the transition when anything changed.
    pub fn on_change(&mut self, change: EnvironmentChange) -> Option<ProfileUpdate> {
        let current = evaluate_with(&self.probe.read(), &self.thresholds);
        if current == self.profile {
            return None;
        }
        let previous = std::mem::replace(&mut self.profile, current.clone());
        debug!(
            change = change.as_str(),
            low_power = current.is_low_power,
            "quality profile changed"
        );
        Some(ProfileUpdate { previous, current })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{FixedSignals, NetworkClass, PlatformSignals, WebGlSupport};

    fn desktop() -> PlatformSignals {
        PlatformSignals {
            device_memory_gb: Some(8.0),
            hardware_concurrency: Some(8),
            network: NetworkClass::FourG,
            webgl: WebGlSupport::Hardware,
            ..PlatformSignals::default()
        }
    }

    #[test]
    fn evaluates_on_construction() {
        let gate = QualityGate::new(FixedSignals::new(desktop()));
        assert!(gate.profile().allows_full_simulation());
    }

    #[test]
    fn unchanged_signals_report_nothing() {
        let mut gate = QualityGate::new(FixedSignals::new(desktop()));
        assert_eq!(gate.on_change(EnvironmentChange::ViewportResize), None);
        assert_eq!(gate.on_change(EnvironmentChange::WindowFocus), None);
    }

    #[test]
    fn reduced_motion_toggle_flips_mount() {
        let mut gate = QualityGate::new(FixedSignals::new(desktop()));
        gate.probe().set(PlatformSignals {
            prefers_reduced_motion: true,
            ..desktop()
        });
        let update = gate.on_change(EnvironmentChange::DisplayPreference).unwrap();
        assert!(update.flips_mount());
        assert!(gate.profile().should_reduce_motion);

        gate.probe().set(desktop());
        let back = gate.on_change(EnvironmentChange::DisplayPreference).unwrap();
        assert!(back.flips_mount());
        assert!(gate.profile().allows_full_simulation());
    }

    #[test]
    fn second_reason_changes_profile_but_not_mount() {
        let mut gate = QualityGate::new(FixedSignals::new(PlatformSignals {
            save_data: true,
            ..desktop()
        }));
        gate.probe().set(PlatformSignals {
            save_data: true,
            network: NetworkClass::TwoG,
            ..desktop()
        });
        let update = gate.on_change(EnvironmentChange::NetworkChange).unwrap();
        assert!(!update.flips_mount());
        assert_eq!(update.current.reasons.len(), 2);
    }
}
