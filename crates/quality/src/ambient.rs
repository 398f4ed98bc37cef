use serde::{Deserialize, Serialize};

use crate::profile::PerformanceProfile;
use crate::signals::PlatformSignals;

/// Continuous page-level effects outside the 3D scene.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbientEffects {
    pub custom_cursor: bool,
    pub smooth_scroll: bool,
}

impl AmbientEffects {
    pub fn from_profile(profile: &PerformanceProfile, signals: &PlatformSignals) -> Self {
        if profile.should_reduce_motion {
            return Self::default();
        }
        Self {
            custom_cursor: !signals.coarse_pointer,
            smooth_scroll: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Planet with layered shells, ring, and a moon.
    HeroOrb,
    /// Page-wide galaxy with ships trading fire.
    SpaceBackdrop,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::HeroOrb => "hero_orb",
            Variant::SpaceBackdrop => "space_backdrop",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hero_orb" | "hero-orb" | "hero" => Some(Variant::HeroOrb),
            "space_backdrop" | "space-backdrop" | "backdrop" => Some(Variant::SpaceBackdrop),
            _ => None,
        }
    }
}

/// CSS-only placeholder shown instead of the simulation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StaticFallback {
    pub variant: Variant,
    pub css_background: &'static str,
}

impl StaticFallback {
    pub fn for_variant(variant: Variant) -> Self {
        let css_background = match variant {
            Variant::HeroOrb => {
                "radial-gradient(circle at 50% 50%, #3b6fd8 0%, #1b2f6b 28%, rgba(10,14,35,0.6) 42%, transparent 60%), \
                 radial-gradient(ellipse at center, #0b1026 0%, #03040c 100%)"
            }
            Variant::SpaceBackdrop => {
                "radial-gradient(ellipse at 30% 40%, rgba(120,60,200,0.35) 0%, transparent 55%), \
                 radial-gradient(ellipse at 70% 65%, rgba(40,120,220,0.3) 0%, transparent 50%), \
                 linear-gradient(180deg, #05060f 0%, #0a0c1f 100%)"
            }
        };
        Self {
            variant,
            css_background,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MountDecision {
    Full(Variant),
    Fallback(StaticFallback),
}

impl MountDecision {
    pub fn for_profile(profile: &PerformanceProfile, variant: Variant) -> Self {
        if profile.allows_full_simulation() {
            MountDecision::Full(variant)
        } else {
            MountDecision::Fallback(StaticFallback::for_variant(variant))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::evaluate;
    use crate::signals::WebGlSupport;

    fn desktop() -> PlatformSignals {
        PlatformSignals {
            device_memory_gb: Some(8.0),
            hardware_concurrency: Some(8),
            webgl: WebGlSupport::Hardware,
            ..PlatformSignals::default()
        }
    }

    #[test]
    fn reduce_motion_disables_everything() {
        let signals = PlatformSignals {
            prefers_reduced_motion: true,
            ..desktop()
        };
        let effects = AmbientEffects::from_profile(&evaluate(&signals), &signals);
        assert_eq!(effects, AmbientEffects::default());
    }

    #[test]
    fn capable_desktop_gets_both() {
        let signals = desktop();
        let effects = AmbientEffects::from_profile(&evaluate(&signals), &signals);
        assert_eq!(
            effects,
            AmbientEffects {
                custom_cursor: true,
                smooth_scroll: true
            }
        );
    }

    #[test]
    fn fallback_carries_variant_gradient() {
        let signals = PlatformSignals {
            device_memory_gb: Some(2.0),
            ..desktop()
        };
        let decision = MountDecision::for_profile(&evaluate(&signals), Variant::SpaceBackdrop);
        let MountDecision::Fallback(fallback) = decision else {
            panic!("expected fallback");
        };
        assert_eq!(fallback.variant, Variant::SpaceBackdrop);
        assert!(fallback.css_background.contains("gradient"));
        assert_ne!(
            StaticFallback::for_variant(Variant::HeroOrb).css_background,
            fallback.css_background
        );
    }

    #[test]
    fn variant_names_round_trip() {
        for v in [Variant::HeroOrb, Variant::SpaceBackdrop] {
            assert_eq!(Variant::parse(v.as_str()), Some(v));
        }
        assert_eq!(Variant::parse("globe"), None);
    }
}
