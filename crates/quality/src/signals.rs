use serde::{Deserialize, Serialize};

/// Outcome of a best-effort capability probe.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Supported,
    Unsupported,
    /// The probe could not tell. Treated as unsupported.
    #[default]
    Unknown,
}

impl Capability {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Capability::Supported,
            Some(false) => Capability::Unsupported,
            None => Capability::Unknown,
        }
    }

    pub fn is_supported(self) -> bool {
        self == Capability::Supported
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebGlSupport {
    Hardware,
    /// A context exists but rasterizes on the CPU.
    Software,
    Unavailable,
    #[default]
    Unknown,
}

impl WebGlSupport {
    /// Hardware-accelerated 3D is available.
    pub fn capability(self) -> Capability {
        match self {
            WebGlSupport::Hardware => Capability::Supported,
            WebGlSupport::Software | WebGlSupport::Unavailable => Capability::Unsupported,
            WebGlSupport::Unknown => Capability::Unknown,
        }
    }
}

const SOFTWARE_RENDERERS: [&str; 4] = ["swiftshader", "llvmpipe", "software", "microsoft basic render"];

/// Classifies the result of a throwaway context probe. `renderer` is the
/// unmasked renderer string when the debug extension exposed it.
pub fn classify_renderer(context_created: bool, renderer: Option<&str>) -> WebGlSupport {
    if !context_created {
        return WebGlSupport::Unavailable;
    }
    let Some(renderer) = renderer else {
        return WebGlSupport::Hardware;
    };
    let lower = renderer.to_ascii_lowercase();
    if SOFTWARE_RENDERERS.iter().any(|s| lower.contains(s)) {
        WebGlSupport::Software
    } else {
        WebGlSupport::Hardware
    }
}

/// `navigator.connection.effectiveType`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkClass {
    Slow2g,
    TwoG,
    ThreeG,
    FourG,
    #[default]
    Unknown,
}

impl NetworkClass {
    pub fn from_effective_type(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "slow-2g" => NetworkClass::Slow2g,
            "2g" => NetworkClass::TwoG,
            "3g" => NetworkClass::ThreeG,
            "4g" => NetworkClass::FourG,
            _ => NetworkClass::Unknown,
        }
    }

    pub fn is_slow(self) -> bool {
        matches!(self, NetworkClass::Slow2g | NetworkClass::TwoG | NetworkClass::ThreeG)
    }
}

/// Snapshot of read-only platform signals. Missing readings stay `None` or
/// `Unknown`; none of them implies low power on its own.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSignals {
    pub prefers_reduced_motion: bool,
    /// `navigator.deviceMemory`, gigabytes.
    pub device_memory_gb: Option<f64>,
    pub hardware_concurrency: Option<u32>,
    pub network: NetworkClass,
    pub save_data: bool,
    pub coarse_pointer: bool,
    pub webgl: WebGlSupport,
}

/// Source of fresh [`PlatformSignals`]. Reading must never fail.
pub trait PlatformProbe {
    fn read(&self) -> PlatformSignals;
}

/// Probe returning whatever was last stored; for tests and native hosts.
#[derive(Debug, Default)]
pub struct FixedSignals(std::cell::Cell<PlatformSignals>);

impl FixedSignals {
    pub fn new(signals: PlatformSignals) -> Self {
        Self(std::cell::Cell::new(signals))
    }

    pub fn set(&self, signals: PlatformSignals) {
        self.0.set(signals);
    }
}

impl PlatformProbe for FixedSignals {
    fn read(&self) -> PlatformSignals {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_renderers_are_detected() {
        for r in [
            "Google SwiftShader",
            "ANGLE (Google, Vulkan 1.3.0 (SwiftShader Device (Subzero)), SwiftShader driver)",
            "llvmpipe (LLVM 15.0.7, 256 bits)",
            "Microsoft Basic Render Driver",
            "Software Adapter",
        ] {
            assert_eq!(classify_renderer(true, Some(r)), WebGlSupport::Software, "{r}");
        }
        assert_eq!(
            classify_renderer(true, Some("ANGLE (Apple, Apple M2, OpenGL 4.1)")),
            WebGlSupport::Hardware
        );
        assert_eq!(classify_renderer(true, None), WebGlSupport::Hardware);
        assert_eq!(classify_renderer(false, Some("whatever")), WebGlSupport::Unavailable);
    }

    #[test]
    fn unknown_capability_is_not_supported() {
        assert!(!Capability::Unknown.is_supported());
        assert!(!Capability::from_flag(None).is_supported());
        assert!(Capability::from_flag(Some(true)).is_supported());
        assert_eq!(WebGlSupport::Software.capability(), Capability::Unsupported);
    }

    #[test]
    fn network_classes() {
        assert!(NetworkClass::from_effective_type("slow-2g").is_slow());
        assert!(NetworkClass::from_effective_type("3G").is_slow());
        assert!(!NetworkClass::from_effective_type("4g").is_slow());
        assert_eq!(NetworkClass::from_effective_type("5g"), NetworkClass::Unknown);
        assert!(!NetworkClass::Unknown.is_slow());
    }
}
