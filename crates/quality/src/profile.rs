use serde::{Deserialize, Serialize};

use crate::signals::PlatformSignals;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Memory at or below this many gigabytes counts as low power.
    pub low_memory_gb: f64,
    /// Logical cores at or below this count as low power.
    pub low_cpu_count: u32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            low_memory_gb: 4.0,
            low_cpu_count: 4,
        }
    }
}

/// Why a profile came out low power.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowPowerReason {
    ReducedMotion,
    NoHardware3d,
    LowMemory,
    FewCores,
    SlowNetwork,
    DataSaver,
    CoarsePointer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceProfile {
    pub is_low_power: bool,
    pub should_reduce_motion: bool,
    pub webgl_supported: bool,
    #[serde(default)]
    pub reasons: Vec<LowPowerReason>,
}

impl PerformanceProfile {
    /// Whether the full simulation may mount.
    pub fn allows_full_simulation(&self) -> bool {
        !self.is_low_power && !self.should_reduce_motion && self.webgl_supported
    }
}

pub fn evaluate(signals: &PlatformSignals) -> PerformanceProfile {
    evaluate_with(signals, &QualityThresholds::default())
}

/// Pure decision rule. Unknown readings never count against the device,
/// except the 3D probe, where unknown is treated as unsupported.
pub fn evaluate_with(signals: &PlatformSignals, thresholds: &QualityThresholds) -> PerformanceProfile {
    let webgl_supported = signals.webgl.capability().is_supported();

    let mut reasons = Vec::new();
    if signals.prefers_reduced_motion {
        reasons.push(LowPowerReason::ReducedMotion);
    }
    if !webgl_supported {
        reasons.push(LowPowerReason::NoHardware3d);
    }
    if signals
        .device_memory_gb
        .is_some_and(|gb| gb <= thresholds.low_memory_gb)
    {
        reasons.push(LowPowerReason::LowMemory);
    }
    if signals
        .hardware_concurrency
        .is_some_and(|n| n <= thresholds.low_cpu_count)
    {
        reasons.push(LowPowerReason::FewCores);
    }
    if signals.network.is_slow() {
        reasons.push(LowPowerReason::SlowNetwork);
    }
    if signals.save_data {
        reasons.push(LowPowerReason::DataSaver);
    }
    if signals.coarse_pointer {
        reasons.push(LowPowerReason::CoarsePointer);
    }

    let is_low_power = !reasons.is_empty();
    PerformanceProfile {
        is_low_power,
        should_reduce_motion: is_low_power || signals.prefers_reduced_motion,
        webgl_supported,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{NetworkClass, WebGlSupport};
    use pretty_assertions::assert_eq;

    fn capable() -> PlatformSignals {
        PlatformSignals {
            prefers_reduced_motion: false,
            device_memory_gb: Some(16.0),
            hardware_concurrency: Some(12),
            network: NetworkClass::FourG,
            save_data: false,
            coarse_pointer: false,
            webgl: WebGlSupport::Hardware,
        }
    }

    #[test]
    fn capable_desktop_runs_full() {
        let p = evaluate(&capable());
        assert_eq!(
            p,
            PerformanceProfile {
                is_low_power: false,
                should_reduce_motion: false,
                webgl_supported: true,
                reasons: vec![],
            }
        );
        assert!(p.allows_full_simulation());
    }

    #[test]
    fn memory_bound_device_is_low_power() {
        let signals = PlatformSignals {
            device_memory_gb: Some(2.0),
            hardware_concurrency: Some(8),
            ..capable()
        };
        let p = evaluate(&signals);
        assert!(p.is_low_power);
        assert!(p.should_reduce_motion);
        assert!(p.webgl_supported);
        assert_eq!(p.reasons, vec![LowPowerReason::LowMemory]);
        assert!(!p.allows_full_simulation());
    }

    #[test]
    fn thresholds_are_inclusive() {
        let at_limit = PlatformSignals {
            device_memory_gb: Some(4.0),
            hardware_concurrency: Some(4),
            ..capable()
        };
        assert_eq!(
            evaluate(&at_limit).reasons,
            vec![LowPowerReason::LowMemory, LowPowerReason::FewCores]
        );
    }

    #[test]
    fn missing_readings_do_not_count() {
        let signals = PlatformSignals {
            device_memory_gb: None,
            hardware_concurrency: None,
            network: NetworkClass::Unknown,
            ..capable()
        };
        assert!(!evaluate(&signals).is_low_power);
    }

    #[test]
    fn each_signal_alone_flips_low_power() {
        let cases: Vec<(PlatformSignals, LowPowerReason)> = vec![
            (
                PlatformSignals {
                    prefers_reduced_motion: true,
                    ..capable()
                },
                LowPowerReason::ReducedMotion,
            ),
            (
                PlatformSignals {
                    webgl: WebGlSupport::Software,
                    ..capable()
                },
                LowPowerReason::NoHardware3d,
            ),
            (
                PlatformSignals {
                    webgl: WebGlSupport::Unknown,
                    ..capable()
                },
                LowPowerReason::NoHardware3d,
            ),
            (
                PlatformSignals {
                    network: NetworkClass::Slow2g,
                    ..capable()
                },
                LowPowerReason::SlowNetwork,
            ),
            (
                PlatformSignals {
                    save_data: true,
                    ..capable()
                },
                LowPowerReason::DataSaver,
            ),
            (
                PlatformSignals {
                    coarse_pointer: true,
                    ..capable()
                },
                LowPowerReason::CoarsePointer,
            ),
        ];
        for (signals, reason) in cases {
            let p = evaluate(&signals);
            assert_eq!(p.reasons, vec![reason]);
            assert!(p.is_low_power && p.should_reduce_motion);
        }
    }

    #[test]
    fn low_power_always_implies_reduced_motion() {
        let memories = [None, Some(0.5), Some(2.0), Some(4.0), Some(8.0)];
        let cores = [None, Some(1), Some(4), Some(8)];
        let networks = [
            NetworkClass::Slow2g,
            NetworkClass::TwoG,
            NetworkClass::ThreeG,
            NetworkClass::FourG,
            NetworkClass::Unknown,
        ];
        let webgls = [
            WebGlSupport::Hardware,
            WebGlSupport::Software,
            WebGlSupport::Unavailable,
            WebGlSupport::Unknown,
        ];
        for bits in 0..8u8 {
            for memory in memories {
                for cpu in cores {
                    for network in networks {
                        for webgl in webgls {
                            let signals = PlatformSignals {
                                prefers_reduced_motion: bits & 1 != 0,
                                save_data: bits & 2 != 0,
                                coarse_pointer: bits & 4 != 0,
                                device_memory_gb: memory,
                                hardware_concurrency: cpu,
                                network,
                                webgl,
                            };
                            let p = evaluate(&signals);
                            assert!(!p.is_low_power || p.should_reduce_motion, "{signals:?}");
                            assert_eq!(p.is_low_power, !p.reasons.is_empty());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(evaluate(&capable())).unwrap();
        assert_eq!(json["isLowPower"], serde_json::json!(false));
        assert_eq!(json["shouldReduceMotion"], serde_json::json!(false));
        assert_eq!(json["webglSupported"], serde_json::json!(true));
    }
}
