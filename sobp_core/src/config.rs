//! Configuration types for the SOBP pipeline.
//!
//! These are the runtime configuration structs used by the scheduler and the
//! emitter. They are separate from the TOML-deserialized config in `sobp_config`.

use sobp_config::{DEFAULT_DELTA_CM, DEFAULT_NBEAMS, WATER_ALPHA};

/// Propagation medium of the range-energy relation.
#[derive(Debug, Clone, PartialEq)]
pub struct MediumCfg {
    /// Range-energy coefficient (cm / MeV^p).
    pub alpha: f64,
    /// Exponent of the range-energy relation. `None` reuses the SOBP exponent.
    pub range_exponent: Option<f64>,
}

impl Default for MediumCfg {
    fn default() -> Self {
        Self {
            alpha: WATER_ALPHA,
            range_exponent: None,
        }
    }
}

/// Beamlet count and spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamletCfg {
    /// Minimum number of beamlets.
    pub nbeams: usize,
    /// Requested spacing between neighbouring ranges, in cm.
    pub delta: f64,
}

impl Default for BeamletCfg {
    fn default() -> Self {
        Self {
            nbeams: DEFAULT_NBEAMS,
            delta: DEFAULT_DELTA_CM,
        }
    }
}

/// Placement of beamlet start times on the normalized time axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimingMode {
    /// `t_i = i / n`.
    #[default]
    Uniform,
    /// `t_i` is the weight delivered before beamlet `i` over the total weight,
    /// so each energy step lasts in proportion to its weight.
    Weighted,
}

/// Naming and scaling of the emitted time features.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputCfg {
    /// Rendered length of the normalized `[0, 1)` time axis, in ms.
    pub time_span_ms: f64,
    pub energy_feature: String,
    pub weight_feature: String,
    pub timing: TimingMode,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            time_span_ms: 1000.0,
            energy_feature: "BeamEnergy".to_string(),
            weight_feature: "BeamWeight".to_string(),
            timing: TimingMode::Uniform,
        }
    }
}
