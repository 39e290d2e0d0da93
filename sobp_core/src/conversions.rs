//! `From` implementations bridging `sobp_config` types to `sobp_core` types.

use crate::config::{BeamletCfg, MediumCfg, OutputCfg, TimingMode};
use crate::error::Result;
use crate::recommended::RecommendedTable;

// ── MediumCfg ────────────────────────────────────────────────────────────────

impl From<&sobp_config::Medium> for MediumCfg {
    fn from(c: &sobp_config::Medium) -> Self {
        Self {
            alpha: c.alpha,
            range_exponent: c.range_exponent,
        }
    }
}

// ── BeamletCfg ───────────────────────────────────────────────────────────────

impl From<&sobp_config::Beamlets> for BeamletCfg {
    fn from(c: &sobp_config::Beamlets) -> Self {
        Self {
            nbeams: c.nbeams,
            delta: c.delta,
        }
    }
}

// ── OutputCfg ────────────────────────────────────────────────────────────────

impl From<&sobp_config::Output> for OutputCfg {
    fn from(c: &sobp_config::Output) -> Self {
        Self {
            time_span_ms: c.time_span_ms,
            energy_feature: c.energy_feature.clone(),
            weight_feature: c.weight_feature.clone(),
            timing: c.timing.into(),
        }
    }
}

impl From<sobp_config::Timing> for TimingMode {
    fn from(t: sobp_config::Timing) -> Self {
        match t {
            sobp_config::Timing::Uniform => TimingMode::Uniform,
            sobp_config::Timing::Weighted => TimingMode::Weighted,
        }
    }
}

// ── RecommendedTable ─────────────────────────────────────────────────────────

impl TryFrom<sobp_config::RecommendedGrid> for RecommendedTable {
    type Error = crate::error::SobpError;
    fn try_from(g: sobp_config::RecommendedGrid) -> Result<Self> {
        RecommendedTable::new(g.chis, g.energies, g.values)
    }
}
