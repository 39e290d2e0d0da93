//! Pipeline runner: range-energy model → scheduler → weight solver → emitter.

use std::fmt;

use crate::builder::SobpRequest;
use crate::emitter::{EmittedTracks, RenderHeader, emit, render_topas};
use crate::error::Result;
use crate::range_energy::PowerLawParameters;
use crate::schedule::{SobpSchedule, schedule_beamlets};
use crate::weights::{probe_depth, solve_weights_with, summed_dose};

/// Where the power-law exponent came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PSource {
    User,
    Recommended,
}

impl PSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PSource::User => "user",
            PSource::Recommended => "recommended",
        }
    }
}

/// Result of one run: the solved schedule and its time features.
#[derive(Debug, Clone, PartialEq)]
pub struct SobpPlan {
    pub p: f64,
    pub p_source: PSource,
    pub schedule: SobpSchedule,
    pub tracks: EmittedTracks,
    pub time_span_ms: f64,
}

impl SobpPlan {
    /// Peak-to-peak spread of the summed dose at the probe depths, relative to its mean.
    pub fn plateau_ripple(&self) -> f64 {
        let ranges = self.schedule.ranges();
        let weights = self.tracks.weight.values();
        let doses: Vec<f64> = (0..ranges.len())
            .map(|i| summed_dose(self.p, &ranges, &weights, probe_depth(&ranges, i)))
            .collect();
        let mean = doses.iter().sum::<f64>() / doses.len() as f64;
        let (lo, hi) = doses
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| {
                (lo.min(d), hi.max(d))
            });
        if mean > 0.0 { (hi - lo) / mean } else { 0.0 }
    }
}

/// Renders the plan as TOPAS time-feature text.
impl fmt::Display for SobpPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = RenderHeader {
            max_energy: self.schedule.max_energy(),
            chi: self.schedule.chi(),
            p: self.p,
        };
        render_topas(f, &header, &self.tracks, self.time_span_ms)
    }
}

/// Exponent supplied by the caller, or interpolated from the recommended table.
pub fn resolve_p(req: &SobpRequest) -> Result<(f64, PSource)> {
    match req.p {
        Some(p) => Ok((p, PSource::User)),
        None => {
            let p = req.table.lookup(req.energy, req.chi)?;
            tracing::info!(p, energy = req.energy, chi = req.chi, "interpolated recommended p");
            Ok((p, PSource::Recommended))
        }
    }
}

/// Run the full pipeline. Nothing is emitted unless every stage succeeds.
pub fn run(req: &SobpRequest) -> Result<SobpPlan> {
    let (p, p_source) = resolve_p(req)?;

    let model = PowerLawParameters::new(req.medium.range_exponent.unwrap_or(p), req.medium.alpha)?;
    if req.medium.range_exponent.is_some() && !model.in_valid_band() {
        tracing::warn!(
            range_exponent = model.exponent(),
            "range-energy exponent outside the fitted band for protons in water"
        );
    }

    let schedule = schedule_beamlets(&model, req.energy, req.chi, &req.beamlets)?;
    let weights = solve_weights_with(req.method, p, &schedule.ranges())?;
    let schedule = schedule.with_weights(&weights)?;
    let tracks = emit(&schedule, &req.output)?;

    let plan = SobpPlan {
        p,
        p_source,
        schedule,
        tracks,
        time_span_ms: req.output.time_span_ms,
    };
    tracing::debug!(
        beamlets = plan.schedule.len(),
        max_range_cm = plan.schedule.max_range(),
        ripple = plan.plateau_ripple(),
        "SOBP planned"
    );
    Ok(plan)
}
