//! Time features driving the external simulation source.
//!
//! Beamlets are mapped onto the normalized time axis `[0, 1)` in delivery
//! order. With `TimingMode::Uniform` beamlet `i` starts at `t_i = i / n`; with
//! `TimingMode::Weighted` it starts at the fraction of the total weight
//! delivered before it, so a step lasts in proportion to its weight.
//! `render_topas` writes the tracks as TOPAS step time features with times
//! scaled to milliseconds.

use std::fmt;

use crate::config::{OutputCfg, TimingMode};
use crate::error::{Result, SobpError};
use crate::schedule::SobpSchedule;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    /// Normalized time in `[0, 1)`.
    pub time: f64,
    pub value: f64,
}

/// Step-wise control sequence for one source parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFeatureTrack {
    /// Time feature name (`Tf/<name>`).
    pub name: String,
    /// Physical unit of the values; `None` for dimensionless values.
    pub unit: Option<&'static str>,
    pub points: Vec<TimePoint>,
}

impl TimeFeatureTrack {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.time).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Energy and weight tracks of one schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedTracks {
    pub energy: TimeFeatureTrack,
    pub weight: TimeFeatureTrack,
}

/// Map a solved schedule onto the energy and weight tracks.
pub fn emit(schedule: &SobpSchedule, output: &OutputCfg) -> Result<EmittedTracks> {
    if schedule.is_empty() {
        return Err(SobpError::config(
            "schedule",
            0.0,
            "cannot emit an empty schedule",
        ));
    }
    let mut weights = Vec::with_capacity(schedule.len());
    for (i, b) in schedule.beamlets().iter().enumerate() {
        let Some(w) = b.weight else {
            return Err(SobpError::config(
                "weight",
                i as f64,
                format!("beamlet {i} has no solved weight"),
            ));
        };
        weights.push(w);
    }

    let times = start_times(&weights, output.timing)?;
    let energy = schedule
        .beamlets()
        .iter()
        .zip(&times)
        .map(|(b, &time)| TimePoint {
            time,
            value: b.energy,
        })
        .collect();
    let weight = weights
        .iter()
        .zip(&times)
        .map(|(&value, &time)| TimePoint { time, value })
        .collect();

    Ok(EmittedTracks {
        energy: TimeFeatureTrack {
            name: output.energy_feature.clone(),
            unit: Some("MeV"),
            points: energy,
        },
        weight: TimeFeatureTrack {
            name: output.weight_feature.clone(),
            unit: None,
            points: weight,
        },
    })
}

/// Normalized start time of each beamlet, strictly increasing in `[0, 1)`.
pub fn start_times(weights: &[f64], timing: TimingMode) -> Result<Vec<f64>> {
    let n = weights.len() as f64;
    match timing {
        TimingMode::Uniform => Ok((0..weights.len()).map(|i| i as f64 / n).collect()),
        TimingMode::Weighted => {
            if let Some((i, &w)) = weights
                .iter()
                .enumerate()
                .find(|(_, w)| !(w.is_finite() && **w > 0.0))
            {
                return Err(SobpError::config(
                    "timing",
                    w,
                    format!("weighted timing needs positive weights; beamlet {i} has {w}"),
                ));
            }
            let total: f64 = weights.iter().sum();
            Ok(weights
                .iter()
                .scan(0.0, |delivered, &w| {
                    let t = *delivered / total;
                    *delivered += w;
                    Some(t)
                })
                .collect())
        }
    }
}

/// Values shown in the comment header of the rendered text.
#[derive(Debug, Clone, Copy)]
pub struct RenderHeader {
    pub max_energy: f64,
    pub chi: f64,
    pub p: f64,
}

/// Write both tracks as TOPAS step time features.
pub fn render_topas<W: fmt::Write>(
    out: &mut W,
    header: &RenderHeader,
    tracks: &EmittedTracks,
    time_span_ms: f64,
) -> fmt::Result {
    writeln!(out, "# SOBP time features (0 to {time_span_ms} ms)")?;
    writeln!(out, "# Energy = {:.1} MeV", header.max_energy)?;
    writeln!(out, "# Width  = {:.2}", header.chi)?;
    writeln!(out, "# p      = {:.3}", header.p)?;
    render_track(out, &tracks.energy, time_span_ms, 3)?;
    render_track(out, &tracks.weight, time_span_ms, 6)
}

const MAX_TIME_DECIMALS: usize = 15;

/// Decimals needed so neighbouring times, and the last time and the span,
/// stay distinct after rounding.
fn time_decimals(times_ms: &[f64], time_span_ms: f64) -> usize {
    let min_gap = times_ms
        .windows(2)
        .map(|w| w[1] - w[0])
        .chain(times_ms.last().map(|&t| time_span_ms - t))
        .fold(f64::INFINITY, f64::min);
    if !(min_gap.is_finite() && min_gap > 0.0) {
        return 1;
    }
    let digits = (-min_gap.log10()).ceil() + 1.0;
    (digits.max(1.0) as usize).min(MAX_TIME_DECIMALS)
}

fn render_track<W: fmt::Write>(
    out: &mut W,
    track: &TimeFeatureTrack,
    time_span_ms: f64,
    precision: usize,
) -> fmt::Result {
    let n = track.len();
    let times_ms: Vec<f64> = track.points.iter().map(|p| p.time * time_span_ms).collect();
    let decimals = time_decimals(&times_ms, time_span_ms);
    writeln!(out, "s:Tf/{}/Function = \"Step\"", track.name)?;
    write!(out, "dv:Tf/{}/Times = {n}", track.name)?;
    for t in &times_ms {
        write!(out, " {t:.decimals$}")?;
    }
    writeln!(out, " ms")?;
    match track.unit {
        Some(_) => write!(out, "dv:Tf/{}/Values = {n}", track.name)?,
        None => write!(out, "uv:Tf/{}/Values = {n}", track.name)?,
    }
    for p in &track.points {
        write!(out, " {:.*}", precision, p.value)?;
    }
    match track.unit {
        Some(unit) => writeln!(out, " {unit}"),
        None => writeln!(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_grow_with_point_density() {
        assert_eq!(time_decimals(&[0.0, 200.0, 400.0], 600.0), 1);
        assert_eq!(time_decimals(&[0.0, 0.5], 1.0), 2);
        assert_eq!(time_decimals(&[0.0, 0.04, 0.08], 0.12), 3);
        assert_eq!(time_decimals(&[0.0], 1000.0), 1);
    }

    #[test]
    fn weighted_start_times_follow_cumulative_weight() {
        let t = start_times(&[2.0, 1.0, 1.0], TimingMode::Weighted).unwrap();
        assert_eq!(t, vec![0.0, 0.5, 0.75]);
        let t = start_times(&[2.0, 1.0, 1.0], TimingMode::Uniform).unwrap();
        assert_eq!(t[1], 1.0 / 3.0);
    }

    #[test]
    fn weighted_timing_rejects_zero_weight() {
        let err = start_times(&[1.0, 0.0, 0.0], TimingMode::Weighted).unwrap_err();
        assert!(matches!(err, SobpError::Config { param: "timing", .. }));
    }
}
