//! Beamlet weights for a flat SOBP plateau.
//!
//! Under the power-law range-energy relation the depth-dose of a single
//! beamlet with range `r` falls off as
//!
//! ```text
//! d(z) = (r - z)^(1/p - 1)    for z < r,    0 beyond the range.
//! ```
//!
//! Beamlets are processed distal to proximal. The most distal one is the
//! reference (`w_0 = 1`) and fixes the plateau level at the probe depth just
//! proximal of its peak. Each following beamlet `i` is the only new
//! contributor at its own probe depth `z_i`, so the weight that restores the
//! plateau there is linear and closed-form:
//!
//! ```text
//! w_i = (D_plateau - sum_{j<i} w_j d_j(z_i)) / d_i(z_i)
//! ```
//!
//! Probe depths sit halfway between neighbouring ranges; the most proximal
//! beamlet is probed half a spacing proximal of its own range.
//!
//! For `p > 1` the distal contributions shrink with distance, so every
//! residual deficit is positive. For `p < 1` they grow and the recursion
//! produces negative weights, which are reported and never clamped.
//!
//! `WeightMethod::Analytical` is the continuous closed form: the cumulative
//! weight delivered down to normalized depth `x` is `x^(1 - 1/p)`, and each
//! beamlet receives the increment over the depth interval it covers.

use crate::error::{Result, SobpError};
use crate::range_energy::P_VALID_BAND;

/// How beamlet weights are derived from the ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeightMethod {
    /// Zero the plateau deviation at each beamlet's probe depth.
    #[default]
    Recursive,
    /// Integrate the continuous power-law weight density per beamlet interval.
    Analytical,
}

/// Power-law Bragg curve shape for exponent `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BraggShape {
    falloff: f64,
}

impl BraggShape {
    pub fn new(p: f64) -> Self {
        Self {
            falloff: p.recip() - 1.0,
        }
    }

    /// Relative dose at `depth` of a unit-weight beamlet with range `range`.
    #[inline]
    pub fn dose(&self, range: f64, depth: f64) -> f64 {
        if depth < range {
            (range - depth).powf(self.falloff)
        } else {
            0.0
        }
    }
}

/// Summed dose of weighted beamlets at `depth`.
pub fn summed_dose(p: f64, ranges: &[f64], weights: &[f64], depth: f64) -> f64 {
    let shape = BraggShape::new(p);
    ranges
        .iter()
        .zip(weights)
        .map(|(&r, &w)| w * shape.dose(r, depth))
        .sum()
}

/// Depth at which beamlet `i` restores the plateau.
pub fn probe_depth(ranges: &[f64], i: usize) -> f64 {
    match ranges.get(i + 1) {
        Some(&next) => 0.5 * (ranges[i] + next),
        None if i > 0 => ranges[i] - 0.5 * (ranges[i - 1] - ranges[i]),
        None => ranges[i],
    }
}

/// Solve weights with the default recursive method.
pub fn solve_weights(p: f64, ranges: &[f64]) -> Result<Vec<f64>> {
    solve_weights_with(WeightMethod::default(), p, ranges)
}

/// Solve one weight per range (ranges strictly decreasing), scaled so `w_0 == 1`.
pub fn solve_weights_with(method: WeightMethod, p: f64, ranges: &[f64]) -> Result<Vec<f64>> {
    if !(p.is_finite() && p > 0.0) {
        return Err(SobpError::config(
            "p",
            p,
            "exponent must be positive and finite",
        ));
    }
    if !(P_VALID_BAND.0..=P_VALID_BAND.1).contains(&p) {
        tracing::warn!(
            p,
            band_lo = P_VALID_BAND.0,
            band_hi = P_VALID_BAND.1,
            "power-law exponent outside the fitted band for protons in water"
        );
    }
    check_ranges(ranges)?;
    if ranges.len() == 1 {
        return Ok(vec![1.0]);
    }

    let raw = match method {
        WeightMethod::Recursive => recursive(p, ranges),
        WeightMethod::Analytical => analytical(p, ranges),
    };

    let reference = raw[0];
    if !(reference.is_finite() && reference > 0.0) {
        return Err(SobpError::Numerical {
            index: 0,
            weight: reference,
            reason: "reference weight must be positive".to_string(),
        });
    }

    let weights: Vec<f64> = raw.iter().map(|w| w / reference).collect();
    for (index, &weight) in weights.iter().enumerate() {
        if !weight.is_finite() {
            return Err(SobpError::Numerical {
                index,
                weight,
                reason: "non-finite weight".to_string(),
            });
        }
        if weight < 0.0 {
            return Err(SobpError::Numerical {
                index,
                weight,
                reason: "negative weight; chi, delta, nbeams and p cannot form a flat SOBP"
                    .to_string(),
            });
        }
    }
    tracing::debug!(?method, n = weights.len(), "weights solved");
    Ok(weights)
}

fn check_ranges(ranges: &[f64]) -> Result<()> {
    if ranges.is_empty() {
        return Err(SobpError::config("ranges", 0.0, "no beamlets to weight"));
    }
    if let Some(&bad) = ranges.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
        return Err(SobpError::Domain {
            quantity: "range",
            value: bad,
        });
    }
    if let Some(w) = ranges.windows(2).find(|w| w[1] >= w[0]) {
        return Err(SobpError::config(
            "ranges",
            w[1],
            "ranges must be strictly decreasing",
        ));
    }
    Ok(())
}

fn recursive(p: f64, ranges: &[f64]) -> Vec<f64> {
    let shape = BraggShape::new(p);
    let plateau = shape.dose(ranges[0], probe_depth(ranges, 0));
    (1..ranges.len()).fold(vec![1.0], |mut weights, i| {
        let z = probe_depth(ranges, i);
        let delivered: f64 = weights
            .iter()
            .zip(ranges)
            .map(|(w, &r)| w * shape.dose(r, z))
            .sum();
        weights.push((plateau - delivered) / shape.dose(ranges[i], z));
        weights
    })
}

fn analytical(p: f64, ranges: &[f64]) -> Vec<f64> {
    let exponent = 1.0 - p.recip();
    let last = ranges.len() - 1;
    let distal = ranges[0];
    let width = distal - ranges[last];
    (0..=last)
        .scan(0.0, |delivered, i| {
            let edge = if i < last {
                0.5 * (ranges[i] + ranges[i + 1])
            } else {
                ranges[last]
            };
            let target = ((distal - edge) / width).powf(exponent);
            let w = target - *delivered;
            *delivered = target;
            Some(w)
        })
        .collect()
}
