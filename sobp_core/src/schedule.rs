//! Beamlet scheduler: ranges and energies spanning the SOBP width.

use sobp_config::MAX_BEAMLETS;

use crate::config::BeamletCfg;
use crate::error::{Result, SobpError};
use crate::range_energy::PowerLawParameters;

/// One discrete-energy beamlet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamletSpec {
    /// Position in delivery order; 0 is the most distal beamlet.
    pub index: usize,
    /// Range in cm.
    pub range: f64,
    /// Kinetic energy in MeV.
    pub energy: f64,
    /// Relative weight, set once the weights are solved.
    pub weight: Option<f64>,
}

/// Beamlets ordered distal to proximal (strictly decreasing range).
#[derive(Debug, Clone, PartialEq)]
pub struct SobpSchedule {
    beamlets: Vec<BeamletSpec>,
    chi: f64,
    max_energy: f64,
    max_range: f64,
    spacing: f64,
    model: PowerLawParameters,
}

impl SobpSchedule {
    pub fn beamlets(&self) -> &[BeamletSpec] {
        &self.beamlets
    }

    pub fn len(&self) -> usize {
        self.beamlets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beamlets.is_empty()
    }

    /// SOBP width as a fraction of the maximum range.
    pub fn chi(&self) -> f64 {
        self.chi
    }

    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }

    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    /// Effective spacing between neighbouring ranges, in cm.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn model(&self) -> &PowerLawParameters {
        &self.model
    }

    pub fn ranges(&self) -> Vec<f64> {
        self.beamlets.iter().map(|b| b.range).collect()
    }

    pub fn energies(&self) -> Vec<f64> {
        self.beamlets.iter().map(|b| b.energy).collect()
    }

    /// Solved weights, or `None` while any beamlet is still unweighted.
    pub fn weights(&self) -> Option<Vec<f64>> {
        self.beamlets.iter().map(|b| b.weight).collect()
    }

    /// Attach one weight per beamlet, in schedule order.
    pub fn with_weights(mut self, weights: &[f64]) -> Result<Self> {
        if weights.len() != self.beamlets.len() {
            return Err(SobpError::config(
                "weights",
                weights.len() as f64,
                format!("expected {} weights", self.beamlets.len()),
            ));
        }
        for (b, &w) in self.beamlets.iter_mut().zip(weights) {
            b.weight = Some(w);
        }
        Ok(self)
    }
}

/// Lay out beamlets over `[R_max * (1 - chi), R_max]`.
///
/// The requested spacing is honored unless it yields fewer than `nbeams`
/// beamlets; either way the width is divided evenly, so the effective spacing
/// never exceeds `delta` and both edges carry a beamlet.
pub fn schedule_beamlets(
    model: &PowerLawParameters,
    max_energy: f64,
    chi: f64,
    beamlets: &BeamletCfg,
) -> Result<SobpSchedule> {
    if !(max_energy.is_finite() && max_energy > 0.0) {
        return Err(SobpError::config(
            "energy",
            max_energy,
            "maximum energy must be > 0",
        ));
    }
    if !(chi.is_finite() && chi > 0.0 && chi <= 1.0) {
        return Err(SobpError::config("chi", chi, "width must be in (0, 1]"));
    }
    let delta = beamlets.delta;
    if !(delta.is_finite() && delta > 0.0) {
        return Err(SobpError::config("delta", delta, "spacing must be > 0"));
    }
    if beamlets.nbeams == 0 || beamlets.nbeams > MAX_BEAMLETS {
        return Err(SobpError::config(
            "nbeams",
            beamlets.nbeams as f64,
            format!("beamlet count must be in [1, {MAX_BEAMLETS}]"),
        ));
    }

    let max_range = model.range_of(max_energy)?;
    let width = chi * max_range;
    let intervals = (width / delta).ceil();
    if intervals >= MAX_BEAMLETS as f64 {
        return Err(SobpError::config(
            "delta",
            delta,
            format!("spacing too small for a {width:.3} cm width (>{MAX_BEAMLETS} beamlets)"),
        ));
    }
    let n = beamlets.nbeams.max(intervals as usize + 1).max(2);
    let last = (n - 1) as f64;

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let range = max_range * (1.0 - chi * (i as f64 / last));
        if let Some(prev) = out.last().map(|b: &BeamletSpec| b.range)
            && range >= prev
        {
            return Err(SobpError::config(
                "chi",
                chi,
                format!("width too narrow to separate {n} beamlets"),
            ));
        }
        let energy = model.energy_of(range)?;
        out.push(BeamletSpec {
            index: i,
            range,
            energy,
            weight: None,
        });
    }

    let spacing = width / last;
    tracing::debug!(
        n,
        max_range,
        spacing,
        requested_delta = delta,
        "beamlets scheduled"
    );

    Ok(SobpSchedule {
        beamlets: out,
        chi,
        max_energy,
        max_range,
        spacing,
        model: *model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(nbeams: usize, delta: f64) -> BeamletCfg {
        BeamletCfg { nbeams, delta }
    }

    #[test]
    fn edges_are_exact() {
        let m = PowerLawParameters::water(1.77).unwrap();
        let s = schedule_beamlets(&m, 200.0, 0.25, &cfg(19, 0.05)).unwrap();
        let r = s.ranges();
        assert_eq!(r[0], s.max_range());
        assert_eq!(*r.last().unwrap(), s.max_range() * (1.0 - 0.25));
        assert!(s.weights().is_none());
    }

    #[test]
    fn full_width_reaches_zero_range() {
        let m = PowerLawParameters::water(1.77).unwrap();
        let err = schedule_beamlets(&m, 100.0, 1.0, &cfg(5, 1.0)).unwrap_err();
        assert_eq!(
            err,
            SobpError::Domain {
                quantity: "range",
                value: 0.0
            }
        );
    }

    #[test]
    fn with_weights_checks_length() {
        let m = PowerLawParameters::water(1.5).unwrap();
        let s = schedule_beamlets(&m, 150.0, 0.3, &cfg(5, 0.5)).unwrap();
        assert!(s.clone().with_weights(&[1.0]).is_err());
        let solved = s.with_weights(&[1.0, 0.5, 0.4, 0.3, 0.9]).unwrap();
        assert_eq!(solved.weights().unwrap().len(), 5);
    }
}
