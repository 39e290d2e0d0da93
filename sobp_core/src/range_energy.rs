//! Power-law range-energy relation `R(E) = alpha * E^p`.
//!
//! Ranges are in cm, energies in MeV. The relation is an approximation, so an
//! exponent outside the band fitted for protons in water is accepted; callers
//! can check `in_valid_band` and warn.

use crate::error::{Result, SobpError};

pub use sobp_config::WATER_ALPHA;

/// Exponents fitted for protons in water fall inside this band.
pub const P_VALID_BAND: (f64, f64) = (1.3, 1.8);

/// Fitted range-energy relation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawParameters {
    exponent: f64,
    alpha: f64,
}

impl PowerLawParameters {
    pub fn new(exponent: f64, alpha: f64) -> Result<Self> {
        if !(exponent.is_finite() && exponent > 0.0) {
            return Err(SobpError::config(
                "p",
                exponent,
                "exponent must be positive and finite",
            ));
        }
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(SobpError::config(
                "alpha",
                alpha,
                "coefficient must be positive and finite",
            ));
        }
        Ok(Self { exponent, alpha })
    }

    /// Water coefficient with the given exponent.
    pub fn water(exponent: f64) -> Result<Self> {
        Self::new(exponent, WATER_ALPHA)
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether the exponent lies in `P_VALID_BAND` (inclusive).
    pub fn in_valid_band(&self) -> bool {
        (P_VALID_BAND.0..=P_VALID_BAND.1).contains(&self.exponent)
    }

    /// Range in cm of a proton with the given kinetic energy.
    pub fn range_of(&self, energy: f64) -> Result<f64> {
        if !(energy.is_finite() && energy > 0.0) {
            return Err(SobpError::Domain {
                quantity: "energy",
                value: energy,
            });
        }
        Ok(self.alpha * energy.powf(self.exponent))
    }

    /// Kinetic energy in MeV of a proton with the given range.
    pub fn energy_of(&self, range: f64) -> Result<f64> {
        if !(range.is_finite() && range > 0.0) {
            return Err(SobpError::Domain {
                quantity: "range",
                value: range,
            });
        }
        Ok((range / self.alpha).powf(self.exponent.recip()))
    }
}
