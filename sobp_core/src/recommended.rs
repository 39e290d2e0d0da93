//! Recommended power-law exponents for protons in water.
//!
//! The built-in grid is indexed by SOBP width (fraction of the maximum range)
//! and maximum energy in MeV. Lookups interpolate linearly in width along each
//! energy column first, then linearly in energy across the resulting row.
//! Past the last axis value the last entry is held; before the first one there
//! is no entry and the lookup fails.

use std::fmt;

use crate::error::{Result, SobpError};

const CHIS: [f64; 6] = [0.15, 0.20, 0.25, 0.30, 0.35, 0.40];
const ENERGIES_MEV: [f64; 5] = [50.0, 100.0, 150.0, 200.0, 250.0];
const P_VALUES: [[f64; 5]; 6] = [
    [1.72, 1.63, 1.69, 1.62, 1.57],
    [1.71, 1.68, 1.68, 1.60, 1.56],
    [1.71, 1.68, 1.66, 1.58, 1.53],
    [1.71, 1.67, 1.66, 1.56, 1.52],
    [1.71, 1.68, 1.64, 1.54, 1.51],
    [1.73, 1.68, 1.62, 1.53, 1.48],
];

/// Exponent grid over (width fraction, maximum energy).
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedTable {
    chis: Vec<f64>,
    energies: Vec<f64>,
    /// `values[i][j]` belongs to `chis[i]`, `energies[j]`.
    values: Vec<Vec<f64>>,
}

impl Default for RecommendedTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RecommendedTable {
    /// The published calibration grid for water.
    pub fn builtin() -> Self {
        Self {
            chis: CHIS.to_vec(),
            energies: ENERGIES_MEV.to_vec(),
            values: P_VALUES.iter().map(|row| row.to_vec()).collect(),
        }
    }

    /// Build a table from strictly increasing axes and a complete value grid.
    pub fn new(chis: Vec<f64>, energies: Vec<f64>, values: Vec<Vec<f64>>) -> Result<Self> {
        let increasing = |axis: &[f64]| axis.windows(2).all(|w| w[0] < w[1]);
        if chis.is_empty() || !increasing(&chis) {
            return Err(SobpError::config(
                "recommended.chi",
                chis.first().copied().unwrap_or(f64::NAN),
                "width axis must be non-empty and strictly increasing",
            ));
        }
        if energies.is_empty() || !increasing(&energies) {
            return Err(SobpError::config(
                "recommended.energy",
                energies.first().copied().unwrap_or(f64::NAN),
                "energy axis must be non-empty and strictly increasing",
            ));
        }
        if values.len() != chis.len() || values.iter().any(|r| r.len() != energies.len()) {
            return Err(SobpError::config(
                "recommended.p",
                values.len() as f64,
                "value grid does not match the axes",
            ));
        }
        Ok(Self {
            chis,
            energies,
            values,
        })
    }

    pub fn chis(&self) -> &[f64] {
        &self.chis
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// Rows of the grid, one per width fraction.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Interpolated exponent for a maximum energy and SOBP width.
    pub fn lookup(&self, energy: f64, chi: f64) -> Result<f64> {
        if !energy.is_finite() {
            return Err(SobpError::config("energy", energy, "not a finite energy"));
        }
        if !chi.is_finite() {
            return Err(SobpError::config("chi", chi, "not a finite width"));
        }

        let mut row = Vec::with_capacity(self.energies.len());
        for j in 0..self.energies.len() {
            let column: Vec<f64> = self.values.iter().map(|r| r[j]).collect();
            match interpolate(&self.chis, &column, chi) {
                Some(v) => row.push(v),
                None => {
                    return Err(SobpError::config(
                        "chi",
                        chi,
                        format!(
                            "no recommended p below width {}; supply p explicitly",
                            self.chis[0]
                        ),
                    ));
                }
            }
        }

        interpolate(&self.energies, &row, energy).ok_or_else(|| {
            SobpError::config(
                "energy",
                energy,
                format!(
                    "no recommended p below {} MeV; supply p explicitly",
                    self.energies[0]
                ),
            )
        })
    }
}

/// Piecewise-linear interpolation of `values` over a strictly increasing `axis`.
///
/// Holds the last value past the end and returns `None` before the start.
pub fn interpolate(axis: &[f64], values: &[f64], x: f64) -> Option<f64> {
    let first = *axis.first()?;
    if x < first {
        return None;
    }
    let hi = axis.partition_point(|&a| a < x);
    if hi == axis.len() {
        return values.last().copied();
    }
    if axis[hi] == x || hi == 0 {
        return Some(values[hi]);
    }
    let lo = hi - 1;
    let t = (x - axis[lo]) / (axis[hi] - axis[lo]);
    Some(values[lo] + t * (values[hi] - values[lo]))
}

impl fmt::Display for RecommendedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6} |", "chi")?;
        for e in &self.energies {
            write!(f, " {e:>6.1}")?;
        }
        writeln!(f, "   (E_max in MeV)")?;
        for (chi, row) in self.chis.iter().zip(&self.values) {
            write!(f, "{chi:>6.2} |")?;
            for p in row {
                write!(f, " {p:>6.2}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
