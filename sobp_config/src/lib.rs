#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and recommended-p grid parsing for the SOBP generator.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section is optional; an empty file yields the built-in defaults.
//! - The recommended-p CSV loader enforces headers and checks that the rows
//!   form a complete grid over strictly increasing width and energy axes.
use serde::Deserialize;

/// Water coefficient of the range-energy power law, in cm / MeV^p.
pub const WATER_ALPHA: f64 = 2.2e-3;
/// Default minimum number of beamlets.
pub const DEFAULT_NBEAMS: usize = 19;
/// Default beamlet spacing in cm.
pub const DEFAULT_DELTA_CM: f64 = 0.05;
/// Upper bound on the number of beamlets a schedule may contain.
pub const MAX_BEAMLETS: usize = 10_000;

/// Recommended-p CSV schema.
///
/// Expected headers:
/// chi,energy_mev,p
///
/// Example:
/// chi,energy_mev,p
/// 0.15,50,1.72
/// 0.15,100,1.63
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RecommendedRow {
    pub chi: f64,
    pub energy_mev: f64,
    pub p: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Medium {
    /// Range-energy coefficient (cm / MeV^p)
    pub alpha: f64,
    /// Pin the range-energy exponent; when absent the SOBP `p` is used
    pub range_exponent: Option<f64>,
}

impl Default for Medium {
    fn default() -> Self {
        Self {
            alpha: WATER_ALPHA,
            range_exponent: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Beamlets {
    /// Minimum number of beamlets
    pub nbeams: usize,
    /// Beamlet spacing in cm; honored when it leads to more than `nbeams` beamlets
    pub delta: f64,
}

impl Default for Beamlets {
    fn default() -> Self {
        Self {
            nbeams: DEFAULT_NBEAMS,
            delta: DEFAULT_DELTA_CM,
        }
    }
}

/// How beamlet start times are spread over the time axis.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    /// One equal step per beamlet
    #[default]
    Uniform,
    /// Each step lasts in proportion to the beamlet weight
    Weighted,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Output {
    /// Length of the rendered time axis in ms; normalized times are scaled by it
    pub time_span_ms: f64,
    /// Time feature driving the beam energy
    pub energy_feature: String,
    /// Time feature driving the beamlet weight
    pub weight_feature: String,
    /// "uniform" (default) or "weighted"
    pub timing: Timing,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            time_span_ms: 1000.0,
            energy_feature: "BeamEnergy".to_string(),
            weight_feature: "BeamWeight".to_string(),
            timing: Timing::Uniform,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Recommended {
    /// Optional CSV replacing the built-in recommended-p grid
    pub csv: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub medium: Medium,
    #[serde(default)]
    pub beamlets: Beamlets,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub recommended: Recommended,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Recommended-p values over a (width fraction, maximum energy) grid.
///
/// `values[i][j]` is the exponent for `chis[i]` and `energies[j]`. Both axes are
/// strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedGrid {
    pub chis: Vec<f64>,
    pub energies: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

impl RecommendedGrid {
    /// Assemble a grid from one row per grid point, in any order.
    pub fn from_rows(rows: Vec<RecommendedRow>) -> eyre::Result<Self> {
        if rows.is_empty() {
            eyre::bail!("recommended grid requires at least one row");
        }
        for (idx, r) in rows.iter().enumerate() {
            if !(r.chi.is_finite() && r.chi > 0.0 && r.chi <= 1.0) {
                eyre::bail!("recommended row {idx}: chi must be in (0, 1], got {}", r.chi);
            }
            if !(r.energy_mev.is_finite() && r.energy_mev > 0.0) {
                eyre::bail!(
                    "recommended row {idx}: energy_mev must be > 0, got {}",
                    r.energy_mev
                );
            }
            if !(r.p.is_finite() && r.p > 0.0) {
                eyre::bail!("recommended row {idx}: p must be > 0, got {}", r.p);
            }
        }

        let axis = |key: fn(&RecommendedRow) -> f64| -> Vec<f64> {
            let mut v: Vec<f64> = rows.iter().map(key).collect();
            v.sort_by(f64::total_cmp);
            v.dedup();
            v
        };
        let chis = axis(|r| r.chi);
        let energies = axis(|r| r.energy_mev);

        let mut cells: Vec<Vec<Option<f64>>> = vec![vec![None; energies.len()]; chis.len()];
        for r in &rows {
            // Axes were built from these exact values, so the lookups cannot miss.
            let i = chis.partition_point(|&c| c < r.chi);
            let j = energies.partition_point(|&e| e < r.energy_mev);
            if cells[i][j].replace(r.p).is_some() {
                eyre::bail!(
                    "recommended grid has duplicate entry for chi={} energy_mev={}",
                    r.chi,
                    r.energy_mev
                );
            }
        }

        let mut values = Vec::with_capacity(chis.len());
        for (i, row) in cells.into_iter().enumerate() {
            let mut out = Vec::with_capacity(energies.len());
            for (j, cell) in row.into_iter().enumerate() {
                match cell {
                    Some(p) => out.push(p),
                    None => eyre::bail!(
                        "recommended grid is incomplete: missing chi={} energy_mev={}",
                        chis[i],
                        energies[j]
                    ),
                }
            }
            values.push(out);
        }

        Ok(Self {
            chis,
            energies,
            values,
        })
    }
}

impl TryFrom<Vec<RecommendedRow>> for RecommendedGrid {
    type Error = eyre::Report;
    fn try_from(rows: Vec<RecommendedRow>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl TryFrom<&[RecommendedRow]> for RecommendedGrid {
    type Error = eyre::Report;
    fn try_from(rows: &[RecommendedRow]) -> Result<Self, Self::Error> {
        Self::from_rows(rows.to_vec())
    }
}

pub fn load_recommended_csv(path: &std::path::Path) -> eyre::Result<RecommendedGrid> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open recommended CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["chi", "energy_mev", "p"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "recommended CSV must have headers 'chi,energy_mev,p', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<RecommendedRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    RecommendedGrid::try_from(rows)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Medium
        if !(self.medium.alpha.is_finite() && self.medium.alpha > 0.0) {
            eyre::bail!("medium.alpha must be > 0");
        }
        if let Some(p0) = self.medium.range_exponent
            && !(p0.is_finite() && p0 > 0.0)
        {
            eyre::bail!("medium.range_exponent must be > 0");
        }

        // Beamlets
        if self.beamlets.nbeams == 0 {
            eyre::bail!("beamlets.nbeams must be >= 1");
        }
        if self.beamlets.nbeams > MAX_BEAMLETS {
            eyre::bail!("beamlets.nbeams is unreasonably large (>{MAX_BEAMLETS})");
        }
        if !(self.beamlets.delta.is_finite() && self.beamlets.delta > 0.0) {
            eyre::bail!("beamlets.delta must be > 0");
        }

        // Output
        if !(self.output.time_span_ms.is_finite() && self.output.time_span_ms > 0.0) {
            eyre::bail!("output.time_span_ms must be > 0");
        }
        for (key, name) in [
            ("output.energy_feature", &self.output.energy_feature),
            ("output.weight_feature", &self.output.weight_feature),
        ] {
            if name.is_empty() {
                eyre::bail!("{key} must not be empty");
            }
            if name.chars().any(|c| c.is_whitespace() || c == '"' || c == '/') {
                eyre::bail!("{key} must not contain whitespace, quotes or '/'");
            }
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
