//! Type-state builder for `SobpRequest`.
//!
//! The builder enforces at compile time that the maximum energy and the SOBP
//! width are provided before `build()` is available. `try_build()` is always
//! available for dynamic checks.

use std::marker::PhantomData;

use crate::config::{BeamletCfg, MediumCfg, OutputCfg};
use crate::error::{BuildError, SobpError};
use crate::recommended::RecommendedTable;
use crate::weights::WeightMethod;

/// Validated inputs of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct SobpRequest {
    /// Maximum beam energy in MeV.
    pub energy: f64,
    /// SOBP width as a fraction of the maximum range.
    pub chi: f64,
    /// Power-law exponent; looked up in `table` when absent.
    pub p: Option<f64>,
    pub method: WeightMethod,
    pub medium: MediumCfg,
    pub beamlets: BeamletCfg,
    pub output: OutputCfg,
    pub table: RecommendedTable,
}

impl SobpRequest {
    /// Start building a request.
    pub fn builder() -> SobpRequestBuilder<Missing, Missing> {
        SobpRequestBuilder::default()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `SobpRequest`. All fields are validated on `build()`.
pub struct SobpRequestBuilder<E, C> {
    energy: Option<f64>,
    chi: Option<f64>,
    p: Option<f64>,
    method: WeightMethod,
    medium: Option<MediumCfg>,
    beamlets: Option<BeamletCfg>,
    output: Option<OutputCfg>,
    table: Option<RecommendedTable>,
    _e: PhantomData<E>,
    _c: PhantomData<C>,
}

impl Default for SobpRequestBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            energy: None,
            chi: None,
            p: None,
            method: WeightMethod::default(),
            medium: None,
            beamlets: None,
            output: None,
            table: None,
            _e: PhantomData,
            _c: PhantomData,
        }
    }
}

fn positive(param: &'static str, value: f64) -> Result<(), SobpError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SobpError::config(param, value, "must be positive and finite"))
    }
}

/// Single source of truth for request validation.
fn validate(req: &SobpRequest) -> Result<(), SobpError> {
    positive("energy", req.energy)?;
    if !(req.chi.is_finite() && req.chi > 0.0 && req.chi <= 1.0) {
        return Err(SobpError::config("chi", req.chi, "width must be in (0, 1]"));
    }
    if let Some(p) = req.p {
        positive("p", p)?;
    }
    positive("alpha", req.medium.alpha)?;
    if let Some(p0) = req.medium.range_exponent {
        positive("range_exponent", p0)?;
    }
    if req.beamlets.nbeams == 0 {
        return Err(SobpError::config("nbeams", 0.0, "must be >= 1"));
    }
    positive("delta", req.beamlets.delta)?;
    positive("time_span_ms", req.output.time_span_ms)?;
    Ok(())
}

impl<E, C> SobpRequestBuilder<E, C> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> eyre::Result<SobpRequest> {
        let energy = self
            .energy
            .ok_or_else(|| eyre::Report::new(BuildError::MissingEnergy))?;
        let chi = self
            .chi
            .ok_or_else(|| eyre::Report::new(BuildError::MissingChi))?;

        let req = SobpRequest {
            energy,
            chi,
            p: self.p,
            method: self.method,
            medium: self.medium.unwrap_or_default(),
            beamlets: self.beamlets.unwrap_or_default(),
            output: self.output.unwrap_or_default(),
            table: self.table.unwrap_or_default(),
        };
        validate(&req)?;
        Ok(req)
    }
}

/// Chainable setters that do not affect type-state.
impl<E, C> SobpRequestBuilder<E, C> {
    pub fn with_powerp(mut self, p: f64) -> Self {
        self.p = Some(p);
        self
    }
    /// `None` selects the recommended table.
    pub fn with_powerp_opt(mut self, p: Option<f64>) -> Self {
        self.p = p;
        self
    }
    pub fn with_method(mut self, method: WeightMethod) -> Self {
        self.method = method;
        self
    }
    pub fn with_medium(mut self, medium: MediumCfg) -> Self {
        self.medium = Some(medium);
        self
    }
    pub fn with_beamlets(mut self, beamlets: BeamletCfg) -> Self {
        self.beamlets = Some(beamlets);
        self
    }
    pub fn with_nbeams(mut self, nbeams: usize) -> Self {
        let mut b = self.beamlets.unwrap_or_default();
        b.nbeams = nbeams;
        self.beamlets = Some(b);
        self
    }
    pub fn with_delta(mut self, delta: f64) -> Self {
        let mut b = self.beamlets.unwrap_or_default();
        b.delta = delta;
        self.beamlets = Some(b);
        self
    }
    pub fn with_output(mut self, output: OutputCfg) -> Self {
        self.output = Some(output);
        self
    }
    pub fn with_recommended_table(mut self, table: RecommendedTable) -> Self {
        self.table = Some(table);
        self
    }
}

// Setters that advance type-state
impl<C> SobpRequestBuilder<Missing, C> {
    pub fn with_energy(self, energy: f64) -> SobpRequestBuilder<Set, C> {
        SobpRequestBuilder {
            energy: Some(energy),
            chi: self.chi,
            p: self.p,
            method: self.method,
            medium: self.medium,
            beamlets: self.beamlets,
            output: self.output,
            table: self.table,
            _e: PhantomData,
            _c: PhantomData,
        }
    }
}

impl<E> SobpRequestBuilder<E, Missing> {
    pub fn with_chi(self, chi: f64) -> SobpRequestBuilder<E, Set> {
        SobpRequestBuilder {
            energy: self.energy,
            chi: Some(chi),
            p: self.p,
            method: self.method,
            medium: self.medium,
            beamlets: self.beamlets,
            output: self.output,
            table: self.table,
            _e: PhantomData,
            _c: PhantomData,
        }
    }
}

impl SobpRequestBuilder<Set, Set> {
    /// Validate and build the request. Only available when energy and chi are set.
    pub fn build(self) -> eyre::Result<SobpRequest> {
        self.try_build()
    }
}
