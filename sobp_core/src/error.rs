use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SobpError {
    /// A value lies outside the domain of the range-energy relation.
    #[error("domain error: {quantity} must be > 0, got {value}")]
    Domain { quantity: &'static str, value: f64 },
    /// A caller-supplied parameter is outside its valid interval.
    #[error("configuration error: {param}={value} ({reason})")]
    Config {
        param: &'static str,
        value: f64,
        reason: String,
    },
    /// The weight recursion produced an infeasible weight.
    #[error("numerical error: weight of beamlet {index} is {weight} ({reason})")]
    Numerical {
        index: usize,
        weight: f64,
        reason: String,
    },
}

impl SobpError {
    pub(crate) fn config(param: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::Config {
            param,
            value,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing maximum energy")]
    MissingEnergy,
    #[error("missing SOBP width (chi)")]
    MissingChi,
}

pub type Result<T> = std::result::Result<T, SobpError>;
