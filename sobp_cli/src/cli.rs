//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Weight solver selection.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Method {
    /// Zero the plateau deviation at each beamlet's probe depth
    #[default]
    Recursive,
    /// Integrate the continuous power-law weight density per beamlet
    Analytical,
}

impl From<Method> for sobp_core::WeightMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::Recursive => sobp_core::WeightMethod::Recursive,
            Method::Analytical => sobp_core::WeightMethod::Analytical,
        }
    }
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Recursive => "recursive",
            Method::Analytical => "analytical",
        }
    }
}

/// Placement of beamlet start times.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Timing {
    /// One equal step per beamlet
    Uniform,
    /// Each energy step lasts in proportion to its weight
    Weighted,
}

impl From<Timing> for sobp_core::TimingMode {
    fn from(t: Timing) -> Self {
        match t {
            Timing::Uniform => sobp_core::TimingMode::Uniform,
            Timing::Weighted => sobp_core::TimingMode::Weighted,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sobp",
    version,
    about = "Spread-out Bragg peak beamlet schedule generator"
)]
pub struct Cli {
    /// Maximum beam energy in MeV
    #[arg(
        short = 'e',
        long,
        value_name = "MEV",
        allow_negative_numbers = true,
        required_unless_present = "recommended"
    )]
    pub energy: Option<f64>,

    /// SOBP width as a fraction of the maximum range, in (0, 1]
    #[arg(
        short = 'c',
        long,
        value_name = "FRACTION",
        allow_negative_numbers = true,
        required_unless_present = "recommended"
    )]
    pub chi: Option<f64>,

    /// Power-law exponent; interpolated from the recommended table when omitted
    #[arg(short = 'p', long, value_name = "P", allow_negative_numbers = true)]
    pub powerp: Option<f64>,

    /// Minimum number of beamlets (takes precedence over config)
    #[arg(short = 'n', long, value_name = "N")]
    pub nbeams: Option<usize>,

    /// Maximum beamlet spacing in cm (takes precedence over config)
    #[arg(long, value_name = "CM", allow_negative_numbers = true)]
    pub delta: Option<f64>,

    /// Print the recommended p table and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub recommended: bool,

    /// Pin the range-energy exponent (default: same as p)
    #[arg(long, value_name = "P0", allow_negative_numbers = true)]
    pub range_exponent: Option<f64>,

    /// Range-energy coefficient in cm / MeV^p
    #[arg(long, value_name = "ALPHA", allow_negative_numbers = true)]
    pub alpha: Option<f64>,

    /// Weight solver
    #[arg(long, value_enum, value_name = "METHOD", default_value_t = Method::Recursive)]
    pub method: Method,

    /// Beamlet start times (takes precedence over config; default uniform)
    #[arg(long, value_enum, value_name = "MODE")]
    pub timing: Option<Timing>,

    /// Path to config TOML (typed); built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Custom recommended-p grid CSV (strict header `chi,energy_mev,p`)
    #[arg(long, value_name = "FILE")]
    pub recommended_csv: Option<PathBuf>,

    /// Emit JSON instead of TOPAS text (and JSON log lines)
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); config or `warn` when omitted
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Write the schedule here instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
