#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Spread-out Bragg peak (SOBP) beamlet scheduling.
//!
//! Computes the energies and relative weights of discrete proton beamlets whose
//! summed depth-dose forms a flat plateau, and maps them onto time features for
//! an external Monte Carlo source.
//!
//! ## Architecture
//!
//! - **Range-energy model**: power law `R = alpha * E^p` (`range_energy`)
//! - **Recommended exponents**: calibration grid and interpolation (`recommended`)
//! - **Scheduler**: beamlet ranges and energies over the SOBP width (`schedule`)
//! - **Weight solver**: recursive flat-plateau weights (`weights`)
//! - **Emitter**: energy and weight time features, TOPAS text (`emitter`)
//! - **Runner**: the whole pipeline for one `SobpRequest` (`runner`)
//!
//! ```no_run
//! use sobp_core::SobpRequest;
//!
//! let req = SobpRequest::builder()
//!     .with_energy(150.0)
//!     .with_chi(0.3)
//!     .with_powerp(1.5)
//!     .build()?;
//! let plan = sobp_core::run(&req)?;
//! print!("{plan}");
//! # Ok::<(), eyre::Report>(())
//! ```

pub mod builder;
pub mod config;
pub mod conversions;
pub mod emitter;
pub mod error;
pub mod range_energy;
pub mod recommended;
pub mod runner;
pub mod schedule;
pub mod weights;

pub use builder::{Missing, SobpRequest, SobpRequestBuilder, Set};
pub use config::{BeamletCfg, MediumCfg, OutputCfg, TimingMode};
pub use emitter::{EmittedTracks, TimeFeatureTrack, TimePoint, emit, render_topas};
pub use error::{BuildError, SobpError};
pub use range_energy::{P_VALID_BAND, PowerLawParameters, WATER_ALPHA};
pub use recommended::RecommendedTable;
pub use runner::{PSource, SobpPlan, resolve_p, run};
pub use schedule::{BeamletSpec, SobpSchedule, schedule_beamlets};
pub use weights::{WeightMethod, solve_weights, solve_weights_with};
