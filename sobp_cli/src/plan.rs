//! Request assembly from CLI flags and config, and JSON rendering of results.

use std::path::Path;

use eyre::WrapErr;
use serde_json::{Value, json};
use sobp_core::{
    BeamletCfg, BuildError, MediumCfg, OutputCfg, RecommendedTable, SobpPlan, SobpRequest,
    TimingMode, WeightMethod,
};

use crate::cli::Cli;

/// Recommended-p grid: `--recommended-csv` first, then `[recommended].csv`, then built-in.
pub fn load_table(cli: &Cli, cfg: &sobp_config::Config) -> eyre::Result<RecommendedTable> {
    let path = cli
        .recommended_csv
        .as_deref()
        .or_else(|| cfg.recommended.csv.as_deref().map(Path::new));
    let Some(path) = path else {
        return Ok(RecommendedTable::builtin());
    };
    let grid = sobp_config::load_recommended_csv(path)?;
    let table = RecommendedTable::try_from(grid)
        .wrap_err_with(|| format!("recommended grid {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        chis = table.chis().len(),
        energies = table.energies().len(),
        "loaded recommended grid"
    );
    Ok(table)
}

/// Merge CLI overrides onto the config and build a validated request.
pub fn build_request(
    cli: &Cli,
    cfg: &sobp_config::Config,
    table: RecommendedTable,
) -> eyre::Result<SobpRequest> {
    let mut medium: MediumCfg = (&cfg.medium).into();
    if let Some(alpha) = cli.alpha {
        medium.alpha = alpha;
    }
    if cli.range_exponent.is_some() {
        medium.range_exponent = cli.range_exponent;
    }

    let mut beamlets: BeamletCfg = (&cfg.beamlets).into();
    if let Some(n) = cli.nbeams {
        beamlets.nbeams = n;
    }
    if let Some(d) = cli.delta {
        beamlets.delta = d;
    }

    let mut output: OutputCfg = (&cfg.output).into();
    if let Some(t) = cli.timing {
        output.timing = t.into();
    }

    let energy = cli
        .energy
        .ok_or_else(|| eyre::Report::new(BuildError::MissingEnergy))?;
    let chi = cli
        .chi
        .ok_or_else(|| eyre::Report::new(BuildError::MissingChi))?;

    SobpRequest::builder()
        .with_energy(energy)
        .with_chi(chi)
        .with_powerp_opt(cli.powerp)
        .with_method(WeightMethod::from(cli.method))
        .with_medium(medium)
        .with_beamlets(beamlets)
        .with_output(output)
        .with_recommended_table(table)
        .build()
}

/// JSON document describing a solved plan.
pub fn plan_json(plan: &SobpPlan, method: &str, timing: TimingMode) -> Value {
    let timing = match timing {
        TimingMode::Uniform => "uniform",
        TimingMode::Weighted => "weighted",
    };
    let times = plan.tracks.energy.times();
    let beamlets: Vec<Value> = plan
        .schedule
        .beamlets()
        .iter()
        .zip(&times)
        .map(|(b, t)| {
            json!({
                "index": b.index,
                "time_ms": t * plan.time_span_ms,
                "range_cm": b.range,
                "energy_mev": b.energy,
                "weight": b.weight,
            })
        })
        .collect();
    json!({
        "energy_mev": plan.schedule.max_energy(),
        "chi": plan.schedule.chi(),
        "p": plan.p,
        "p_source": plan.p_source.as_str(),
        "method": method,
        "timing": timing,
        "max_range_cm": plan.schedule.max_range(),
        "spacing_cm": plan.schedule.spacing(),
        "time_span_ms": plan.time_span_ms,
        "plateau_ripple": plan.plateau_ripple(),
        "beamlets": beamlets,
    })
}

/// JSON form of the recommended-p grid.
pub fn table_json(table: &RecommendedTable) -> Value {
    json!({
        "chi": table.chis(),
        "energy_mev": table.energies(),
        "p": table.values(),
    })
}
