mod cli;
mod error_fmt;
mod plan;

use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::{Cli, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "sobp failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    // Held until return so buffered file logs are flushed before exit.
    let _log_guard = init_tracing(&cli, &cfg)?;

    let table = plan::load_table(&cli, &cfg)?;

    if cli.recommended {
        let text = if cli.json {
            format!("{}\n", plan::table_json(&table))
        } else {
            table.to_string()
        };
        return write_output(cli.output.as_deref(), &text);
    }

    let req = plan::build_request(&cli, &cfg, table)?;
    tracing::info!(
        energy = req.energy,
        chi = req.chi,
        p = ?req.p,
        nbeams = req.beamlets.nbeams,
        delta = req.beamlets.delta,
        method = cli.method.as_str(),
        "planning SOBP"
    );
    let plan = sobp_core::run(&req)?;
    tracing::info!(
        beamlets = plan.schedule.len(),
        p = plan.p,
        p_source = plan.p_source.as_str(),
        "SOBP schedule ready"
    );

    let text = if cli.json {
        format!(
            "{}\n",
            plan::plan_json(&plan, cli.method.as_str(), req.output.timing)
        )
    } else {
        plan.to_string()
    };
    write_output(cli.output.as_deref(), &text)
}

/// Typed config from `--config`, or built-in defaults when no file is given.
fn load_config(path: Option<&Path>) -> eyre::Result<sobp_config::Config> {
    let Some(path) = path else {
        return Ok(sobp_config::Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = sobp_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .map_err(|e| eyre::eyre!("invalid configuration in {}: {e}", path.display()))?;
    Ok(cfg)
}

fn write_output(path: Option<&Path>, text: &str) -> eyre::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, text).wrap_err_with(|| format!("write output {}", p.display()))?;
            tracing::info!(path = %p.display(), "schedule written");
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Console logs go to stderr so stdout carries only the schedule.
fn init_tracing(cli: &Cli, cfg: &sobp_config::Config) -> eyre::Result<Option<WorkerGuard>> {
    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone());
    let filter = match level {
        Some(l) => EnvFilter::try_new(&l).wrap_err_with(|| format!("invalid log level '{l}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let console_json = cli
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let console_text = (!cli.json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });

    let file_path = cli
        .log_file
        .clone()
        .or_else(|| cfg.logging.file.as_ref().map(PathBuf::from));
    let mut guard = None;
    let file_layer = match file_path {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("log file path has no file name: {}", path.display()))?;
            let appender = match cfg.logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, g) = tracing_appender::non_blocking(appender);
            guard = Some(g);
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_json)
        .with(console_text)
        .with(file_layer)
        .try_init();
    Ok(guard)
}
