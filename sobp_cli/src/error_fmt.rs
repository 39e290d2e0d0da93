//! Human-readable error descriptions, exit codes and structured JSON errors.

use sobp_core::error::{BuildError, SobpError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingEnergy => {
                "What happened: Maximum energy not set.\nLikely causes: The CLI did not pass --energy.\nHow to fix: Provide the maximum beam energy in MeV (e.g., `sobp -e 150 -c 0.3`).".to_string()
            }
            BuildError::MissingChi => {
                "What happened: SOBP width not set.\nLikely causes: The CLI did not pass --chi.\nHow to fix: Provide the width as a fraction of the maximum range (e.g., `sobp -e 150 -c 0.3`).".to_string()
            }
        };
    }

    if let Some(se) = err.downcast_ref::<SobpError>() {
        return match se {
            SobpError::Domain { quantity, value } => format!(
                "What happened: {quantity} = {value} has no meaning under the range-energy power law.\nLikely causes: chi = 1 puts the proximal beamlet at zero range, or energy/alpha are not positive.\nHow to fix: Use chi < 1 and a positive energy."
            ),
            SobpError::Config {
                param,
                value,
                reason,
            } if *param == "chi" || *param == "energy" => format!(
                "What happened: Invalid {param} = {value} ({reason}).\nLikely causes: Value outside its interval, or below the recommended table when p is omitted.\nHow to fix: Use 0 < chi <= 1 and energy > 0, or pass --powerp explicitly."
            ),
            SobpError::Config {
                param,
                value,
                reason,
            } => format!(
                "What happened: Invalid {param} = {value} ({reason}).\nLikely causes: Out-of-range flag or config value.\nHow to fix: Check `{param}` on the command line and in the config file, then rerun."
            ),
            SobpError::Numerical {
                index,
                weight,
                reason,
            } => format!(
                "What happened: Beamlet {index} would need weight {weight} ({reason}).\nLikely causes: p below 1, or a width too narrow for delta/nbeams.\nHow to fix: Use p in [1.3, 1.8] or omit --powerp to use the recommended value."
            ),
        };
    }

    // String-based heuristics for errors coming from config files
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("recommended csv must have headers") {
        return "Invalid headers in recommended CSV. Expected 'chi,energy_mev,p'.".to_string();
    }

    if lower.contains("recommended grid") || lower.contains("recommended row") {
        return format!(
            "What happened: The recommended-p grid is unusable ({msg}).\nLikely causes: Missing or duplicate grid points, or out-of-range values.\nHow to fix: Provide one row per (chi, energy_mev) pair with p > 0."
        );
    }

    if lower.contains("invalid configuration") || lower.contains("parse config") {
        let detail = err.source().map_or_else(|| msg.clone(), |s| s.to_string());
        return format!(
            "What happened: Configuration is invalid or incomplete ({detail}).\nLikely causes: Unknown keys, wrong types, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 config (and builder) errors, 3 domain, 4 numerical, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(se) = err.downcast_ref::<SobpError>() {
        return match se {
            SobpError::Config { .. } => 2,
            SobpError::Domain { .. } => 3,
            SobpError::Numerical { .. } => 4,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(se) = err.downcast_ref::<SobpError>() {
        return match se {
            SobpError::Config { .. } => "Config",
            SobpError::Domain { .. } => "Domain",
            SobpError::Numerical { .. } => "Numerical",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    let obj = match err.downcast_ref::<SobpError>() {
        Some(SobpError::Config { param, value, .. }) => json!({
            "reason": reason_name(err),
            "details": { "param": param, "value": value },
            "message": msg,
        }),
        Some(SobpError::Domain { quantity, value }) => json!({
            "reason": reason_name(err),
            "details": { "quantity": quantity, "value": value },
            "message": msg,
        }),
        Some(SobpError::Numerical { index, weight, .. }) => json!({
            "reason": reason_name(err),
            "details": { "index": index, "weight": weight },
            "message": msg,
        }),
        None => json!({ "reason": reason_name(err), "message": msg }),
    };
    obj.to_string()
}
