use assert_cmd::prelude::*;
use rstest::rstest;
use std::process::Command;

fn last_json_line(bytes: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(bytes);
    let line = text
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .unwrap_or("")
        .to_string();
    assert!(!line.is_empty(), "no JSON line found; output was: {text}");
    serde_json::from_str(&line).expect("valid JSON")
}

/// Validate the JSON document of a successful run.
#[rstest]
fn json_success_schema() {
    let mut cmd = Command::cargo_bin("sobp").unwrap();
    cmd.args([
        "--json",
        "--log-level",
        "error",
        "-e",
        "150",
        "-c",
        "0.3",
        "-p",
        "1.5",
        "-n",
        "5",
        "--delta",
        "0.5",
    ]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = last_json_line(&out);

    for key in [
        "energy_mev",
        "chi",
        "p",
        "max_range_cm",
        "spacing_cm",
        "time_span_ms",
        "plateau_ripple",
    ] {
        assert!(
            v.get(key).and_then(|x| x.as_f64()).is_some(),
            "{key} should be a number"
        );
    }
    assert_eq!(v["p_source"], "user");
    assert_eq!(v["method"], "recursive");
    assert_eq!(v["timing"], "uniform");

    let beamlets = v["beamlets"].as_array().expect("beamlets array");
    assert_eq!(beamlets.len(), 5);
    assert_eq!(beamlets[0]["index"], 0);
    assert_eq!(beamlets[0]["weight"].as_f64(), Some(1.0));
    assert!((beamlets[0]["energy_mev"].as_f64().unwrap() - 150.0).abs() < 1e-9);

    let mut prev_range = f64::INFINITY;
    let mut prev_time = -1.0;
    for b in beamlets {
        let range = b["range_cm"].as_f64().unwrap();
        let time = b["time_ms"].as_f64().unwrap();
        assert!(range < prev_range);
        assert!(time > prev_time);
        assert!(b["weight"].as_f64().unwrap() >= 0.0);
        prev_range = range;
        prev_time = time;
    }
    assert!(v["plateau_ripple"].as_f64().unwrap() < 1e-9);
}

/// Weighted timing starts each beamlet at the weight delivered before it.
#[rstest]
fn json_weighted_timing() {
    let mut cmd = Command::cargo_bin("sobp").unwrap();
    cmd.args([
        "--json", "--timing", "weighted", "-e", "150", "-c", "0.3", "-p", "1.5", "-n", "5",
        "--delta", "0.5",
    ]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = last_json_line(&out);
    assert_eq!(v["timing"], "weighted");

    let beamlets = v["beamlets"].as_array().unwrap();
    let weights: Vec<f64> = beamlets
        .iter()
        .map(|b| b["weight"].as_f64().unwrap())
        .collect();
    let total: f64 = weights.iter().sum();
    let mut delivered = 0.0;
    for (b, w) in beamlets.iter().zip(&weights) {
        let expected = 1000.0 * delivered / total;
        assert!((b["time_ms"].as_f64().unwrap() - expected).abs() < 1e-9);
        delivered += w;
    }
}

#[rstest]
fn json_reports_recommended_source() {
    let mut cmd = Command::cargo_bin("sobp").unwrap();
    cmd.args(["--json", "-e", "200", "-c", "0.2"]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = last_json_line(&out);
    assert_eq!(v["p_source"], "recommended");
    assert!((v["p"].as_f64().unwrap() - 1.60).abs() < 1e-12);
}

#[rstest]
fn json_recommended_table() {
    let mut cmd = Command::cargo_bin("sobp").unwrap();
    cmd.args(["--json", "--recommended"]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = last_json_line(&out);
    assert_eq!(v["chi"].as_array().unwrap().len(), 6);
    assert_eq!(v["energy_mev"].as_array().unwrap().len(), 5);
    assert_eq!(v["p"][5][4].as_f64(), Some(1.48));
}

/// Errors in JSON mode carry a reason, details and a message on stderr.
#[rstest]
#[case(&["-e", "150", "-c", "0.3", "-p", "0.8", "-n", "5", "--delta", "0.5"], 4, "Numerical")]
#[case(&["-e", "150", "-c", "1", "-p", "1.5"], 3, "Domain")]
#[case(&["-e", "150", "-c", "0", "-p", "1.5"], 2, "Config")]
fn json_error_schema(#[case] args: &[&str], #[case] code: i32, #[case] reason: &str) {
    let mut cmd = Command::cargo_bin("sobp").unwrap();
    cmd.arg("--json").arg("--log-level").arg("off").args(args);

    let out = cmd.assert().code(code).get_output().stderr.clone();
    let v = last_json_line(&out);
    assert_eq!(v["reason"], reason);
    assert!(v.get("details").is_some());
    assert!(!v["message"].as_str().unwrap_or("").is_empty());
}
