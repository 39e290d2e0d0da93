use std::fs::File;
use std::io::Write;

use rstest::rstest;
use sobp_config::{RecommendedGrid, RecommendedRow, load_recommended_csv};
use tempfile::tempdir;

fn row(chi: f64, energy_mev: f64, p: f64) -> RecommendedRow {
    RecommendedRow { chi, energy_mev, p }
}

#[rstest]
fn grid_from_unordered_rows() {
    let rows = vec![
        row(0.3, 200.0, 1.56),
        row(0.2, 100.0, 1.68),
        row(0.3, 100.0, 1.67),
        row(0.2, 200.0, 1.60),
    ];
    let g = RecommendedGrid::from_rows(rows).unwrap();
    assert_eq!(g.chis, vec![0.2, 0.3]);
    assert_eq!(g.energies, vec![100.0, 200.0]);
    assert_eq!(g.values, vec![vec![1.68, 1.60], vec![1.67, 1.56]]);
}

#[rstest]
fn grid_rejects_duplicate_point() {
    let rows = vec![row(0.2, 100.0, 1.68), row(0.2, 100.0, 1.70)];
    let err = RecommendedGrid::from_rows(rows).expect_err("duplicate");
    assert!(format!("{err}").contains("duplicate entry"));
}

#[rstest]
fn grid_rejects_missing_point() {
    let rows = vec![
        row(0.2, 100.0, 1.68),
        row(0.2, 200.0, 1.60),
        row(0.3, 100.0, 1.67),
    ];
    let err = RecommendedGrid::from_rows(rows).expect_err("incomplete");
    assert!(format!("{err}").contains("incomplete"));
    assert!(format!("{err}").contains("energy_mev=200"));
}

#[rstest]
#[case(row(0.0, 100.0, 1.6), "chi must be in (0, 1]")]
#[case(row(1.5, 100.0, 1.6), "chi must be in (0, 1]")]
#[case(row(0.2, -5.0, 1.6), "energy_mev must be > 0")]
#[case(row(0.2, 100.0, 0.0), "p must be > 0")]
fn grid_rejects_out_of_domain_rows(#[case] r: RecommendedRow, #[case] needle: &str) {
    let err = RecommendedGrid::try_from(vec![r]).expect_err("out of domain");
    assert!(format!("{err}").contains(needle), "{err}");
}

#[rstest]
fn grid_rejects_empty_rows() {
    let rows: &[RecommendedRow] = &[];
    assert!(RecommendedGrid::try_from(rows).is_err());
}

#[rstest]
fn csv_loads_with_strict_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("p.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "chi,energy_mev,p").unwrap();
    writeln!(f, "0.2, 100, 1.68").unwrap();
    writeln!(f, "0.2, 200, 1.60").unwrap();
    writeln!(f, "0.4, 100, 1.68").unwrap();
    writeln!(f, "0.4, 200, 1.53").unwrap();
    drop(f);

    let g = load_recommended_csv(&path).unwrap();
    assert_eq!(g.chis, vec![0.2, 0.4]);
    assert_eq!(g.energies, vec![100.0, 200.0]);
    assert_eq!(g.values[1][1], 1.53);
}

#[rstest]
fn csv_rejects_bad_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("p.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "width,energy,p").unwrap();
    writeln!(f, "0.2,100,1.68").unwrap();
    drop(f);

    let err = load_recommended_csv(&path).expect_err("bad headers");
    assert!(
        format!("{err}")
            .to_lowercase()
            .contains("recommended csv must have headers")
    );
}

#[rstest]
fn csv_reports_row_number_of_bad_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("p.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "chi,energy_mev,p").unwrap();
    writeln!(f, "0.2,100,1.68").unwrap();
    writeln!(f, "0.3,abc,1.60").unwrap();
    drop(f);

    let err = load_recommended_csv(&path).expect_err("bad row");
    assert!(format!("{err}").contains("invalid CSV row 3"));
}

#[rstest]
fn csv_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_recommended_csv(&dir.path().join("nope.csv")).expect_err("missing");
    assert!(format!("{err}").contains("open recommended CSV"));
}

#[rstest]
fn shipped_table_is_a_complete_grid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../etc/p_table.csv");
    let g = load_recommended_csv(&path).expect("load shipped table");
    assert_eq!(g.chis, vec![0.15, 0.20, 0.25, 0.30, 0.35, 0.40]);
    assert_eq!(g.energies, vec![50.0, 100.0, 150.0, 200.0, 250.0]);
    assert_eq!(g.values[5][4], 1.48);
}
