//! End-to-end loading from files on disk.

use std::io::Write;

use exo_core::filter::apply;
use exo_core::{
    Column, CoreError, FilterParam, FilterState, NumericField, Threshold, count_by_year,
    load_path,
};
use tempfile::NamedTempFile;

const CATALOG: &str = "\
# Exoplanet catalog export
# Rows: 6
pl_name,hostname,disc_year,pl_eqt,pl_orbeccen,sy_dist,st_mass,st_rad,pl_orbsmax,pl_radj
Kepler-452 b,Kepler-452,2015,265,,551.727,1.04,1.11,1.046,0.142
TRAPPIST-1 e,TRAPPIST-1,2017,250,0.005,12.4299,0.09,0.12,0.02925,0.082
Proxima Cen b,Proxima Cen,2016,234,0.35,1.30119,0.12,0.14,0.04856,
\"HD 209458 b\",HD 209458,1999,1459,0.01,48.3016,1.23,1.2,0.04707,1.39
TOI-700 d,TOI-700,2020,269,0.032,31.1265,0.42,0.42,0.1633,0.104
mystery,unknown,,n/a,NaN,,,,,
";

fn write_catalog(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(text.as_bytes()).expect("write catalog");
    file.flush().expect("flush catalog");
    file
}

#[test]
fn loads_sorted_catalog_from_disk() {
    let file = write_catalog(CATALOG);
    let loaded = load_path(file.path()).unwrap();

    assert_eq!(loaded.rows, 6);
    assert!(loaded.missing_columns.is_empty());
    // Only "n/a" is a present-but-unusable cell; NaN and blanks are missing.
    assert_eq!(loaded.degraded_cells, 1);

    let names: Vec<_> = loaded.dataset.records().iter().map(|r| r.name()).collect();
    assert_eq!(
        names,
        vec![
            "HD 209458 b",
            "Kepler-452 b",
            "Proxima Cen b",
            "TRAPPIST-1 e",
            "TOI-700 d",
            "mystery"
        ]
    );
    assert_eq!(loaded.dataset.year_range(), Some((1999, 2020)));
}

#[test]
fn loaded_catalog_feeds_filter_and_histogram() {
    let file = write_catalog(CATALOG);
    let dataset = load_path(file.path()).unwrap().dataset;

    let counts = count_by_year(dataset.records());
    assert_eq!(counts.len(), 5);
    assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), 5);

    let mut state = FilterState::default();
    state
        .set(FilterParam::Threshold(Threshold::MaxEccentricity, 0.1))
        .unwrap();
    let kept: Vec<_> = apply(&dataset, &state)
        .iter()
        .map(|r| r.name().to_owned())
        .collect();
    assert_eq!(kept, vec!["HD 209458 b", "TRAPPIST-1 e", "TOI-700 d"]);

    let extent = dataset.extent(NumericField::PlanetRadius).unwrap();
    assert_eq!((extent.min, extent.max), (0.082, 1.39));
}

#[test]
fn header_only_file_loads_empty() {
    let file = write_catalog("pl_name,disc_year\n");
    let loaded = load_path(file.path()).unwrap();
    assert!(loaded.dataset.is_empty());
    assert_eq!(loaded.rows, 0);
    assert!(loaded.missing_columns.contains(&Column::PlanetRadius));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_path(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, CoreError::Io(_)));
}

#[test]
fn broken_quoting_reports_the_line() {
    let file = write_catalog("pl_name,disc_year\nok,2020\n\"broken,2021\n");
    match load_path(file.path()) {
        Err(CoreError::Table { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected table error, got {other:?}"),
    }
}

#[test]
fn latin1_bytes_degrade_without_losing_rows() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"pl_name,disc_year,pl_eqt\nTOI-700 d,2020,269\nCaf\xe9 b,2019,300\n")
        .unwrap();
    file.flush().unwrap();

    let loaded = load_path(file.path()).unwrap();
    assert_eq!(loaded.rows, 2);
    let names: Vec<_> = loaded.dataset.records().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Caf\u{fffd} b", "TOI-700 d"]);
    assert_eq!(loaded.dataset.records()[0].discovery_year(), Some(2019));
}
