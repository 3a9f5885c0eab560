// End-to-end pipeline runs against the in-memory provider:
//   scoring of a populated and an empty unit, degraded fetch paths, fatal aborts,
//   persisted artifacts and determinism.

mod common;

use common::{config, rect, MockProvider};
use walkability::{
    admin::{DISTRICT_LEVEL, UNIT_LEVELS},
    assign::UNKNOWN_DISTRICT,
    io::read_units_geojson,
    provider::AdminFeature,
    run, score_units, MetricBundle, PipelineError,
};

fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-6 }

#[test]
fn populated_and_empty_units_are_scored() {
    let dir = tempfile::tempdir().unwrap();
    let records = score_units(&MockProvider::default(), &config(dir.path())).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().map(|r| r.unit_id).collect::<Vec<_>>(), vec![0, 1]);

    let a = &records[0];
    assert_eq!((a.kelurahan.as_str(), a.kecamatan.as_str()), ("A", "Coblong"));
    assert!(close(a.metrics.raw.sidewalk_pct, 25.0), "{}", a.metrics.raw.sidewalk_pct);
    assert_eq!(a.metrics.raw.intersection_density, 0.0);
    assert!(close(a.metrics.raw.amenity_pct, 200.0 / 3.0), "{}", a.metrics.raw.amenity_pct);
    assert!(a.metrics.raw.avg_block_length > 200.0 && a.metrics.raw.avg_block_length < 250.0);
    assert_eq!(a.metrics.normalized.n_sidewalk, 100.0);
    assert_eq!(a.metrics.normalized.n_amenity, 100.0);
    assert!(a.metrics.score > 30.0 && a.metrics.score < 100.0, "{}", a.metrics.score);

    let b = &records[1];
    assert_eq!((b.kelurahan.as_str(), b.kecamatan.as_str()), ("B", UNKNOWN_DISTRICT));
    assert_eq!(b.metrics, MetricBundle::default());
}

#[test]
fn output_geometry_is_geographic() {
    let dir = tempfile::tempdir().unwrap();
    let records = score_units(&MockProvider::default(), &config(dir.path())).unwrap();
    let exterior = records[0].geometry.0[0].exterior();
    assert!(exterior.coords().all(|c| c.x.abs() < 1.0 && c.y.abs() < 1.0));
    assert!(exterior.coords().any(|c| close(c.x, 0.01) && close(c.y, 0.01)));
}

#[test]
fn run_writes_matching_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir.path().join("nested/output"));
    let output = run(&MockProvider::default(), &cfg).unwrap();

    assert_eq!(output.geojson_path, cfg.geojson_path());
    assert!(output.csv_path.exists());
    assert_eq!(output.svg_path.as_deref(), Some(cfg.svg_path().as_path()));

    let persisted = read_units_geojson(&output.geojson_path).unwrap();
    assert_eq!(persisted.len(), output.records.len());
    for (saved, record) in persisted.iter().zip(&output.records) {
        assert_eq!(saved.metrics, record.metrics);
        assert_eq!(saved.kelurahan, record.kelurahan);
    }

    let csv = std::fs::read_to_string(&output.csv_path).unwrap();
    assert_eq!(csv.lines().count(), output.records.len() + 1);
}

#[test]
fn amenity_failure_degrades_to_zero_access() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockProvider { fail_poi_polygon: true, fail_poi_place: true, ..MockProvider::default() };
    let records = score_units(&provider, &config(dir.path())).unwrap();
    assert!(records.iter().all(|r| r.metrics.raw.amenity_pct == 0.0));
    assert!(close(records[0].metrics.raw.sidewalk_pct, 25.0));
}

#[test]
fn amenity_query_falls_back_to_place_name() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockProvider { fail_poi_polygon: true, ..MockProvider::default() };
    let records = score_units(&provider, &config(dir.path())).unwrap();
    assert!(close(records[0].metrics.raw.amenity_pct, 200.0 / 3.0));
}

#[test]
fn missing_districts_label_units_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let mut provider = MockProvider::default();
    provider.admin.retain(|f| f.admin_level.as_deref() != Some(DISTRICT_LEVEL));
    let records = score_units(&provider, &config(dir.path())).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.kecamatan == UNKNOWN_DISTRICT));
}

#[test]
fn admin_failure_aborts_with_no_units() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockProvider { fail_admin: true, ..MockProvider::default() };
    let err = score_units(&provider, &config(dir.path())).unwrap_err();
    assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::NoUnits)));
}

#[test]
fn geocode_and_graph_failures_are_fatal() {
    let dir = tempfile::tempdir().unwrap();

    let provider = MockProvider { fail_geocode: true, ..MockProvider::default() };
    let err = score_units(&provider, &config(dir.path())).unwrap_err();
    assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::Geocode { .. })));

    let provider = MockProvider { fail_graph: true, ..MockProvider::default() };
    let err = run(&provider, &config(dir.path())).unwrap_err();
    assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::StreetGraph(_))));
    assert!(!dir.path().join("walkability_kelurahan.geojson").exists());
}

#[test]
fn repeated_names_are_disambiguated() {
    let dir = tempfile::tempdir().unwrap();
    let mut provider = MockProvider::default();
    provider.admin.push(AdminFeature {
        name: Some("A".into()),
        admin_level: Some(UNIT_LEVELS[1].into()),
        geometry: rect(0.011, 0.0, 0.014, 0.01).into(),
    });

    let output = run(&provider, &config(dir.path())).unwrap();
    let names = output.records.iter().map(|r| r.kelurahan.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["A", "B", "A (2)"]);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockProvider::default();

    let parallel = score_units(&provider, &config(dir.path())).unwrap();
    let again = score_units(&provider, &config(dir.path())).unwrap();
    let sequential = score_units(&provider, &walkability::PipelineConfig { parallel: false, ..config(dir.path()) }).unwrap();

    assert_eq!(parallel, again);
    assert_eq!(parallel, sequential);
}
