use news_score::catalog::{
    load_catalog, save_catalog, standard_ranges, CatalogError, NewRange, RangeCatalog,
    RangeRepository,
};
use news_score::scoring::{check_request, Measurement, ScoreEngine, ValidationErrorKind};
use std::sync::Arc;

fn seeded() -> RangeCatalog {
    RangeCatalog::with_ranges(standard_ranges()).unwrap()
}

fn m(measurement_type: &str, value: f64) -> Measurement {
    Measurement::new(measurement_type, value)
}

#[tokio::test]
async fn reference_table_scores_mixed_vitals() {
    let result = ScoreEngine::default()
        .calculate(&[m("TEMP", 37.0), m("HR", 60.0), m("RR", 5.0)], &seeded(), None)
        .await
        .unwrap();
    assert_eq!(result.total_score, 3);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn lower_bound_of_first_range_is_out_of_range() {
    let result = ScoreEngine::default()
        .calculate(&[m("TEMP", 31.0)], &seeded(), None)
        .await
        .unwrap();
    assert_eq!(result.total_score, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, ValidationErrorKind::OutOfRange);
    assert_eq!(result.errors[0].invalid_value, 31.0);
    assert!(!result.errors[0].available_ranges.is_empty());
}

#[tokio::test]
async fn every_range_matches_its_max_but_not_its_min() {
    let catalog = seeded();
    for range in catalog.list_all().unwrap() {
        let at_max = catalog
            .lookup(&range.measurement_type, range.max_value)
            .await
            .unwrap();
        assert_eq!(at_max.map(|r| r.id), Some(range.id));

        let at_min = catalog
            .lookup(&range.measurement_type, range.min_value)
            .await
            .unwrap();
        assert_ne!(at_min.map(|r| r.id), Some(range.id));
    }
}

#[tokio::test]
async fn total_is_order_independent_but_errors_keep_input_order() {
    let catalog = seeded();
    let engine = ScoreEngine::default();
    let forward = [m("TEMP", 50.0), m("HR", 120.0), m("RR", 2.0), m("TEMP", 34.0)];
    let mut backward = forward.clone();
    backward.reverse();

    let a = engine.calculate(&forward, &catalog, None).await.unwrap();
    let b = engine.calculate(&backward, &catalog, None).await.unwrap();

    assert_eq!(a.total_score, b.total_score);
    assert_eq!(a.total_score, 5);
    let a_types: Vec<_> = a.errors.iter().map(|e| e.measurement_type.as_str()).collect();
    let b_types: Vec<_> = b.errors.iter().map(|e| e.measurement_type.as_str()).collect();
    assert_eq!(a_types, vec!["TEMP", "RR"]);
    assert_eq!(b_types, vec!["RR", "TEMP"]);
}

#[test]
fn overlapping_temperature_range_is_rejected() {
    let catalog = seeded();
    let err = catalog.add(NewRange::new("TEMP", 34.0, 37.0, 2)).unwrap_err();
    assert!(matches!(err, CatalogError::Overlap { .. }));
    assert!(err.to_string().contains("(31, 35]"));
}

#[test]
fn request_policy_requires_default_types() {
    let required = vec!["TEMP".to_string(), "HR".to_string(), "RR".to_string()];
    assert!(check_request(&[m("temp", 37.0), m("hr", 60.0), m("rr", 12.0)], &required).is_ok());
    assert!(check_request(&[m("TEMP", 37.0)], &required).is_err());
}

#[tokio::test]
async fn scoring_runs_alongside_catalog_writes() {
    let catalog = Arc::new(seeded());
    let engine = Arc::new(ScoreEngine::default());

    let mut tasks = Vec::new();
    for i in 0..16 {
        let catalog = Arc::clone(&catalog);
        let engine = Arc::clone(&engine);
        tasks.push(tokio::spawn(async move {
            if i % 4 == 0 {
                // writers race for the same slot; at most one can win
                let _ = catalog.add(NewRange::new("SPO2", 0.0, 91.0, 3));
            }
            engine
                .calculate(&[m("TEMP", 37.0), m("HR", 60.0), m("RR", 5.0)], &*catalog, None)
                .await
                .unwrap()
        }));
    }

    let results = futures::future::join_all(tasks).await;
    for result in results {
        assert_eq!(result.unwrap().total_score, 3);
    }
    assert_eq!(catalog.ranges_of("SPO2").unwrap().len(), 1);
}

#[test]
fn persisted_catalog_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranges.json");
    save_catalog(&path, &seeded()).unwrap();

    let loaded = load_catalog(&path).unwrap();
    assert_eq!(loaded.list_all().unwrap(), seeded().list_all().unwrap());
}
