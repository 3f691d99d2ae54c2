use chrono::NaiveDate;
use tempfile::TempDir;

use tracker_core::config::TrackerConfig;
use tracker_core::models::{DateRange, DeltaWarning, Granularity, HistoryFilter};
use tracker_core::ErrorKind;
use tracker_data::aggregator::ConsumptionEngine;
use tracker_data::store::ReadingStore;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn readings_survive_reopening_the_store() {
    let tmp = TempDir::new().expect("tempdir");
    let config = TrackerConfig::default();

    {
        let store = ReadingStore::in_dir(tmp.path(), &config);
        store.add_reading(d(2024, 1, 1), 1000.0).unwrap();
        store.add_reading(d(2024, 1, 15), 1075.5).unwrap();
    }

    let reopened = ReadingStore::in_dir(tmp.path(), &config);
    let readings = reopened.list_readings(None).unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[1].value, 1075.5);
}

#[test]
fn log_to_monthly_bill() {
    let tmp = TempDir::new().expect("tempdir");
    let config = TrackerConfig::default();
    let store = ReadingStore::in_dir(tmp.path(), &config);
    let engine = ConsumptionEngine::new(&config);

    store.add_reading(d(2024, 1, 1), 100.0).unwrap();
    store.add_reading(d(2024, 1, 20), 150.0).unwrap();
    store.add_reading(d(2024, 2, 3), 130.0).unwrap();
    store.add_reading(d(2024, 2, 25), 190.0).unwrap();

    let readings = store.list_readings(None).unwrap();
    let entries = engine.compute_consumption(&readings);
    let flagged: Vec<_> = entries.iter().filter_map(|e| e.warning).collect();
    assert_eq!(flagged, vec![DeltaWarning::NegativeDelta { delta: -20.0 }]);

    let buckets = engine.bucket_by(&readings, Granularity::Month);
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].total_units, 50.0);
    assert_eq!(buckets[0].total_cost, 600.0);
    assert_eq!(buckets[1].total_units, 40.0);
    assert_eq!(buckets[1].warnings, 1);
}

#[test]
fn inverted_custom_range_is_rejected_before_the_store() {
    let tmp = TempDir::new().expect("tempdir");
    let store = ReadingStore::in_dir(tmp.path(), &TrackerConfig::default());

    let err = DateRange::new(d(2024, 3, 1), d(2024, 2, 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    // Nothing was created on disk.
    assert!(!store.path().exists());
}

#[test]
fn history_filter_this_month_restricts_listing() {
    let tmp = TempDir::new().expect("tempdir");
    let store = ReadingStore::in_dir(tmp.path(), &TrackerConfig::default());
    store.add_reading(d(2024, 1, 31), 10.0).unwrap();
    store.add_reading(d(2024, 2, 1), 20.0).unwrap();
    store.add_reading(d(2024, 2, 29), 30.0).unwrap();
    store.add_reading(d(2024, 3, 1), 40.0).unwrap();

    let range = HistoryFilter::ThisMonth.to_range(d(2024, 2, 10));
    let values: Vec<f64> = store
        .list_readings(range.as_ref())
        .unwrap()
        .iter()
        .map(|r| r.value)
        .collect();
    assert_eq!(values, vec![20.0, 30.0]);
}

#[test]
fn reset_then_add_starts_a_fresh_log() {
    let tmp = TempDir::new().expect("tempdir");
    let store = ReadingStore::in_dir(tmp.path(), &TrackerConfig::default());
    store.add_reading(d(2024, 1, 1), 500.0).unwrap();

    assert_eq!(
        store.reset_all("wrong").unwrap_err().kind(),
        ErrorKind::Authorization
    );
    assert_eq!(store.list_readings(None).unwrap().len(), 1);

    store.reset_all("reset123").unwrap();
    assert!(store.list_readings(None).unwrap().is_empty());

    store.add_reading(d(2024, 2, 1), 0.0).unwrap();
    assert_eq!(store.list_readings(None).unwrap().len(), 1);
}
