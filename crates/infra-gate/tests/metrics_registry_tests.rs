//! Tests for the per-route counter registry.

use infra_gate::services::metrics::{MetricsRegistry, NO_ROUTE_ID};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn empty_registry_snapshots_empty_maps() {
    let metrics = MetricsRegistry::new();
    let snapshot = metrics.snapshot();
    assert!(snapshot.request_count.is_empty());
    assert!(snapshot.error_count.is_empty());
    assert!(snapshot.response_times.is_empty());
}

#[test]
fn request_recording_bumps_count_and_time_together() {
    let metrics = MetricsRegistry::new();
    metrics.record_request("api", Duration::from_millis(2));
    metrics.record_request("api", Duration::from_millis(3));
    metrics.record_request("console", Duration::from_nanos(1));

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.request_count.get("api"), Some(&2));
    assert_eq!(snapshot.request_count.get("console"), Some(&1));
    assert_eq!(snapshot.response_times.get("api"), Some(&5_000_000));
    assert_eq!(snapshot.response_times.get("console"), Some(&1));
    assert!(snapshot.error_count.is_empty());
}

#[test]
fn errors_count_separately_from_requests() {
    let metrics = MetricsRegistry::new();
    metrics.record_error("api");
    metrics.record_error("api");
    metrics.record_error(NO_ROUTE_ID);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.error_count.get("api"), Some(&2));
    assert_eq!(snapshot.error_count.get(NO_ROUTE_ID), Some(&1));
    assert!(snapshot.request_count.is_empty());
}

#[test]
fn snapshot_is_a_deep_copy() {
    let metrics = MetricsRegistry::new();
    metrics.record_request("api", Duration::from_millis(1));

    let mut snapshot = metrics.snapshot();
    snapshot.request_count.insert("api".to_string(), 999);
    snapshot.error_count.insert("fabricated".to_string(), 1);

    let fresh = metrics.snapshot();
    assert_eq!(fresh.request_count.get("api"), Some(&1));
    assert!(fresh.error_count.is_empty());
}

#[test]
fn snapshot_taken_before_traffic_stays_stale() {
    let metrics = MetricsRegistry::new();
    let before = metrics.snapshot();
    metrics.record_request("api", Duration::from_millis(1));
    assert!(before.request_count.is_empty());
}

#[test]
fn concurrent_increments_all_land() {
    let metrics = Arc::new(MetricsRegistry::new());
    let threads = 8;
    let per_thread = 500;

    let mut handles = Vec::new();
    for _ in 0..threads {
        let metrics = Arc::clone(&metrics);
        handles.push(thread::spawn(move || {
            for _ in 0..per_thread {
                metrics.record_request("api", Duration::from_nanos(10));
                metrics.record_error(NO_ROUTE_ID);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = metrics.snapshot();
    let expected = (threads * per_thread) as u64;
    assert_eq!(snapshot.request_count.get("api"), Some(&expected));
    assert_eq!(snapshot.error_count.get(NO_ROUTE_ID), Some(&expected));
    assert_eq!(snapshot.response_times.get("api"), Some(&(expected * 10)));
}
