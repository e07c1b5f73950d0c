use crate::routes::json_response;
use crate::services::metrics::MetricsRegistry;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

/// Counter dump for the management plane.
///
/// Returns a deep snapshot of the registry, so the maps in the response are
/// a consistent cut across request counts, error counts, and accumulated
/// response times. Keys are route identifiers (plus `no-route` for
/// unmatched requests); response times are total nanoseconds, left to
/// consumers to turn into averages.
///
/// # Response Format
///
/// ```json
/// {
///   "request_count": {"console": 42},
///   "error_count": {"no-route": 3},
///   "response_times": {"console": 180000000},
///   "timestamp": "2024-03-15T10:30:00+00:00"
/// }
/// ```
pub async fn metrics_dump(metrics: web::Data<MetricsRegistry>) -> HttpResponse {
    let snapshot = metrics.snapshot();
    json_response(json!({
        "request_count": snapshot.request_count,
        "error_count": snapshot.error_count,
        "response_times": snapshot.response_times,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
