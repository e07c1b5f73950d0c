use crate::routes::json_response;
use crate::services::route_table::RouteTable;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tokio::time::{timeout, Duration};

/// Deadline for the table probe; a probe that cannot finish in time is
/// reported as unhealthy rather than left hanging.
const HEALTH_DEADLINE: Duration = Duration::from_secs(5);

/// Health probe for the gate.
///
/// Probes the route table under a five second deadline. A gate with no
/// routes cannot serve traffic, so an empty table answers 503; otherwise
/// the response is a small JSON document with a current timestamp.
///
/// # Response Format
///
/// ```json
/// {
///   "status": "healthy",
///   "timestamp": "2024-03-15T10:30:00+00:00"
/// }
/// ```
///
/// # Returns
///
/// - `200 OK` when at least one route is configured
/// - `503 Service Unavailable` with `no routes configured` when the table
///   is empty, or `health probe timed out` when the probe misses the
///   deadline
pub async fn health_check(table: web::Data<RouteTable>) -> HttpResponse {
    let table = table.clone();
    let probe = web::block(move || table.len());

    match timeout(HEALTH_DEADLINE, probe).await {
        Ok(Ok(0)) => HttpResponse::ServiceUnavailable()
            .content_type("text/plain; charset=utf-8")
            .body("no routes configured"),
        Ok(Ok(_)) => json_response(json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339(),
        })),
        Ok(Err(_)) | Err(_) => HttpResponse::ServiceUnavailable()
            .content_type("text/plain; charset=utf-8")
            .body("health probe timed out"),
    }
}
