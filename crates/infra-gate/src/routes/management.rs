//! Management-plane endpoints and wiring.
//!
//! The management listener is bound next to the data plane (data port plus
//! 1000) and exposes three read-only endpoints: `/health`, `/metrics`, and
//! `/routes`. Each path accepts GET only; other methods receive 405 from
//! the resource layer.

use crate::routes::{health, json_response, metrics};
use crate::services::route_table::RouteTable;

use actix_web::{web, HttpResponse};
use serde_json::json;

/// Lists the live routing table.
///
/// Routes are snapshot copies ordered by identifier; mutating state through
/// this endpoint is not possible, route registration belongs to the
/// orchestrator's internal API.
///
/// # Response Format
///
/// ```json
/// {
///   "routes": [
///     {
///       "id": "console",
///       "host": "",
///       "path_prefix": "/",
///       "upstream": "http://127.0.0.1:9000",
///       "created_at": "2024-03-15T10:30:00Z",
///       "updated_at": "2024-03-15T10:30:00Z"
///     }
///   ],
///   "count": 1
/// }
/// ```
pub async fn list_routes(table: web::Data<RouteTable>) -> HttpResponse {
    let routes = table.list();
    json_response(json!({
        "count": routes.len(),
        "routes": routes,
    }))
}

/// Registers the management-plane endpoints.
///
/// The caller provides the shared route table and metrics registry as app
/// data (`web::Data::from` over the gate's `Arc` handles).
pub fn configure_management(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::metrics_dump))
        .route("/routes", web::get().to(list_routes));
}
