use crate::models::error::{GateError, NOT_FOUND_BODY};
use crate::services::acme::{challenge_token, ChallengeLookup};
use crate::services::metrics::{MetricsRegistry, NO_ROUTE_ID};
use crate::services::route_table::RouteTable;
use crate::utils::host::{normalize_host, request_host};

use actix_web::error::ResponseError;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::FutureExt;
use log::error;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// The data-plane entry point: match, proxy, record.
///
/// One dispatcher serves every inbound connection. It holds shared handles
/// to the route table, the metrics registry, and (when enabled) the ACME
/// challenge collaborator, so cloning it per worker is cheap.
///
/// Request flow:
///
/// ```text
/// request → ACME intercept? → match (read lock) → adapter → upstream
///                                   │ released before any I/O
///                                   └→ metrics on completion
/// ```
///
/// Every handled request moves exactly one counter: the route's request
/// counter on success, the `no-route` error counter when nothing matches,
/// or the route's error counter when the upstream fails or the handler
/// panics. Response time accumulates together with the request counter.
#[derive(Clone)]
pub struct RequestDispatcher {
    table: Arc<RouteTable>,
    metrics: Arc<MetricsRegistry>,
    challenges: Option<Arc<dyn ChallengeLookup>>,
}

impl RequestDispatcher {
    /// Creates a dispatcher over the gate's shared state. Passing `None`
    /// for `challenges` disables ACME interception entirely.
    pub fn new(
        table: Arc<RouteTable>,
        metrics: Arc<MetricsRegistry>,
        challenges: Option<Arc<dyn ChallengeLookup>>,
    ) -> Self {
        Self {
            table,
            metrics,
            challenges,
        }
    }

    /// Handles one data-plane request.
    ///
    /// Errors never escape this method; they are converted to an HTTP
    /// status plus a metric increment, and a panicking adapter is caught
    /// and surfaced as a 500.
    pub async fn handle_request(&self, req: HttpRequest, body: web::Bytes) -> HttpResponse {
        if let Some(challenges) = &self.challenges {
            if let Some(token) = challenge_token(req.path()) {
                return serve_challenge(challenges.as_ref(), token);
            }
        }

        let host = normalize_host(&request_host(&req));
        let Some((route, adapter)) = self.table.select(&host, req.path()) else {
            self.metrics.record_error(NO_ROUTE_ID);
            return GateError::NoRoute.error_response();
        };

        let started = Instant::now();
        let outcome = AssertUnwindSafe(adapter.forward(&req, body))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(response)) => {
                self.metrics.record_request(&route.id, started.elapsed());
                response
            }
            // The adapter's error sink already counted the failure.
            Ok(Err(err)) => err.error_response(),
            Err(_) => {
                error!("panic while proxying request for route {}", route.id);
                self.metrics.record_error(&route.id);
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("500 internal server error\n")
            }
        }
    }
}

/// Answers an intercepted challenge request. Unknown tokens answer 404
/// without consulting the route table.
fn serve_challenge(challenges: &dyn ChallengeLookup, token: &str) -> HttpResponse {
    match challenges.response_for(token) {
        Some(response) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(response),
        None => HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body(NOT_FOUND_BODY),
    }
}
