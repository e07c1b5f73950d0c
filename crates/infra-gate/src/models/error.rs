use actix_web::http::StatusCode;
use actix_web::HttpResponse;

/// Body returned for requests that match no route.
///
/// The trailing newline is part of the contract; probes and smoke tests
/// compare the body byte for byte.
pub const NOT_FOUND_BODY: &str = "404 page not found\n";

/// Body returned when an upstream cannot be reached or completed against.
pub const BAD_GATEWAY_BODY: &str = "502 bad gateway\n";

/// Error types produced by the gate.
///
/// Request-scoped variants (`NoRoute`, `UpstreamUnavailable`) are converted
/// into HTTP responses and never escape the request that produced them.
/// Lifecycle variants (`ListenerBind`, `ShutdownTimeout`, `ConfigInvalid`,
/// `ConfigMissing`) are fatal: the binary logs them and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Route registration rejected because the upstream URL does not parse
    /// as an absolute `http`/`https` URL with a non-empty host.
    #[error("invalid upstream URL '{url}': {reason}")]
    InvalidUpstream {
        /// The upstream string as supplied by the caller
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Lookup or removal of an identifier that is not in the table.
    #[error("route not found: {id}")]
    NotFound {
        /// The identifier that was requested
        id: String,
    },

    /// The request matched no configured route.
    #[error("no route matches the request")]
    NoRoute,

    /// The adapter could not reach, or could not complete against, the
    /// upstream for the named route.
    #[error("upstream unavailable for route {route_id}: {message}")]
    UpstreamUnavailable {
        /// Identifier of the route whose upstream failed
        route_id: String,
        /// Transport-level failure description
        message: String,
    },

    /// One of the two listeners could not be bound at startup.
    #[error("failed to bind {listener} listener on {addr}: {message}")]
    ListenerBind {
        /// Which listener failed (`data` or `management`)
        listener: &'static str,
        /// The address that could not be bound
        addr: String,
        /// The underlying I/O error
        message: String,
    },

    /// A listener terminated on its own while the gate was serving.
    #[error("{listener} listener terminated unexpectedly: {message}")]
    ListenerFailed {
        /// Which listener died (`data` or `management`)
        listener: &'static str,
        /// What the server future reported
        message: String,
    },

    /// The drain deadline elapsed with requests still in flight.
    #[error("shutdown deadline elapsed with requests still in flight")]
    ShutdownTimeout,

    /// The configuration file parsed but failed validation.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// The configuration file could not be found.
    #[error("configuration file missing: {0}")]
    ConfigMissing(String),
}

impl actix_web::error::ResponseError for GateError {
    fn status_code(&self) -> StatusCode {
        match self {
            GateError::InvalidUpstream { .. } => StatusCode::BAD_REQUEST,
            GateError::NotFound { .. } | GateError::NoRoute => StatusCode::NOT_FOUND,
            GateError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            GateError::NoRoute => HttpResponse::NotFound()
                .content_type("text/plain; charset=utf-8")
                .body(NOT_FOUND_BODY),
            GateError::UpstreamUnavailable { .. } => HttpResponse::BadGateway()
                .content_type("text/plain; charset=utf-8")
                .body(BAD_GATEWAY_BODY),
            other => HttpResponse::build(other.status_code())
                .content_type("text/plain; charset=utf-8")
                .body(format!("{other}\n")),
        }
    }
}
