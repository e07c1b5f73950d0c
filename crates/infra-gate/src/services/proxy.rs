use crate::models::error::GateError;
use crate::services::metrics::MetricsRegistry;
use crate::utils::host::request_host;

use actix_web::http::{Method as ActixMethod, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, warn};
use reqwest::header::{HeaderMap as ReqwestHeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method as ReqwestMethod, Url};
use std::sync::Arc;
use tokio::time::{timeout, Duration};

/// How long a single upstream exchange may take before the adapter gives
/// up and reports the upstream unavailable. No retries follow.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Hop-by-hop and gate-owned headers that are never copied to the upstream
/// request. The forwarded trio is overwritten by the gate because it treats
/// itself as the trust boundary for that metadata.
const SKIP_REQUEST_HEADERS: &[&str] = &[
    "host",
    "connection",
    "proxy-connection",
    "keep-alive",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
    "x-forwarded-proto",
    "x-forwarded-host",
    "x-real-ip",
];

/// Headers dropped from the upstream response; the body is re-framed by the
/// gate's own server, so transport framing must not be forwarded.
const SKIP_RESPONSE_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "transfer-encoding",
    "content-length",
];

/// Builds the shared outbound HTTP client for all adapters.
///
/// Connections are pooled per upstream host (keep-alive), and redirects are
/// never followed; the client receives upstream redirects verbatim.
pub fn build_outbound_client() -> Client {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(32)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Validates an upstream base URL at registration time.
///
/// # Errors
///
/// Returns `GateError::InvalidUpstream` when the string does not parse as
/// an absolute URL, when the scheme is neither `http` nor `https`, or when
/// the host is empty.
pub fn parse_upstream(raw: &str) -> Result<Url, GateError> {
    let url = Url::parse(raw).map_err(|e| GateError::InvalidUpstream {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(GateError::InvalidUpstream {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            })
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(GateError::InvalidUpstream {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// Per-route reverse-proxy adapter.
///
/// One adapter exists for every live route; the route table creates it
/// together with the route and discards it when the route is removed or its
/// upstream changes. Adapters are immutable after construction, so a caller
/// that obtained one under the table's read lock may release the lock and
/// keep forwarding through it safely.
///
/// For each request the adapter rewrites the target URL onto the upstream
/// (prepending the upstream's base path to the client path), lets the
/// outbound client derive `Host` from the upstream authority, overwrites
/// the forwarded-for trio, and streams back the upstream response. Upstream
/// failures go through the adapter's error sink: the route's error counter
/// is bumped and the caller receives `UPSTREAM_UNAVAILABLE`, rendered as a
/// plain-text 502.
pub struct ProxyAdapter {
    route_id: String,
    client: Client,
    scheme: String,
    authority: String,
    base_path: String,
    metrics: Arc<MetricsRegistry>,
}

impl ProxyAdapter {
    /// Creates an adapter for one route.
    ///
    /// `upstream` must already have passed [`parse_upstream`].
    pub fn new(
        route_id: &str,
        upstream: &Url,
        client: Client,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        let host = upstream.host_str().unwrap_or_default();
        let authority = match upstream.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        // Trailing slash dropped so that base + client path never produces
        // a double slash; "/" alone means no base path at all.
        let base_path = upstream.path().trim_end_matches('/').to_string();

        Self {
            route_id: route_id.to_string(),
            client,
            scheme: upstream.scheme().to_string(),
            authority,
            base_path,
            metrics,
        }
    }

    /// Identifier of the route this adapter forwards for.
    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    /// Forwards one request to the upstream and rebuilds the response.
    ///
    /// The client's method, body, and headers are preserved apart from
    /// hop-by-hop headers and the forwarded trio, which the gate overwrites.
    /// `Accept-Encoding` is forwarded exactly as the client sent it (or
    /// pinned to `identity` when absent), so compressed upstream responses
    /// pass through only when the client negotiated them.
    ///
    /// # Errors
    ///
    /// Returns `GateError::UpstreamUnavailable`, after bumping the route's
    /// error counter, when the connection fails, the exchange times out, or
    /// the response body cannot be read.
    pub async fn forward(
        &self,
        req: &HttpRequest,
        body: web::Bytes,
    ) -> Result<HttpResponse, GateError> {
        let target_url = self.rewrite_url(req);
        let method = convert_method(req.method());
        let headers = self.build_outbound_headers(req);

        debug!(
            "forwarding {} {} to {} (route {})",
            req.method(),
            req.path(),
            target_url,
            self.route_id
        );

        let outbound = self
            .client
            .request(method, &target_url)
            .headers(headers)
            .body(body.to_vec());

        let upstream_response = match timeout(UPSTREAM_TIMEOUT, outbound.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(self.sink_error(&target_url, &e.to_string())),
            Err(_) => {
                return Err(self.sink_error(
                    &target_url,
                    &format!("no response within {}s", UPSTREAM_TIMEOUT.as_secs()),
                ))
            }
        };

        let status = StatusCode::from_u16(upstream_response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let mut builder = HttpResponse::build(status);

        for (key, value) in upstream_response.headers() {
            let name = key.as_str();
            if SKIP_RESPONSE_HEADERS.contains(&name) {
                continue;
            }
            if let Ok(header_value) =
                actix_web::http::header::HeaderValue::from_bytes(value.as_bytes())
            {
                builder.insert_header((name, header_value));
            }
        }

        match upstream_response.bytes().await {
            Ok(bytes) => Ok(builder.body(bytes)),
            Err(e) => Err(self.sink_error(&target_url, &e.to_string())),
        }
    }

    /// The adapter's error sink: counts the failure against the route and
    /// produces the error the dispatcher renders as 502.
    fn sink_error(&self, target_url: &str, message: &str) -> GateError {
        warn!(
            "upstream failure for route {} at {}: {}",
            self.route_id, target_url, message
        );
        self.metrics.record_error(&self.route_id);
        GateError::UpstreamUnavailable {
            route_id: self.route_id.clone(),
            message: message.to_string(),
        }
    }

    /// Rewrites the request URL onto the upstream: upstream scheme and
    /// authority, upstream base path prepended to the client path, query
    /// string preserved untouched.
    fn rewrite_url(&self, req: &HttpRequest) -> String {
        let mut target = format!(
            "{}://{}{}{}",
            self.scheme,
            self.authority,
            self.base_path,
            req.path()
        );
        if let Some(query) = req.uri().query() {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    /// Copies the client's headers onto the outbound request and stamps the
    /// forwarded-for trio. The outbound client derives `Host` from the
    /// target URL, which is the upstream authority by construction.
    fn build_outbound_headers(&self, req: &HttpRequest) -> ReqwestHeaderMap {
        let mut headers = ReqwestHeaderMap::with_capacity(req.headers().len() + 4);

        for (key, value) in req.headers() {
            let name = key.as_str().to_lowercase();
            if SKIP_REQUEST_HEADERS.contains(&name.as_str()) {
                continue;
            }
            if let (Ok(header_name), Ok(header_value)) = (
                HeaderName::from_bytes(key.as_ref()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) {
                headers.insert(header_name, header_value);
            }
        }

        // Without an explicit Accept-Encoding the outbound client would
        // negotiate compression on its own; pin identity so upstream
        // compression only happens when the client asked for it.
        headers
            .entry("accept-encoding")
            .or_insert_with(|| HeaderValue::from_static("identity"));

        // Scheme and host come from what the gate itself observed, never
        // from forwarding headers the client may have sent.
        let scheme = if req.app_config().secure() {
            "https"
        } else {
            "http"
        };
        headers.insert("x-forwarded-proto", HeaderValue::from_static(scheme));
        if let Ok(value) = HeaderValue::from_str(&request_host(req)) {
            headers.insert("x-forwarded-host", value);
        }
        if let Some(peer) = req.peer_addr() {
            if let Ok(value) = HeaderValue::from_str(&peer.ip().to_string()) {
                headers.insert("x-real-ip", value);
            }
        }

        headers
    }
}

/// Converts the server-side method type to the outbound client's.
fn convert_method(method: &ActixMethod) -> ReqwestMethod {
    match *method {
        ActixMethod::GET => ReqwestMethod::GET,
        ActixMethod::POST => ReqwestMethod::POST,
        ActixMethod::PUT => ReqwestMethod::PUT,
        ActixMethod::DELETE => ReqwestMethod::DELETE,
        ActixMethod::HEAD => ReqwestMethod::HEAD,
        ActixMethod::OPTIONS => ReqwestMethod::OPTIONS,
        ActixMethod::PATCH => ReqwestMethod::PATCH,
        ActixMethod::TRACE => ReqwestMethod::TRACE,
        _ => ReqwestMethod::GET,
    }
}
