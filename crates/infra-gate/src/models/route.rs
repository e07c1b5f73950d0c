use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live routing rule held by the route table.
///
/// A route maps an inbound request, selected by host and path prefix, to an
/// upstream base URL. The gate keeps routes in memory only; durable storage
/// belongs to the surrounding control plane, which re-registers routes on
/// startup.
///
/// # Matching semantics
///
/// - `host` is an exact DNS label match; the empty string matches any host.
///   Hosts are stored lowercase and compared against the lowercased request
///   host with any port stripped.
/// - `path_prefix` is a byte-exact prefix of the request path; the empty
///   string matches any path. Paths are never normalized before matching.
/// - A route with an empty host and an empty prefix is the catch-all.
///
/// # Serialization
///
/// Routes serialize with RFC3339 timestamps, which is the shape the
/// management plane's `/routes` endpoint exposes:
///
/// ```json
/// {
///   "id": "console",
///   "host": "",
///   "path_prefix": "/",
///   "upstream": "http://127.0.0.1:9000",
///   "created_at": "2024-03-15T10:30:00Z",
///   "updated_at": "2024-03-15T10:30:00Z"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Stable opaque identifier, unique per table.
    pub id: String,

    /// Exact host to match, lowercase. Empty matches any host.
    #[serde(default)]
    pub host: String,

    /// Path prefix to match, byte-exact. Empty matches any path.
    #[serde(default)]
    pub path_prefix: String,

    /// Upstream base URL (`http` or `https`, non-empty host, optional port
    /// and base path). The base path is prepended to forwarded paths.
    pub upstream: String,

    /// When the identifier was first registered.
    pub created_at: DateTime<Utc>,

    /// When the identifier was last registered or re-registered.
    pub updated_at: DateTime<Utc>,
}

/// Registration input for [`Route`], before the table stamps timestamps.
///
/// This is the shape bootstrap routes take in the configuration file and the
/// shape embedders hand to `RouteTable::add`. Validation of the upstream URL
/// happens at registration time so a rejected definition leaves no partial
/// state behind.
///
/// # Examples
///
/// ```yaml
/// - id: api
///   host: api.example.com
///   path_prefix: /v1
///   upstream: http://127.0.0.1:8081
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RouteDefinition {
    /// Stable opaque identifier, unique per table.
    pub id: String,

    /// Exact host to match. Empty matches any host.
    #[serde(default)]
    pub host: String,

    /// Path prefix to match. Empty matches any path.
    #[serde(default)]
    pub path_prefix: String,

    /// Upstream base URL.
    pub upstream: String,
}

impl RouteDefinition {
    /// Convenience constructor used by bootstrap seeding and tests.
    pub fn new(id: &str, host: &str, path_prefix: &str, upstream: &str) -> Self {
        Self {
            id: id.to_string(),
            host: host.to_string(),
            path_prefix: path_prefix.to_string(),
            upstream: upstream.to_string(),
        }
    }
}
