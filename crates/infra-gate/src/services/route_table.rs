use crate::models::error::GateError;
use crate::models::route::{Route, RouteDefinition};
use crate::services::metrics::MetricsRegistry;
use crate::services::proxy::{build_outbound_client, parse_upstream, ProxyAdapter};
use crate::utils::route_match::best_match;

use ahash::HashMap as AHashMap;
use chrono::Utc;
use reqwest::Client;
use std::sync::{Arc, RwLock};

/// A route together with its proxy adapter. The two live and die as one
/// value, which is what keeps the table/adapter agreement invariant true
/// by construction.
struct RouteEntry {
    route: Route,
    adapter: Arc<ProxyAdapter>,
}

/// The live, in-memory routing table.
///
/// Owns every [`Route`] and its [`ProxyAdapter`], keyed by identifier,
/// behind a single readers-writer lock: in-flight dispatches hold the read
/// side, mutations take the write side. Lookups hand out copies of routes
/// and shared handles to adapters, never references into the table, so no
/// caller can observe a mutation in progress. Nothing performs I/O while
/// holding the lock; adapters are constructed before the write lock is
/// taken and upstream traffic happens after the read lock is released.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use infra_gate::models::route::RouteDefinition;
/// use infra_gate::services::metrics::MetricsRegistry;
/// use infra_gate::services::route_table::RouteTable;
///
/// let table = RouteTable::new(Arc::new(MetricsRegistry::new()));
/// table
///     .add(RouteDefinition::new("api", "", "/api", "http://127.0.0.1:8081"))
///     .unwrap();
///
/// assert_eq!(table.len(), 1);
/// assert!(table.select("any.host", "/api/users").is_some());
/// ```
pub struct RouteTable {
    entries: RwLock<AHashMap<String, RouteEntry>>,
    client: Client,
    metrics: Arc<MetricsRegistry>,
}

impl RouteTable {
    /// Creates an empty table sharing one outbound client across all
    /// adapters it will construct.
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            entries: RwLock::new(AHashMap::default()),
            client: build_outbound_client(),
            metrics,
        }
    }

    /// Registers a route, upserting on an existing identifier.
    ///
    /// The upstream URL is validated first; a rejected definition leaves the
    /// table untouched. On success a fresh adapter is installed together
    /// with the route in one write-lock critical section. Re-registering an
    /// identifier keeps its original `created_at` and refreshes
    /// `updated_at`; the previous adapter is discarded.
    ///
    /// Returns a copy of the stored route.
    ///
    /// # Errors
    ///
    /// `GateError::InvalidUpstream` when the upstream URL does not parse or
    /// lacks a supported scheme or host.
    pub fn add(&self, definition: RouteDefinition) -> Result<Route, GateError> {
        let upstream = parse_upstream(&definition.upstream)?;
        let adapter = Arc::new(ProxyAdapter::new(
            &definition.id,
            &upstream,
            self.client.clone(),
            Arc::clone(&self.metrics),
        ));

        let now = Utc::now();
        let mut entries = self.entries.write().unwrap();
        let created_at = entries
            .get(&definition.id)
            .map(|existing| existing.route.created_at)
            .unwrap_or(now);

        let route = Route {
            id: definition.id.clone(),
            host: definition.host.to_ascii_lowercase(),
            path_prefix: definition.path_prefix,
            upstream: definition.upstream,
            created_at,
            updated_at: now,
        };

        entries.insert(
            definition.id,
            RouteEntry {
                route: route.clone(),
                adapter,
            },
        );

        Ok(route)
    }

    /// Removes a route and its adapter atomically.
    ///
    /// # Errors
    ///
    /// `GateError::NotFound` when the identifier is not registered.
    pub fn remove(&self, id: &str) -> Result<(), GateError> {
        let mut entries = self.entries.write().unwrap();
        entries
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GateError::NotFound { id: id.to_string() })
    }

    /// Returns a copy of the route registered under `id`.
    ///
    /// # Errors
    ///
    /// `GateError::NotFound` when the identifier is not registered.
    pub fn get(&self, id: &str) -> Result<Route, GateError> {
        let entries = self.entries.read().unwrap();
        entries
            .get(id)
            .map(|entry| entry.route.clone())
            .ok_or_else(|| GateError::NotFound { id: id.to_string() })
    }

    /// Returns copies of all routes, ordered by identifier for
    /// deterministic output.
    pub fn list(&self) -> Vec<Route> {
        let entries = self.entries.read().unwrap();
        let mut routes: Vec<Route> = entries.values().map(|entry| entry.route.clone()).collect();
        routes.sort_by(|a, b| a.id.cmp(&b.id));
        routes
    }

    /// Number of live routes.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the table holds no routes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selects the best-matching route for a request and returns a copy of
    /// it together with its adapter, both obtained under one read-lock
    /// acquisition so the pair is never torn by a concurrent mutation.
    ///
    /// `host` must already be normalized (lowercase, port stripped); `path`
    /// is the raw request path. Returns `None` when no route qualifies.
    pub fn select(&self, host: &str, path: &str) -> Option<(Route, Arc<ProxyAdapter>)> {
        let entries = self.entries.read().unwrap();
        let route = best_match(entries.values().map(|entry| &entry.route), host, path)?;
        let entry = entries.get(&route.id)?;
        Some((entry.route.clone(), Arc::clone(&entry.adapter)))
    }
}
