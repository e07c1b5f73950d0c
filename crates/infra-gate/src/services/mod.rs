//! Service layer of the Infra-Core gate.
//!
//! This module holds the gate's core machinery: the live routing table and
//! its per-route proxy adapters, the request dispatcher that ties matching
//! and forwarding together, the metrics registry the management plane
//! reads, and the ACME challenge collaborator seam.
//!
//! # Architecture
//!
//! ```text
//! Client → RequestDispatcher → RouteTable → ProxyAdapter → Upstream
//!                │                 │
//!                │ ACME intercept  │ one lock guards routes + adapters
//!                └→ MetricsRegistry (independent lock)
//! ```
//!
//! The route table and the metrics registry are the only shared mutable
//! state in the gate, each behind its own lock so metric updates never
//! contend with routing decisions. Adapters are immutable once built, which
//! lets dispatches release the routing lock before touching the network.
//!
//! # Module Organization
//!
//! - [`acme`] - HTTP-01 challenge lookup collaborator and stores
//! - [`http`] - Request dispatcher (data-plane entry point)
//! - [`metrics`] - Per-route request/error/latency counters
//! - [`proxy`] - Per-route reverse-proxy adapters and upstream validation
//! - [`route_table`] - Routes and adapters behind one readers-writer lock

pub mod acme;
pub mod http;
pub mod metrics;
pub mod proxy;
pub mod route_table;
