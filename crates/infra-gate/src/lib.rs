//! # Infra-Core Gate
//!
//! The HTTP edge gateway of the Infra-Core control plane: a dynamically
//! configurable reverse proxy built with Rust and Actix Web. The gate
//! selects an upstream for each request from a live in-memory routing
//! table, maintains one reverse-proxy adapter per route, exposes a
//! management plane for health, metrics, and route inspection, and serves
//! ACME HTTP-01 challenge responses ahead of routing.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use infra_gate::models::route::RouteDefinition;
//! use infra_gate::services::http::RequestDispatcher;
//! use infra_gate::services::metrics::MetricsRegistry;
//! use infra_gate::services::route_table::RouteTable;
//!
//! let metrics = Arc::new(MetricsRegistry::new());
//! let table = Arc::new(RouteTable::new(Arc::clone(&metrics)));
//!
//! table
//!     .add(RouteDefinition::new("console", "", "/", "http://127.0.0.1:9000"))
//!     .expect("valid upstream");
//!
//! // The dispatcher is the data-plane handler; wire it into an HTTP
//! // server with routes::proxy::configure_gate.
//! let dispatcher = RequestDispatcher::new(table, metrics, None);
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌────────┐   ┌───────────────────────────────┐   ┌──────────┐
//! │ Client │──▶│ Gate (data plane)             │──▶│ Upstream │
//! └────────┘   │  ACME intercept               │   └──────────┘
//!              │  Route match (one RwLock)     │
//!              │  Proxy adapter per route      │
//!              │  Metrics on completion        │
//!              ├───────────────────────────────┤
//!              │ Management plane (port +1000) │
//!              │  /health /metrics /routes     │
//!              └───────────────────────────────┘
//! ```
//!
//! ## Core Guarantees
//!
//! - **Deterministic routing**: host and prefix scoring with a total
//!   tie-break order, so identical requests against an unchanged table
//!   always select the same route.
//! - **Atomic registration**: a route and its adapter are installed and
//!   removed together; observers never see one without the other.
//! - **Isolated failures**: upstream errors and handler panics become HTTP
//!   responses and counter bumps, never process crashes.
//! - **Copy-out reads**: the management plane receives snapshots, never
//!   references into live state.
//!
//! ## Module Organization
//!
//! - [`config`] - YAML configuration loading with environment overrides
//! - [`logs`] - Logger configuration and output formatting
//! - [`models`] - Routes, configuration schema, and the error taxonomy
//! - [`routes`] - HTTP endpoints for both listeners
//! - [`server`] - Gate lifecycle, listeners, and graceful drain
//! - [`services`] - Route table, proxy adapters, dispatcher, metrics, ACME
//! - [`utils`] - Host normalization and route scoring

pub mod config;
pub mod logs;
pub mod models;
pub mod routes;
pub mod server;
pub mod services;
pub mod utils;
