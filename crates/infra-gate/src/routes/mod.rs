//! HTTP endpoint definitions for the gate's two listeners.
//!
//! The data plane is a single catch-all resource handing every request to
//! the dispatcher. The management plane is a separate listener exposing
//! read-only observability endpoints; it reads the route table and metrics
//! registry but never mutates them while serving.
//!
//! # Module Organization
//!
//! - [`health`] - Management `/health` probe
//! - [`management`] - Management `/routes` listing and listener wiring
//! - [`metrics`] - Management `/metrics` counter dump
//! - [`proxy`] - Data-plane catch-all wiring
//!
//! Management responses are JSON with an explicit
//! `application/json; charset=utf-8` content type; the field names are part
//! of the external contract consumed by the console and the probe monitor.

use actix_web::HttpResponse;

pub mod health;
pub mod management;
pub mod metrics;
pub mod proxy;

/// Renders a management-plane JSON payload with the contractual
/// content type.
pub(crate) fn json_response(value: serde_json::Value) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json; charset=utf-8")
        .body(value.to_string())
}
