//! Configuration loading for the gate.
//!
//! Configuration comes from a per-environment YAML file with a small set of
//! environment-variable overrides layered on top; see [`settings`].

pub mod settings;
