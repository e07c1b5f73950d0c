//! Logging configuration for the gate.

pub mod logger;
