//! Prometheus metrics for the App Mesh controller
//!
//! This module exposes metrics for monitoring controller health and reconciliation.

mod prometheus;

pub use prometheus::*;
