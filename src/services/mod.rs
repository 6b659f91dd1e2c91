//! Business logic layer.
//!
//! Services talk to external systems and report problems as failures.

/// Upstream status lookups
pub mod upstream_service;
