//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, state)
//! 2. Performs its work, raising a `Failure` when something is invalid
//! 3. Returns HTTP response (JSON, status code)

/// JSON echo endpoint
pub mod echo;

/// Service health endpoint
pub mod health;

/// Upstream status endpoint
pub mod upstream;
