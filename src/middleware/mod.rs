//! HTTP middleware components.
//!
//! Three stages, composed by the router in a fixed order:
//! - Check required headers before a handler runs
//! - Answer methods a route does not permit
//! - Turn every raised failure into one JSON error response

/// Disallowed-method responder
pub mod method_guard;

/// Required header precondition
pub mod header_precondition;

/// Failure-to-response normalization
pub mod error_normalizer;

pub use error_normalizer::{ErrorNormalizer, normalize, normalize_errors};
pub use header_precondition::{HeaderPrecondition, enforce, verify};
pub use method_guard::{MethodGuard, allowed};
