//! Request guard middleware for axum services.
//!
//! # Components
//!
//! - **MethodGuard**: `405 Method Not Allowed` with an `Allow` header
//! - **HeaderPrecondition**: rejects requests missing a required header value
//! - **ErrorNormalizer**: renders every [`Failure`] as
//!   `{ "error": { "name", "message", "headers"? } }` and logs it
//!
//! # Pipeline
//!
//! ```text
//! request → HeaderPrecondition → handler → response
//!         └→ method mismatch → MethodGuard → response
//! any Failure ─────────────→ ErrorNormalizer → response
//! ```
//!
//! The demo service in `main.rs` wires all three into one router, see
//! [`routes::build_router`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use error::{Failure, UpstreamResponse};
