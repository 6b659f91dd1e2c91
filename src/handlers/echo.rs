//! JSON echo endpoint.
//!
//! - POST /api/v1/echo - Return the request body wrapped in `received`

use axum::{Json, extract::rejection::JsonRejection};
use serde_json::{Value, json};

use crate::error::Failure;

/// Echo a JSON body back to the caller.
///
/// # Endpoint
///
/// `POST /api/v1/echo`
///
/// # Preconditions
///
/// Requires `Content-Type: application/json` and `Accept: application/json`.
/// They are checked before this handler runs.
///
/// # Response
///
/// - **Success (200 OK)**: `{ "received": <body> }`
/// - **Error (400)**: header precondition failed (`TypeError`) or the body
///   is not valid JSON (`SyntaxError`)
/// - **Error (405)**: any method other than POST
pub async fn echo(payload: Result<Json<Value>, JsonRejection>) -> Result<Json<Value>, Failure> {
    let Json(body) = payload?;

    Ok(Json(json!({ "received": body })))
}
