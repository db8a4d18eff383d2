//! Client-facing error taxonomy (spec §7). Only [`RouteError`] variants are
//! ever turned into a response body; transport and bailout failures are
//! handled internally by the trampoline and never reach this type directly
//! — they surface only as the generic 502 once the pool is exhausted.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(thiserror::Error, Debug)]
pub enum RouteError {
	/// `processIdFromRequest` returned `None`. No backend is contacted.
	#[error("Process id not found on request")]
	ProcessIdMissing,
	/// The pool is empty, or every attempt is exhausted with no prior
	/// transport error recorded (e.g. a bailout returned empty `hosts`).
	#[error("no upstream available")]
	NoHostAvailable,
}

impl IntoResponse for RouteError {
	fn into_response(self) -> Response {
		match self {
			RouteError::ProcessIdMissing => (
				StatusCode::NOT_FOUND,
				Json(json!({ "error": "Process id not found on request" })),
			)
				.into_response(),
			RouteError::NoHostAvailable => bad_gateway("no upstream available"),
		}
	}
}

/// The single place a 502 is constructed, so the body shape in spec §6
/// (`{"error":"Proxy connection error","message":...}`) only has one
/// source of truth.
pub fn bad_gateway(message: impl Into<String>) -> Response {
	(
		StatusCode::BAD_GATEWAY,
		Json(json!({
			"error": "Proxy connection error",
			"message": message.into(),
		})),
	)
		.into_response()
}
