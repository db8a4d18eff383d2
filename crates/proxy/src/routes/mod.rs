//! C7 — Route Binder: CU and MU URL surfaces, sharing one dispatch path
//! into either the proxy trampoline (C6) or redirect mode (C8).

pub mod cu;
pub mod extract;
pub mod mu;

use std::net::SocketAddr;
use std::time::Duration;

use axum::response::{IntoResponse, Response};
use http::{HeaderMap, Method};

use crate::client::{ForwardBody, ForwardRequestParts};
use crate::config::Strategy;
use crate::error::RouteError;
use crate::lifecycle::{LifecycleContext, LifecycleOutcome};
use crate::model::ProcessId;
use crate::redirect;
use crate::state::AppState;
use crate::trampoline;

/// Shared tail end of every route handler: if `process_id` extraction
/// failed, respond 404 without touching a backend; otherwise hand off to
/// whichever strategy the config selected.
pub async fn dispatch(
	state: &AppState,
	method: Method,
	path_and_query: String,
	headers: HeaderMap,
	client_addr: Option<SocketAddr>,
	process_id: Option<ProcessId>,
	body: ForwardBody,
) -> Response {
	let Some(process_id) = process_id else {
		let ctx = LifecycleContext {
			method,
			path: path_and_query,
			process_id: None,
		};
		state
			.lifecycle
			.on_finish(&ctx, LifecycleOutcome::ProcessIdMissing, Duration::ZERO);
		return RouteError::ProcessIdMissing.into_response();
	};

	match state.config.strategy {
		Strategy::Proxy => {
			let parts = ForwardRequestParts {
				method: method.clone(),
				path_and_query: path_and_query.clone(),
				headers,
				client_addr,
				inbound_scheme: "http",
			};
			let ctx = LifecycleContext {
				method,
				path: path_and_query,
				process_id: Some(process_id.clone()),
			};
			trampoline::run(
				&state.determiner,
				&state.engine,
				state.lifecycle.as_ref(),
				ctx,
				&parts,
				body,
				&process_id,
			)
			.await
		},
		Strategy::Redirect => redirect::handle(&state.determiner, &path_and_query, &process_id).await,
	}
}

pub(crate) fn path_and_query(uri: &http::Uri) -> String {
	uri.path_and_query()
		.map(|pq| pq.as_str().to_string())
		.unwrap_or_else(|| uri.path().to_string())
}

pub async fn healthcheck() -> &'static str {
	"ok"
}
