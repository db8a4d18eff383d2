//! MU route profile (spec §6): simpler than CU — `processId` is always in
//! path or query, no bailout. `submit_message` buffers its body like CU's
//! `dry_run` does, since a submitted message must survive a failover resend;
//! the other routes have no body worth restreaming. The exact endpoint list
//! is configuration-shaped in the source material; this mirrors the CU shape
//! (submit / result / scheduled-tasks) at the MU scope (message submission,
//! scheduling).

use std::net::SocketAddr;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, OriginalUri, Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use http::{HeaderMap, Method};

use super::{dispatch, extract, healthcheck, path_and_query};
use crate::client::ForwardBody;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/message/{process_id}", post(submit_message))
		.route("/result/{message_id}", get(result))
		.route("/schedule/{process_id}", get(schedule))
		.route("/healthcheck", get(healthcheck))
}

async fn submit_message(
	State(state): State<AppState>,
	connect: Option<ConnectInfo<SocketAddr>>,
	OriginalUri(uri): OriginalUri,
	Path(process_id_raw): Path<String>,
	method: Method,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	let process_id = extract::from_path(&process_id_raw);
	dispatch(
		&state,
		method,
		path_and_query(&uri),
		headers,
		connect.map(|c| c.0),
		process_id,
		ForwardBody::Buffered(body),
	)
	.await
}

async fn result(
	State(state): State<AppState>,
	connect: Option<ConnectInfo<SocketAddr>>,
	OriginalUri(uri): OriginalUri,
	Path(_message_id): Path<String>,
	method: Method,
	headers: HeaderMap,
	body: Body,
) -> Response {
	let process_id = extract::from_query(uri.query(), "process-id");
	dispatch(
		&state,
		method,
		path_and_query(&uri),
		headers,
		connect.map(|c| c.0),
		process_id,
		ForwardBody::Stream(Some(body)),
	)
	.await
}

async fn schedule(
	State(state): State<AppState>,
	connect: Option<ConnectInfo<SocketAddr>>,
	OriginalUri(uri): OriginalUri,
	Path(process_id_raw): Path<String>,
	method: Method,
	headers: HeaderMap,
	body: Body,
) -> Response {
	let process_id = extract::from_path(&process_id_raw);
	dispatch(
		&state,
		method,
		path_and_query(&uri),
		headers,
		connect.map(|c| c.0),
		process_id,
		ForwardBody::Stream(Some(body)),
	)
	.await
}
