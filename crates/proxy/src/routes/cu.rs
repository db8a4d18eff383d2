//! CU route profile (spec §6): dry-run requires body restreaming since
//! `processId` may live in the body; the rest pass the body through
//! untouched.

use std::net::SocketAddr;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, OriginalUri, Path, State};
use axum::response::Response;
use axum::routing::get;
use http::{HeaderMap, Method};

use super::{dispatch, extract, healthcheck, path_and_query};
use crate::client::ForwardBody;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/dry-run", axum::routing::post(dry_run))
		.route("/result/{message_id}", get(result))
		.route("/state/{process_id}", get(state_route))
		.route("/cron/{process_id}", get(cron))
		.route("/healthcheck", get(healthcheck))
}

async fn dry_run(
	State(state): State<AppState>,
	connect: Option<ConnectInfo<SocketAddr>>,
	OriginalUri(uri): OriginalUri,
	method: Method,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	let process_id =
		extract::from_query(uri.query(), "process-id").or_else(|| extract::from_body_json(&body, &["process-id", "processId"]));
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

async fn state_route(
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

async fn cron(
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
