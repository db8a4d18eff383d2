//! C8 — Redirect Mode: an alternate strategy that resolves the primary
//! origin (attempt 0 only, no failover) and responds 302 instead of
//! proxying. The spec's source performs no server-side failover in this
//! mode; a client revisit re-resolves from scratch, which may land on a
//! different origin if a bailout overlay has since changed — that is
//! intentional and unchanged from spec §9's Open Question.

use axum::response::{IntoResponse, Redirect, Response};

use crate::determine::{Determined, HostDeterminer};
use crate::error::RouteError;
use crate::model::ProcessId;

pub async fn handle(
	determiner: &HostDeterminer,
	path_and_query: &str,
	process_id: &ProcessId,
) -> Response {
	match determiner.determine(process_id, 0).await {
		Determined::Origin(origin) => {
			let location = format!("{origin}{path_and_query}");
			Redirect::to(&location).into_response()
		},
		Determined::Exhausted => RouteError::NoHostAvailable.into_response(),
	}
}
