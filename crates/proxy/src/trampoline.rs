//! C6 — Failover Trampoline: iterates attempts 0..N using the Host
//! Determiner (C4) and Proxy Engine (C5) until success or exhaustion.
//!
//! Implemented as a plain loop with an attempt counter — no recursion, so
//! no call-stack growth regardless of pool size. The source material's own
//! trampoline-of-thunks is an artifact of its host language's lack of tail
//! call optimization (spec §9); a `loop` is the idiomatic Rust equivalent.

use std::time::{Duration, Instant};

use axum::response::Response;

use crate::client::{ForwardBody, ForwardRequestParts, ProxyEngine, ProxyOutcome};
use crate::determine::{Determined, HostDeterminer};
use crate::error::bad_gateway;
use crate::lifecycle::{LifecycleContext, LifecycleOutcome, LifecycleSink};
use crate::model::ProcessId;

/// Per-attempt timeouts are enforced inside `engine.forward` (connect/read/
/// proxy); this wraps the whole attempt sequence in `timeouts.total`, the
/// overall wall-clock cap the source material recommends but does not
/// mandate (spec §5: "implementers SHOULD cap total wall time").
pub async fn run(
	determiner: &HostDeterminer,
	engine: &ProxyEngine,
	lifecycle: &dyn LifecycleSink,
	ctx: LifecycleContext,
	parts: &ForwardRequestParts,
	body: ForwardBody,
	process_id: &ProcessId,
) -> Response {
	let start = Instant::now();
	let total = engine.timeouts().total;

	match tokio::time::timeout(total, attempts(determiner, engine, lifecycle, &ctx, parts, body, process_id, start)).await {
		Ok(response) => response,
		Err(_) => {
			lifecycle.on_finish(&ctx, LifecycleOutcome::DeadlineExceeded, elapsed(start));
			bad_gateway("request exceeded total timeout")
		},
	}
}

async fn attempts(
	determiner: &HostDeterminer,
	engine: &ProxyEngine,
	lifecycle: &dyn LifecycleSink,
	ctx: &LifecycleContext,
	parts: &ForwardRequestParts,
	mut body: ForwardBody,
	process_id: &ProcessId,
	start: Instant,
) -> Response {
	let mut attempt: usize = 0;
	let mut last_error: Option<String> = None;

	loop {
		match determiner.determine(process_id, attempt).await {
			Determined::Exhausted => {
				let message = last_error.unwrap_or_else(|| "no upstream available".to_string());
				lifecycle.on_finish(ctx, LifecycleOutcome::NoHostAvailable, elapsed(start));
				return bad_gateway(message);
			},
			Determined::Origin(origin) => {
				lifecycle.on_start(ctx, &origin, attempt);
				match engine.forward(parts, &origin, &mut body).await {
					ProxyOutcome::Success(response) => {
						lifecycle.on_finish(ctx, LifecycleOutcome::Success, elapsed(start));
						return response;
					},
					ProxyOutcome::TransportError(message) => {
						last_error = Some(message);
						attempt += 1;
						continue;
					},
				}
			},
		}
	}
}

fn elapsed(start: Instant) -> Duration {
	start.elapsed()
}
