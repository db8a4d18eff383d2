//! C9 — Request Lifecycle Interface: a narrow, non-blocking sink reserved
//! for the (out-of-scope, spec §1) metrics collaborator. The proxy pipeline
//! calls it at well-defined moments and never looks at what it does with
//! that information.
//!
//! Implementations MUST NOT: throw/panic into the proxy path, consume the
//! request body, or mutate headers. Both methods are synchronous and
//! non-blocking by construction — a slow implementation should queue its
//! own work onto a channel or drop it, never block the caller.

use std::time::Duration;

use crate::model::{AttemptIndex, Origin, ProcessId};

/// Per-request context visible to the lifecycle sink. Deliberately narrow:
/// it carries enough to label a metric, not enough to reconstruct the
/// request.
#[derive(Debug, Clone)]
pub struct LifecycleContext {
	pub method: http::Method,
	pub path: String,
	pub process_id: Option<ProcessId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
	Success,
	ProcessIdMissing,
	NoHostAvailable,
	DeadlineExceeded,
}

pub trait LifecycleSink: Send + Sync {
	/// Fired before each upstream attempt.
	fn on_start(&self, ctx: &LifecycleContext, origin: &Origin, attempt: AttemptIndex);

	/// Fired exactly once per request, on final success or terminal
	/// failure.
	fn on_finish(&self, ctx: &LifecycleContext, outcome: LifecycleOutcome, duration: Duration);
}

/// Default sink when no metrics collaborator is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLifecycleSink;

impl LifecycleSink for NoopLifecycleSink {
	fn on_start(&self, _ctx: &LifecycleContext, _origin: &Origin, _attempt: AttemptIndex) {}
	fn on_finish(&self, _ctx: &LifecycleContext, _outcome: LifecycleOutcome, _duration: Duration) {}
}

/// A sink that emits `tracing` events — useful standalone, and a template
/// for a real metrics collaborator to wrap.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLifecycleSink;

impl LifecycleSink for TracingLifecycleSink {
	fn on_start(&self, ctx: &LifecycleContext, origin: &Origin, attempt: AttemptIndex) {
		tracing::debug!(
			method = %ctx.method,
			path = %ctx.path,
			process_id = ctx.process_id.as_ref().map(ProcessId::as_str),
			origin = %origin,
			attempt,
			"upstream attempt starting"
		);
	}

	fn on_finish(&self, ctx: &LifecycleContext, outcome: LifecycleOutcome, duration: Duration) {
		tracing::info!(
			method = %ctx.method,
			path = %ctx.path,
			process_id = ctx.process_id.as_ref().map(ProcessId::as_str),
			outcome = ?outcome,
			duration_ms = duration.as_millis() as u64,
			"request finished"
		);
	}
}
