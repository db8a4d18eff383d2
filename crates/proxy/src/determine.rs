//! C4 — Host Determiner: composes the bailout overlay (C3, CU only) and the
//! hash resolver (C2) into a single `(processId, attemptIndex) -> Origin`
//! decision for the failover trampoline.

use crate::bailout::BailoutResolver;
use crate::hash;
use crate::model::{AttemptIndex, Origin, ProcessId};
use crate::pool::HostPool;

/// Outcome of a determination attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Determined {
	Origin(Origin),
	Exhausted,
}

pub struct HostDeterminer {
	pool: HostPool,
	bailout: Option<BailoutResolver>,
}

impl HostDeterminer {
	pub fn new(pool: HostPool, bailout: Option<BailoutResolver>) -> Self {
		Self { pool, bailout }
	}

	/// Composition rule (spec §4.4):
	/// 1. If a bailout exists and returns a sequence for `process_id`, that
	///    sequence becomes the effective pool; `attempt` indexes it
	///    directly — no hash rotation, it is already an explicit list.
	/// 2. Otherwise, delegate to the hash resolver against the default
	///    pool.
	pub async fn determine(&self, process_id: &ProcessId, attempt: AttemptIndex) -> Determined {
		if let Some(bailout) = &self.bailout {
			if let Some(overridden) = bailout.lookup(process_id).await {
				return match overridden.get(attempt) {
					Some(origin) => Determined::Origin(origin.clone()),
					None => Determined::Exhausted,
				};
			}
		}

		match hash::resolve(&self.pool, process_id, attempt) {
			Some(origin) => Determined::Origin(origin),
			None => Determined::Exhausted,
		}
	}
}
