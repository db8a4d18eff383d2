//! C2 — Hash Resolver: deterministic `(processId, attemptIndex) -> Origin`
//! mapping over the default [`HostPool`].
//!
//! Hash function: FNV-1a over the process id's UTF-8 bytes. The source
//! material this spec was distilled from does not pin down a specific
//! algorithm (see spec §4.2's Open Question); FNV-1a is chosen because it
//! is fast, has good avalanche behavior for the pool sizes this router
//! targets (tens of origins, not millions), and needs no extra dependency.
//! Every caller that reasons about which origin a process id maps to goes
//! through this module — there is exactly one hash function in the binary.

use crate::model::{AttemptIndex, Origin, ProcessId};
use crate::pool::HostPool;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over `bytes`.
pub fn fnv1a(bytes: &[u8]) -> u32 {
	let mut hash = FNV_OFFSET_BASIS;
	for &byte in bytes {
		hash ^= u32::from(byte);
		hash = hash.wrapping_mul(FNV_PRIME);
	}
	hash
}

/// `resolve(processId, attemptIndex) -> Origin | Exhausted`.
///
/// The origin for attempt `k` is `pool[(H + k) mod n]` while `k < n`;
/// `None` (Exhausted) otherwise. This yields a unique permutation of `n`
/// origins per process id before exhaustion, with the primary origin
/// stable across restarts for a fixed pool.
pub fn resolve(pool: &HostPool, process_id: &ProcessId, attempt: AttemptIndex) -> Option<Origin> {
	let n = pool.len();
	if n == 0 || attempt >= n {
		return None;
	}
	let h = fnv1a(process_id.as_str().as_bytes()) as u64;
	let idx = ((h + attempt as u64) % n as u64) as usize;
	pool.at(idx).cloned()
}
