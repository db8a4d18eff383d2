//! Core data model: [`ProcessId`], [`Origin`], and the attempt index used to
//! thread a single request through the failover loop.

use std::fmt;

use ao_router_core::Strng;

/// Opaque per-request routing key carried by every routable request.
///
/// Treated as an uninterpreted UTF-8 byte sequence for hashing — callers
/// must not assume any internal structure. Construction rejects the empty
/// string so an extractor that finds only `""` is equivalent to finding
/// nothing (surfaced as [`crate::error::RouteError::ProcessIdMissing`]).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProcessId(Strng);

impl ProcessId {
	pub fn new(raw: impl Into<Strng>) -> Option<Self> {
		let raw = raw.into();
		if raw.is_empty() { None } else { Some(Self(raw)) }
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for ProcessId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ProcessId").field(&self.0).finish()
	}
}

impl fmt::Display for ProcessId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A backend base URL (scheme + authority), frozen once parsed at config
/// load time. No path/query is carried — those come from the inbound
/// request and are appended at forward time.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Origin(Strng);

/// A malformed entry in a `hosts` list, a bailout response, or an overlay
/// map — always a [`crate::error::ConfigError`] at startup, or silently
/// dropped (logged) when it comes from a live bailout response.
#[derive(thiserror::Error, Debug)]
#[error("invalid origin {raw:?}: {reason}")]
pub struct InvalidOrigin {
	pub raw: String,
	pub reason: String,
}

impl Origin {
	pub fn parse(raw: &str) -> Result<Self, InvalidOrigin> {
		let url = url::Url::parse(raw).map_err(|e| InvalidOrigin {
			raw: raw.to_string(),
			reason: e.to_string(),
		})?;
		if url.scheme() != "http" && url.scheme() != "https" {
			return Err(InvalidOrigin {
				raw: raw.to_string(),
				reason: format!("unsupported scheme {:?}", url.scheme()),
			});
		}
		if url.host_str().is_none() {
			return Err(InvalidOrigin {
				raw: raw.to_string(),
				reason: "missing host".to_string(),
			});
		}
		// Normalize away any trailing slash so path concatenation at forward
		// time never produces a double slash.
		let trimmed = raw.trim_end_matches('/');
		Ok(Self(Strng::from(trimmed)))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for Origin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Origin").field(&self.0).finish()
	}
}

impl fmt::Display for Origin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Zero-based index into a pool's failover sequence. Terminates when it
/// equals the effective pool length for the request's process id.
pub type AttemptIndex = usize;
