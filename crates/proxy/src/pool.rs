//! C1 — Host Pool: a frozen ordered sequence of [`Origin`]s per AO unit role.

use std::sync::Arc;

use crate::model::Origin;

#[derive(thiserror::Error, Debug)]
#[error("host pool for role is empty; at least one `hosts` entry is required")]
pub struct EmptyPool;

/// Ordered, immutable sequence of backend origins. Order is significant: it
/// defines the failover sequence when no bailout overlay overrides it.
#[derive(Clone, Debug)]
pub struct HostPool(Arc<[Origin]>);

impl HostPool {
	pub fn new(origins: Vec<Origin>) -> Result<Self, EmptyPool> {
		if origins.is_empty() {
			return Err(EmptyPool);
		}
		Ok(Self(origins.into()))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn at(&self, index: usize) -> Option<&Origin> {
		self.0.get(index)
	}
}
