use std::sync::Arc;

use crate::client::ProxyEngine;
use crate::config::Config;
use crate::determine::HostDeterminer;
use crate::lifecycle::LifecycleSink;

/// Shared, immutable-after-construction state handed to every request task.
/// Cloning is cheap — every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
	pub config: Arc<Config>,
	pub determiner: Arc<HostDeterminer>,
	pub engine: Arc<ProxyEngine>,
	pub lifecycle: Arc<dyn LifecycleSink>,
}
