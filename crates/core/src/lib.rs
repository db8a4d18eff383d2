//! Shared primitives used across the router: cheap interned strings and a
//! place for cross-crate prelude re-exports.

pub mod prelude {
	pub use std::sync::Arc;

	pub use crate::Strng;
}

/// Cheaply-cloneable interned string, used for process ids and origin text
/// so the attempt loop and the lifecycle hooks can share one allocation
/// instead of cloning a `String` per attempt.
pub type Strng = arcstr::ArcStr;
