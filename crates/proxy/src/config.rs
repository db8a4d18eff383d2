//! Startup configuration (spec §6). Modeled the way the teacher splits a
//! loosely-typed `Raw*` shape (straight off YAML, `Option<T>` everywhere,
//! `deny_unknown_fields`) from a validated, defaulted `Config` used by the
//! rest of the process.

use std::time::Duration;

use ao_router_core::Strng;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::bailout::{BailoutConfig, BailoutOverlays};
use crate::model::Origin;
use crate::pool::HostPool;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
	#[error("`hosts` must list at least one backend origin")]
	EmptyPool,
	#[error(transparent)]
	InvalidOrigin(#[from] crate::model::InvalidOrigin),
	#[error("failed to parse config: {0}")]
	Parse(#[from] serde_yaml::Error),
	#[error("failed to read config file {path:?}: {source}")]
	Read {
		path: std::path::PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("`role: mu` does not support `surUrl`/`processToHost`/`ownerToHost` (bailout is CU-only)")]
	BailoutNotSupportedForRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Cu,
	Mu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
	Proxy,
	Redirect,
}

/// On-disk shape. Every field is optional so partial configs plus
/// environment overrides can be layered without the deserializer
/// rejecting a file that only sets a few keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawConfig {
	pub role: Option<Role>,
	pub strategy: Option<Strategy>,
	#[serde(default)]
	pub hosts: Vec<String>,
	pub sur_url: Option<String>,
	#[serde(default)]
	pub process_to_host: IndexMap<String, Vec<String>>,
	#[serde(default)]
	pub owner_to_host: IndexMap<String, Vec<String>>,
	pub port: Option<u16>,
	pub timeouts: Option<RawTimeouts>,
	pub logging: Option<RawLogging>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawTimeouts {
	pub connect_ms: Option<u64>,
	pub socket_ms: Option<u64>,
	pub proxy_ms: Option<u64>,
	pub total_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawLogging {
	pub filter: Option<String>,
}

impl RawConfig {
	pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
		Ok(serde_yaml::from_str(s)?)
	}

	pub async fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
		let contents = fs_err::tokio::read_to_string(path)
			.await
			.map_err(|source| ConfigError::Read {
				path: path.to_path_buf(),
				source,
			})?;
		Self::from_yaml_str(&contents)
	}
}

/// Per-attempt and per-request timeout caps (spec §4.5/§5). Defaults match
/// the spec's suggested values; all are configurable.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
	pub connect: Duration,
	pub socket: Duration,
	pub proxy: Duration,
	pub total: Duration,
}

impl Default for Timeouts {
	fn default() -> Self {
		Self {
			connect: Duration::from_secs(10),
			socket: Duration::from_secs(8),
			proxy: Duration::from_secs(20),
			total: Duration::from_secs(30),
		}
	}
}

/// Validated, defaulted configuration used by the rest of the process.
#[derive(Debug, Clone)]
pub struct Config {
	pub role: Role,
	pub strategy: Strategy,
	pub pool: HostPool,
	pub bailout: Option<BailoutConfig>,
	pub port: u16,
	pub timeouts: Timeouts,
	pub logging_filter: String,
}

impl Config {
	pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
		let role = raw.role.unwrap_or(Role::Cu);
		let strategy = raw.strategy.unwrap_or(Strategy::Proxy);

		let mut origins = Vec::with_capacity(raw.hosts.len());
		for h in &raw.hosts {
			origins.push(Origin::parse(h)?);
		}
		let pool = HostPool::new(origins).map_err(|_| ConfigError::EmptyPool)?;

		let has_bailout_config =
			raw.sur_url.is_some() || !raw.process_to_host.is_empty() || !raw.owner_to_host.is_empty();
		if role == Role::Mu && has_bailout_config {
			return Err(ConfigError::BailoutNotSupportedForRole);
		}

		let bailout = if role == Role::Cu {
			let mut overlays = BailoutOverlays::default();
			for (process_id, hosts) in &raw.process_to_host {
				let parsed = hosts
					.iter()
					.map(|h| Origin::parse(h))
					.collect::<Result<Vec<_>, _>>()?;
				overlays
					.process_to_host
					.insert(Strng::from(process_id.as_str()), parsed.into());
			}
			for (owner, hosts) in &raw.owner_to_host {
				let parsed = hosts
					.iter()
					.map(|h| Origin::parse(h))
					.collect::<Result<Vec<_>, _>>()?;
				overlays
					.owner_to_host
					.insert(Strng::from(owner.as_str()), parsed.into());
			}
			Some(BailoutConfig {
				surrogate_base_url: raw.sur_url.as_deref().map(Strng::from),
				overlays,
				..Default::default()
			})
		} else {
			None
		};

		let raw_timeouts = raw.timeouts.unwrap_or_default();
		let defaults = Timeouts::default();
		let timeouts = Timeouts {
			connect: raw_timeouts
				.connect_ms
				.map(Duration::from_millis)
				.unwrap_or(defaults.connect),
			socket: raw_timeouts
				.socket_ms
				.map(Duration::from_millis)
				.unwrap_or(defaults.socket),
			proxy: raw_timeouts
				.proxy_ms
				.map(Duration::from_millis)
				.unwrap_or(defaults.proxy),
			total: raw_timeouts
				.total_ms
				.map(Duration::from_millis)
				.unwrap_or(defaults.total),
		};

		Ok(Self {
			role,
			strategy,
			pool,
			bailout,
			port: raw.port.unwrap_or(8080),
			timeouts,
			logging_filter: raw
				.logging
				.and_then(|l| l.filter)
				.unwrap_or_else(|| "info".to_string()),
		})
	}
}
