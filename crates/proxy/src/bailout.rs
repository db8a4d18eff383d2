//! C3 — Bailout Resolver (CU only): an overlay that replaces the default
//! hash-based host choice with an explicit origin list, resolved lazily via
//! an external surrogate and cached in-memory.

use std::sync::Arc;
use std::time::Duration;

use ao_router_core::Strng;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use crate::model::{Origin, ProcessId};

/// Static overlays supplied at startup (see spec §4.3's `processToHost` /
/// `ownerToHost` config options).
#[derive(Clone, Debug, Default)]
pub struct BailoutOverlays {
	/// `processId -> [origins]`; bypasses the surrogate call entirely.
	pub process_to_host: IndexMap<Strng, Arc<[Origin]>>,
	/// `owner -> [origins]`; applied after a surrogate lookup yields an
	/// owner, replacing the per-process list it returned.
	pub owner_to_host: IndexMap<Strng, Arc<[Origin]>>,
}

#[derive(Clone, Debug)]
pub struct BailoutConfig {
	pub surrogate_base_url: Option<Strng>,
	pub overlays: BailoutOverlays,
	/// Cache eviction: the source material is silent on policy (spec
	/// §4.3/§9 Open Question). We choose an LRU-by-capacity cache with a
	/// 5 minute TTL, bounding staleness against a surrogate that may
	/// reassign a process to a different fleet.
	pub cache_capacity: u64,
	pub cache_ttl: Duration,
	pub request_timeout: Duration,
}

impl Default for BailoutConfig {
	fn default() -> Self {
		Self {
			surrogate_base_url: None,
			overlays: BailoutOverlays::default(),
			cache_capacity: 100_000,
			cache_ttl: Duration::from_secs(5 * 60),
			request_timeout: Duration::from_secs(2),
		}
	}
}

#[derive(Deserialize, Debug)]
struct SurrogateResponse {
	owner: Option<String>,
	#[serde(default)]
	hosts: Vec<String>,
}

/// Lazily-evaluated, cached overlay. `lookup` never returns an error to the
/// caller: surrogate failures degrade to "no override" (spec §4.3/§7
/// `BailoutLookupError` — logged, not surfaced).
pub struct BailoutResolver {
	cfg: BailoutConfig,
	http: reqwest::Client,
	cache: moka::sync::Cache<ProcessId, Option<Arc<[Origin]>>>,
}

impl BailoutResolver {
	pub fn new(cfg: BailoutConfig) -> anyhow::Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(cfg.request_timeout)
			.build()?;
		let cache = moka::sync::Cache::builder()
			.max_capacity(cfg.cache_capacity)
			.time_to_live(cfg.cache_ttl)
			.build();
		Ok(Self { cfg, http, cache })
	}

	/// Resolve the effective origin sequence for `process_id`, or `None` if
	/// no override applies (the caller should fall back to hash-based
	/// resolution against the default pool).
	pub async fn lookup(&self, process_id: &ProcessId) -> Option<Arc<[Origin]>> {
		if let Some(hosts) = self.cfg.overlays.process_to_host.get(process_id.as_str()) {
			return Some(hosts.clone());
		}

		if let Some(cached) = self.cache.get(process_id) {
			return cached;
		}

		let resolved = self.fetch(process_id).await;
		self.cache.insert(process_id.clone(), resolved.clone());
		resolved
	}

	async fn fetch(&self, process_id: &ProcessId) -> Option<Arc<[Origin]>> {
		let base = self.cfg.surrogate_base_url.as_ref()?;
		let url = format!("{base}/processes/{}", process_id.as_str());
		let resp = match self.http.get(&url).send().await {
			Ok(r) => r,
			Err(e) => {
				warn!(process_id = %process_id, error = %e, "bailout surrogate request failed");
				return None;
			},
		};
		if !resp.status().is_success() {
			warn!(process_id = %process_id, status = %resp.status(), "bailout surrogate returned non-2xx");
			return None;
		}
		let body: SurrogateResponse = match resp.json().await {
			Ok(b) => b,
			Err(e) => {
				warn!(process_id = %process_id, error = %e, "bailout surrogate returned malformed JSON");
				return None;
			},
		};

		if let Some(owner) = body.owner.as_deref() {
			if let Some(hosts) = self.cfg.overlays.owner_to_host.get(owner) {
				return Some(hosts.clone());
			}
		}

		let mut origins = Vec::with_capacity(body.hosts.len());
		for raw in &body.hosts {
			match Origin::parse(raw) {
				Ok(o) => origins.push(o),
				Err(e) => warn!(process_id = %process_id, error = %e, "bailout surrogate returned invalid origin"),
			}
		}
		Some(Arc::from(origins))
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration as StdDuration;

	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;

	fn pid(s: &str) -> ProcessId {
		ProcessId::new(s.to_string()).unwrap()
	}

	#[tokio::test]
	async fn process_to_host_shortcut_bypasses_surrogate() {
		let server = MockServer::start().await;
		// No mock registered: a call would fail the test via wiremock's
		// "unexpected request" panic if the shortcut didn't short-circuit.
		let mut overlays = BailoutOverlays::default();
		overlays.process_to_host.insert(
			Strng::from("P1"),
			Arc::from(vec![Origin::parse("https://z.example").unwrap()]),
		);
		let cfg = BailoutConfig {
			surrogate_base_url: Some(Strng::from(server.uri())),
			overlays,
			..Default::default()
		};
		let resolver = BailoutResolver::new(cfg).unwrap();
		let hosts = resolver.lookup(&pid("P1")).await.unwrap();
		assert_eq!(hosts.len(), 1);
		assert_eq!(hosts[0].as_str(), "https://z.example");
	}

	#[tokio::test]
	async fn surrogate_hosts_used_and_cached() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/processes/P2"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"hosts": ["https://z.example", "https://y.example"],
			})))
			.expect(1)
			.mount(&server)
			.await;

		let cfg = BailoutConfig {
			surrogate_base_url: Some(Strng::from(server.uri())),
			..Default::default()
		};
		let resolver = BailoutResolver::new(cfg).unwrap();
		let id = pid("P2");
		let first = resolver.lookup(&id).await.unwrap();
		assert_eq!(first.len(), 2);
		// Second call must hit the cache, not the surrogate again (enforced
		// by wiremock's `.expect(1)` above).
		let second = resolver.lookup(&id).await.unwrap();
		assert_eq!(second.len(), 2);
	}

	#[tokio::test]
	async fn non_200_degrades_to_no_override() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/processes/P3"))
			.respond_with(ResponseTemplate::new(500))
			.mount(&server)
			.await;

		let cfg = BailoutConfig {
			surrogate_base_url: Some(Strng::from(server.uri())),
			..Default::default()
		};
		let resolver = BailoutResolver::new(cfg).unwrap();
		assert!(resolver.lookup(&pid("P3")).await.is_none());
	}

	#[tokio::test]
	async fn owner_overlay_replaces_hosts() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/processes/P4"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"owner": "acme",
				"hosts": ["https://ignored.example"],
			})))
			.mount(&server)
			.await;

		let mut overlays = BailoutOverlays::default();
		overlays.owner_to_host.insert(
			Strng::from("acme"),
			Arc::from(vec![Origin::parse("https://acme-fleet.example").unwrap()]),
		);
		let cfg = BailoutConfig {
			surrogate_base_url: Some(Strng::from(server.uri())),
			overlays,
			..Default::default()
		};
		let resolver = BailoutResolver::new(cfg).unwrap();
		let hosts = resolver.lookup(&pid("P4")).await.unwrap();
		assert_eq!(hosts[0].as_str(), "https://acme-fleet.example");
	}

	#[test]
	fn default_ttl_is_five_minutes() {
		assert_eq!(BailoutConfig::default().cache_ttl, StdDuration::from_secs(300));
	}
}
