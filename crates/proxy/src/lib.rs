//! `ao-router-proxy` — routes AO compute-unit (CU) and memory-unit (MU)
//! requests to a pool of backend hosts keyed by a per-request process id,
//! with deterministic hashing, ordered failover, an optional bailout
//! overlay, and per-unit route shaping.
//!
//! Module map, one entry per component in the design (`C1`..`C9`):
//! - [`pool`] — C1 Host Pool
//! - [`hash`] — C2 Hash Resolver
//! - [`bailout`] — C3 Bailout Resolver
//! - [`determine`] — C4 Host Determiner
//! - [`client`] — C5 Proxy Engine
//! - [`trampoline`] — C6 Failover Trampoline
//! - [`routes`] — C7 Route Binder
//! - [`redirect`] — C8 Redirect Mode
//! - [`lifecycle`] — C9 Request Lifecycle Interface

pub mod bailout;
pub mod client;
pub mod config;
pub mod determine;
pub mod error;
pub mod hash;
pub mod lifecycle;
pub mod model;
pub mod pool;
pub mod redirect;
pub mod routes;
pub mod state;
pub mod trampoline;

use std::sync::Arc;

use axum::Router;

use crate::bailout::BailoutResolver;
use crate::client::ProxyEngine;
use crate::config::{Config, Role};
use crate::determine::HostDeterminer;
use crate::lifecycle::{LifecycleSink, NoopLifecycleSink};
use crate::state::AppState;

/// Build the axum `Router` for `config`'s role and strategy. `lifecycle`
/// defaults to a no-op sink — pass a real one to wire in the (out-of-scope)
/// metrics collaborator.
pub fn build_router(config: Config, lifecycle: Option<Arc<dyn LifecycleSink>>) -> anyhow::Result<Router> {
	let engine = ProxyEngine::new(config.timeouts)?;
	let bailout = config
		.bailout
		.clone()
		.map(BailoutResolver::new)
		.transpose()?;
	let determiner = HostDeterminer::new(config.pool.clone(), bailout);

	let state = AppState {
		config: Arc::new(config.clone()),
		determiner: Arc::new(determiner),
		engine: Arc::new(engine),
		lifecycle: lifecycle.unwrap_or_else(|| Arc::new(NoopLifecycleSink)),
	};

	let role_router = match config.role {
		Role::Cu => routes::cu::router(),
		Role::Mu => routes::mu::router(),
	};

	Ok(role_router.with_state(state))
}

#[cfg(test)]
mod tests {
	use axum::body::Body;
	use axum::http::{Request, StatusCode};
	use tower::ServiceExt;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;
	use crate::config::{RawConfig, Strategy};

	async fn cu_config(hosts: Vec<String>) -> Config {
		Config::from_raw(RawConfig {
			role: Some(crate::config::Role::Cu),
			hosts,
			..Default::default()
		})
		.unwrap()
	}

	#[tokio::test]
	async fn missing_process_id_returns_404_without_contacting_backend() {
		let backend = MockServer::start().await;
		// No mocks registered — any request to the backend would panic the
		// mock server as unexpected.
		let config = cu_config(vec![backend.uri()]).await;
		let router = build_router(config, None).unwrap();

		let response = router
			.oneshot(
				Request::builder()
					.method("POST")
					.uri("/dry-run")
					.body(Body::from("{}"))
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::NOT_FOUND);
		let body = http_body_util::BodyExt::collect(response.into_body())
			.await
			.unwrap()
			.to_bytes();
		let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
		assert_eq!(json["error"], "Process id not found on request");
	}

	#[tokio::test]
	async fn successful_proxy_returns_backend_response() {
		let backend = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/state/P1"))
			.respond_with(ResponseTemplate::new(200).set_body_string("running"))
			.mount(&backend)
			.await;

		let config = cu_config(vec![backend.uri()]).await;
		let router = build_router(config, None).unwrap();

		let response = router
			.oneshot(
				Request::builder()
					.method("GET")
					.uri("/state/P1")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
	}

	#[tokio::test]
	async fn backend_500_passes_through_without_failover() {
		let backend_a = MockServer::start().await;
		let backend_b = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(500).set_body_string("boom"))
			.expect(1)
			.mount(&backend_a)
			.await;
		// backend_b must never be contacted: a non-2xx is Success, not
		// TransportError, so there is no failover.

		// Force the pool ordering so attempt 0 always lands on backend_a by
		// making it the only entry in the effective pool via a
		// process-specific bailout override.
		let mut overlays = crate::bailout::BailoutOverlays::default();
		overlays.process_to_host.insert(
			ao_router_core::Strng::from("P1"),
			std::sync::Arc::from(vec![crate::model::Origin::parse(&backend_a.uri()).unwrap()]),
		);
		let mut config = cu_config(vec![backend_a.uri(), backend_b.uri()]).await;
		config.bailout = Some(crate::bailout::BailoutConfig {
			overlays,
			..Default::default()
		});
		let router = build_router(config, None).unwrap();

		let response = router
			.oneshot(
				Request::builder()
					.method("GET")
					.uri("/state/P1")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[tokio::test]
	async fn redirect_mode_responds_302_without_proxying() {
		let backend = MockServer::start().await;
		let mut config = cu_config(vec![backend.uri()]).await;
		config.strategy = Strategy::Redirect;
		let router = build_router(config, None).unwrap();

		let response = router
			.oneshot(
				Request::builder()
					.method("GET")
					.uri("/state/P1")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::FOUND);
		let location = response.headers().get(http::header::LOCATION).unwrap().to_str().unwrap();
		assert!(location.ends_with("/state/P1"));
	}
}
