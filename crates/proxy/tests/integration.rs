//! End-to-end exercises of the built router, as opposed to the unit and
//! composition tests colocated with each module. Spins up real `wiremock`
//! backends and drives requests through `build_router` with
//! `tower::ServiceExt::oneshot`, the way the teacher's own
//! `tests/tests/smoke.rs` drives a full gateway through one HTTP call.

use ao_router_proxy::bailout::{BailoutConfig, BailoutOverlays};
use ao_router_proxy::build_router;
use ao_router_proxy::config::{Config, RawConfig, Role};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn trampoline_fails_over_past_an_unreachable_origin() {
	let backend = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/state/P1"))
		.respond_with(ResponseTemplate::new(200).set_body_string("running"))
		.mount(&backend)
		.await;

	// Port 1 is reserved and nothing listens there, so the first attempt is
	// guaranteed a transport error rather than a real (even if unexpected)
	// HTTP response.
	let unreachable = "http://127.0.0.1:1".to_string();
	let mut overlays = BailoutOverlays::default();
	overlays.process_to_host.insert(
		ao_router_core::Strng::from("P1"),
		std::sync::Arc::from(vec![
			ao_router_proxy::model::Origin::parse(&unreachable).unwrap(),
			ao_router_proxy::model::Origin::parse(&backend.uri()).unwrap(),
		]),
	);

	let mut config = Config::from_raw(RawConfig {
		role: Some(Role::Cu),
		hosts: vec![backend.uri()],
		..Default::default()
	})
	.unwrap();
	config.bailout = Some(BailoutConfig {
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
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn trampoline_returns_bad_gateway_once_every_attempt_is_unreachable() {
	let mut overlays = BailoutOverlays::default();
	overlays.process_to_host.insert(
		ao_router_core::Strng::from("P2"),
		std::sync::Arc::from(vec![
			ao_router_proxy::model::Origin::parse("http://127.0.0.1:1").unwrap(),
			ao_router_proxy::model::Origin::parse("http://127.0.0.1:2").unwrap(),
		]),
	);

	let mut config = Config::from_raw(RawConfig {
		role: Some(Role::Cu),
		hosts: vec!["https://placeholder.example".to_string()],
		..Default::default()
	})
	.unwrap();
	config.bailout = Some(BailoutConfig {
		overlays,
		..Default::default()
	});
	let router = build_router(config, None).unwrap();

	let response = router
		.oneshot(
			Request::builder()
				.method("GET")
				.uri("/state/P2")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn mu_submit_message_proxies_process_id_from_path() {
	let backend = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/message/P9"))
		.respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
		.mount(&backend)
		.await;

	let config = Config::from_raw(RawConfig {
		role: Some(Role::Mu),
		hosts: vec![backend.uri()],
		..Default::default()
	})
	.unwrap();
	let router = build_router(config, None).unwrap();

	let response = router
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/message/P9")
				.body(Body::from(r#"{"data":"hello"}"#))
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn healthcheck_responds_without_a_process_id_or_backend_call() {
	let backend = MockServer::start().await;
	// No mock registered on purpose: a call into the backend would panic.
	let config = Config::from_raw(RawConfig {
		role: Some(Role::Cu),
		hosts: vec![backend.uri()],
		..Default::default()
	})
	.unwrap();
	let router = build_router(config, None).unwrap();

	let response = router
		.oneshot(Request::builder().uri("/healthcheck").body(Body::empty()).unwrap())
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
}
