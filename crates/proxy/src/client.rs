//! C5 — Proxy Engine: forwards one request to one chosen origin and
//! classifies the result as `Success` (anything the backend answered,
//! including non-2xx) or `TransportError` (anything that means we never
//! got a backend response at all).

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

use crate::config::Timeouts;
use crate::model::Origin;

/// Hop-by-hop headers that must never be forwarded verbatim (RFC 7230
/// §6.1); standard reverse-proxy hygiene, not spec-specific.
const HOP_BY_HOP: &[&str] = &[
	"connection",
	"keep-alive",
	"proxy-authenticate",
	"proxy-authorization",
	"te",
	"trailers",
	"transfer-encoding",
	"upgrade",
];

/// The parts of the inbound request needed to build the outbound one.
/// Cloned per request, not per attempt, since none of this is consumed by
/// an attempt.
#[derive(Debug, Clone)]
pub struct ForwardRequestParts {
	pub method: Method,
	pub path_and_query: String,
	pub headers: HeaderMap,
	pub client_addr: Option<SocketAddr>,
	pub inbound_scheme: &'static str,
}

/// The outbound body, capturing whether it was buffered for restreaming
/// (multiple attempts may resend it) or is a one-shot stream (consumed on
/// the first attempt; later attempts — per spec §3's invariant — see an
/// empty body, since nothing buffered it).
pub enum ForwardBody {
	Buffered(Bytes),
	Stream(Option<Body>),
}

impl ForwardBody {
	fn take_for_attempt(&mut self) -> reqwest::Body {
		match self {
			ForwardBody::Buffered(bytes) => reqwest::Body::from(bytes.clone()),
			ForwardBody::Stream(slot) => match slot.take() {
				Some(body) => reqwest::Body::wrap_stream(body.into_data_stream()),
				None => reqwest::Body::from(Bytes::new()),
			},
		}
	}

	fn content_length(&self) -> Option<usize> {
		match self {
			ForwardBody::Buffered(bytes) => Some(bytes.len()),
			ForwardBody::Stream(_) => None,
		}
	}
}

pub enum ProxyOutcome {
	Success(Response),
	TransportError(String),
}

#[derive(Clone)]
pub struct ProxyEngine {
	client: reqwest::Client,
	timeouts: Timeouts,
}

impl ProxyEngine {
	pub fn new(timeouts: Timeouts) -> anyhow::Result<Self> {
		let client = reqwest::Client::builder()
			.connect_timeout(timeouts.connect)
			.read_timeout(timeouts.socket)
			.timeout(timeouts.proxy)
			.redirect(reqwest::redirect::Policy::limited(10))
			.pool_idle_timeout(Duration::from_secs(90))
			.build()?;
		Ok(Self { client, timeouts })
	}

	pub fn timeouts(&self) -> Timeouts {
		self.timeouts
	}

	/// Forward one attempt. `body` is taken for this attempt only —
	/// callers reuse the same `ForwardBody` across attempts so a buffered
	/// body is resent but a streamed one is not double-consumed.
	pub async fn forward(
		&self,
		parts: &ForwardRequestParts,
		origin: &Origin,
		body: &mut ForwardBody,
	) -> ProxyOutcome {
		let url = format!("{origin}{path}", origin = origin.as_str(), path = parts.path_and_query);
		let content_length = body.content_length();
		let outbound_body = body.take_for_attempt();

		let mut builder = self.client.request(parts.method.clone(), &url).body(outbound_body);
		builder = apply_headers(builder, parts, origin, content_length);

		match builder.send().await {
			Ok(resp) => ProxyOutcome::Success(into_axum_response(resp).await),
			Err(e) => ProxyOutcome::TransportError(describe_error(&e)),
		}
	}
}

fn apply_headers(
	mut builder: reqwest::RequestBuilder,
	parts: &ForwardRequestParts,
	origin: &Origin,
	content_length: Option<usize>,
) -> reqwest::RequestBuilder {
	for (name, value) in &parts.headers {
		if HOP_BY_HOP.iter().any(|h| name.as_str().eq_ignore_ascii_case(h)) {
			continue;
		}
		if name == http::header::HOST || name == http::header::CONTENT_LENGTH {
			continue;
		}
		builder = builder.header(name.clone(), value.clone());
	}

	if let Some(authority) = origin_authority(origin) {
		builder = builder.header(http::header::HOST, authority);
	}
	if let Some(client_addr) = parts.client_addr {
		let xff = match parts.headers.get("x-forwarded-for") {
			Some(existing) => format!("{}, {}", existing.to_str().unwrap_or_default(), client_addr.ip()),
			None => client_addr.ip().to_string(),
		};
		if let Ok(value) = HeaderValue::from_str(&xff) {
			builder = builder.header(HeaderName::from_static("x-forwarded-for"), value);
		}
	}
	builder = builder.header("x-forwarded-proto", parts.inbound_scheme);
	if let Some(host) = parts.headers.get(http::header::HOST) {
		builder = builder.header("x-forwarded-host", host.clone());
	}

	// Spec §4.5: for bodies with a known length (buffered for restreaming,
	// e.g. JSON dry-run bodies), recompute Content-Length explicitly rather
	// than trust whatever the inbound request claimed.
	if let Some(len) = content_length {
		builder = builder.header(http::header::CONTENT_LENGTH, len);
	}

	builder
}

fn origin_authority(origin: &Origin) -> Option<String> {
	let without_scheme = origin
		.as_str()
		.split_once("://")
		.map(|(_, rest)| rest)
		.unwrap_or(origin.as_str());
	Some(without_scheme.to_string())
}

async fn into_axum_response(resp: reqwest::Response) -> Response {
	let status = resp.status();
	let headers = resp.headers().clone();
	let stream = resp.bytes_stream();
	let mut builder = Response::builder().status(status);
	for (name, value) in headers.iter() {
		if HOP_BY_HOP.iter().any(|h| name.as_str().eq_ignore_ascii_case(h)) {
			continue;
		}
		builder = builder.header(name, value);
	}
	builder
		.body(Body::from_stream(stream))
		.unwrap_or_else(|_| Response::new(Body::empty()))
}

/// Classify a `reqwest::Error` into a short, client-safe message. Never
/// includes the origin URL — the client must not learn backend topology
/// (spec §7).
fn describe_error(e: &reqwest::Error) -> String {
	if e.is_timeout() {
		"upstream request timed out".to_string()
	} else if e.is_connect() {
		"upstream connection failed".to_string()
	} else if e.is_redirect() {
		"upstream redirect loop".to_string()
	} else {
		"upstream transport error".to_string()
	}
}
