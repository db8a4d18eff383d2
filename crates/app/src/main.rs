use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ao_router_proxy::config::{Config, RawConfig, Role};
use clap::Parser;
use tracing::{info, warn};

/// How long the server waits for in-flight requests to drain after a
/// termination signal before giving up and exiting anyway (spec §1/§5).
const DRAIN_DEADLINE: Duration = Duration::from_secs(30);

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

#[derive(Parser, Debug)]
#[command(about = "AO compute-unit / memory-unit request router", long_about = None)]
struct Args {
	/// Path to the YAML config file (overrides AO_ROUTER_CONFIG).
	#[arg(short, long, value_name = "file")]
	config: Option<PathBuf>,

	/// Listen port (overrides the config file and AO_ROUTER_PORT).
	#[arg(short, long, value_name = "port")]
	port: Option<u16>,

	/// Role: `cu` or `mu` (overrides the config file and AO_ROUTER_ROLE).
	#[arg(short, long, value_name = "role")]
	role: Option<String>,
}

fn main() -> anyhow::Result<()> {
	tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.build()?
		.block_on(run())
}

async fn run() -> anyhow::Result<()> {
	let args = Args::parse();

	let config_path = args
		.config
		.clone()
		.or_else(|| std::env::var("AO_ROUTER_CONFIG").ok().map(PathBuf::from))
		.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

	let mut raw = if config_path.exists() {
		RawConfig::from_file(&config_path).await?
	} else {
		warn!(path = %config_path.display(), "no config file found, starting from defaults");
		RawConfig::default()
	};

	if let Some(port) = args.port.or_else(|| env_u16("AO_ROUTER_PORT")) {
		raw.port = Some(port);
	}
	if let Some(role) = args.role.clone().or_else(|| std::env::var("AO_ROUTER_ROLE").ok()) {
		raw.role = Some(parse_role(&role)?);
	}

	let config = Config::from_raw(raw)?;
	init_tracing(&config.logging_filter);

	info!(role = ?config.role, port = config.port, hosts = config.pool.len(), "starting ao-router");

	let router = ao_router_proxy::build_router(config.clone(), None)?;
	let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
	let listener = tokio::net::TcpListener::bind(addr).await?;
	info!(%addr, "listening");

	axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	info!("shutdown complete");
	Ok(())
}

fn env_u16(name: &str) -> Option<u16> {
	std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_role(s: &str) -> anyhow::Result<Role> {
	match s.to_ascii_lowercase().as_str() {
		"cu" => Ok(Role::Cu),
		"mu" => Ok(Role::Mu),
		other => anyhow::bail!("unknown role {other:?}, expected `cu` or `mu`"),
	}
}

fn init_tracing(config_filter: &str) {
	use tracing_subscriber::EnvFilter;
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_filter));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves once a termination signal arrives, letting `axum::serve` stop
/// accepting new connections and drain in-flight ones. A hard deadline timer
/// starts at the same moment so a stuck drain can't hang the process forever.
async fn shutdown_signal() {
	let ctrl_c = async {
		tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
	};

	#[cfg(unix)]
	let terminate = async {
		tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
			.expect("failed to install SIGTERM handler")
			.recv()
			.await;
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("termination signal received, draining in-flight requests (deadline {:?})", DRAIN_DEADLINE);
	tokio::spawn(async {
		tokio::time::sleep(DRAIN_DEADLINE).await;
		warn!("drain deadline exceeded, forcing exit");
		std::process::exit(1);
	});
}
