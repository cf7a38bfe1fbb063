use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use sr_containers::{ContainerDriver, DockerDriver};
use sr_domain::config::{Config, ConfigSeverity};
use sr_gateway::api;
use sr_gateway::cli::{Cli, Command};
use sr_gateway::ingest::filter::SegmentFilter;
use sr_gateway::state::AppState;
use sr_store::{ControlStore, MeetingRepo, SegmentRepo, TenantRepo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            init_tracing();
            run_server(Config::from_env()).await
        }
        Some(Command::Doctor) => {
            let passed = sr_gateway::cli::doctor(&Config::from_env()).await?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Version) => {
            println!("scriberelay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Structured JSON tracing; `RUST_LOG` wins, then `LOG_LEVEL`, then the
/// built-in default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| std::env::var("LOG_LEVEL").map(EnvFilter::new))
        .unwrap_or_else(|_| EnvFilter::new("info,sr_gateway=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();
}

/// Start the gateway with the given configuration. Any startup failure —
/// invalid config, unreachable backing store or control plane — propagates
/// out and exits the process non-zero.
async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("ScribeRelay starting");

    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }
    let config = Arc::new(config);

    // ── Redis control store ──────────────────────────────────────────
    let control = ControlStore::connect(&config.redis.url(), Duration::from_secs(5))
        .await
        .context("connecting to redis")?;
    control.ping().await.context("pinging redis")?;
    tracing::info!(url = %config.redis.url(), "control store ready");

    // ── Database ─────────────────────────────────────────────────────
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await
        .context("connecting to the database")?;
    sr_store::MIGRATOR
        .run(&pool)
        .await
        .context("applying database migrations")?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "database pool ready"
    );

    // ── Container control plane (fail fast if unreachable) ──────────
    let driver: Arc<dyn ContainerDriver> = Arc::new(DockerDriver::new(&config.containers));
    driver
        .ping()
        .await
        .context("pinging the container control plane")?;
    tracing::info!(
        socket = %config.containers.socket_path,
        image = %config.containers.image,
        network = %config.containers.network,
        "container driver ready"
    );

    // ── App state ────────────────────────────────────────────────────
    let state = AppState {
        config: config.clone(),
        control,
        pool: pool.clone(),
        tenants: TenantRepo::new(pool.clone()),
        meetings: MeetingRepo::new(pool.clone()),
        segments: SegmentRepo::new(pool),
        driver,
        filter: Arc::new(SegmentFilter::new()),
    };

    // ── Router ───────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = api::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(tower::limit::ConcurrencyLimitLayer::new(256))
        .with_state(state);

    // ── Bind ─────────────────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    tracing::info!(addr = %addr, "ScribeRelay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("axum server error")?;

    tracing::info!("ScribeRelay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
    }
}
