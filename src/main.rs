//! httpsql server
//!
//! Connects to the configured backend and serves the table API over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # PostgreSQL on host "db"
//! httpsql
//!
//! # Cassandra cluster with credentials
//! DB_PROVIDER=cassandra DB_HOST=c1,c2,c3 DB_USER=app DB_PASS=secret httpsql
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use httpsql::{http, ConnectionConfig, Database, Provider, RequestMetrics};

/// Schema-declared tables over HTTP
#[derive(Parser, Debug)]
#[command(name = "httpsql", version)]
struct Args {
    /// Storage backend
    #[arg(long, default_value = "postgres", env = "DB_PROVIDER")]
    provider: String,

    /// Backend host, or comma-separated seed hosts
    #[arg(long, default_value = "db", env = "DB_HOST")]
    host: String,

    /// Backend port (defaults to the provider's port)
    #[arg(long, env = "DB_PORT")]
    port: Option<u16>,

    /// Backend user
    #[arg(long, env = "DB_USER")]
    user: Option<String>,

    /// Backend password
    #[arg(long, env = "DB_PASS", hide_env_values = true)]
    password: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, default_value = "0.0.0.0:80", env = "HTTPSQL_LISTEN")]
    listen: SocketAddr,

    /// Enable debug logging, including every generated statement
    #[arg(long, env = "DEBUG", value_parser = FalseyValueParser::new())]
    debug: bool,

    /// Count and time requests and serve them on /metrics
    #[arg(
        long,
        env = "EXPOSE_METRICS",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = FalseyValueParser::new()
    )]
    expose_metrics: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_new(format!("httpsql={level},tower_http={level}"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let provider: Provider = args.provider.parse()?;
    let config = ConnectionConfig::new(provider, &args.host)
        .with_port(args.port)
        .with_credentials(args.user, args.password);

    let db = Database::connect(&config)
        .await
        .context("unable to connect to the database")?;

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("unable to listen on {}", args.listen))?;
    info!("listening on {}", args.listen);

    let app = if args.expose_metrics {
        http::router_with_metrics(db, Arc::new(RequestMetrics::new()))
    } else {
        http::router(db)
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("unable to listen for shutdown signal: {}", e);
    }
    info!("shutdown signal received");
}
