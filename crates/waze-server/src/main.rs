//! Routing server entry point (§6.1).
//!
//! Grounded on `SolverForge-solverforge-quickstarts/rust/vehicle-routing/src/main.rs`'s
//! `tokio::main` + `tracing_subscriber::fmt()` + `axum::serve` shape, and on
//! `original_source/cmd/server/main.go`'s startup sequence (load config →
//! load graph → spawn workers → register handlers → listen) — the
//! WebSocket hub and static GUI file server are Non-goals (§1) and have no
//! counterpart here.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use waze_core::Config;
use waze_dispatch::Dispatcher;
use waze_graph::{load_from_json, AStarRouter};
use waze_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("waze_server=info".parse()?))
        .init();

    let config_path = resolve_config_path();
    let config = Config::load_from_file(&config_path)
        .map_err(|err| anyhow::anyhow!("failed to load config {config_path}: {err}"))?;

    let graph = Arc::new(
        load_from_json(&config.server.map_file)
            .map_err(|err| anyhow::anyhow!("failed to load map {}: {err}", config.server.map_file))?,
    );
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );

    let worker_count = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    tracing::info!(worker_count, "spawning routing dispatcher");
    let router = Arc::new(AStarRouter::default());
    let dispatcher = Dispatcher::spawn(graph.clone(), router, worker_count);

    let alpha = config.physics.alpha;
    let state = Arc::new(AppState {
        graph,
        dispatcher,
        alpha,
    });
    let app = create_router(state);

    let addr = parse_listen_addr(&config.server.server_port)?;
    tracing::info!(%addr, "waze-server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// `--config <path>` (or `--config=<path>`), defaulting to `config.json`
/// (§6.1).
fn resolve_config_path() -> String {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return path;
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    "config.json".to_string()
}

/// The config schema's `server_port` follows Go's `net.Listen` convention of
/// a bare `":8080"` bind address.
fn parse_listen_addr(server_port: &str) -> anyhow::Result<SocketAddr> {
    let port_part = server_port.trim_start_matches(':');
    let port: u16 = port_part.parse()?;
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}
