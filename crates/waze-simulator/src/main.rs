//! Traffic simulator entry point (§4.5, §6.1).
//!
//! Grounded on `original_source/cmd/simulation/main.go`'s `main`/`loop`: load
//! config, load a local (read-only) copy of the graph for random node
//! sampling, spawn an initial population (retrying indefinitely per car,
//! matching the original's `for { ...; continue }` loop), then drive ticks
//! at `dt = 1.0` with a 100ms wall-clock sleep between them, spawning
//! further cars at `spawn_rate` while `sim_time < 120s` (retrying up to 3
//! times before skipping a spawn, matching the original's `for range 3`).
//!
//! The original's background "artificial jam" goroutine
//! (a synthetic `TrafficReport` injected onto a hardcoded edge id every 2s)
//! is debug/demo scaffolding with no counterpart named anywhere in the
//! specification and is intentionally not carried over.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use waze_core::{Config, SimRng};
use waze_graph::load_from_json;
use waze_sim::World;

/// Simulated seconds per tick (a 10x wall-clock acceleration against the
/// 100ms sleep below).
const DT_SECS: f64 = 1.0;
const TICK_SLEEP: Duration = Duration::from_millis(100);
/// Stop admitting new spawns once simulated time passes this point (§4.5
/// driver contract, matching the original's literal `120.0`).
const SPAWN_WINDOW_END_SECS: f64 = 120.0;
/// Minimum simulated runtime before an empty car population ends the run.
const MIN_RUNTIME_SECS: f64 = 10.0;
const LOG_INTERVAL_SECS: f64 = 5.0;
const SPAWN_RETRY_ATTEMPTS: u32 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("waze_simulator=info".parse()?))
        .init();

    let config_path = resolve_config_path();
    let config = Config::load_from_file(&config_path)
        .map_err(|err| anyhow::anyhow!("failed to load config {config_path}: {err}"))?;

    let graph = load_from_json(&config.server.map_file)
        .map_err(|err| anyhow::anyhow!("failed to load map {}: {err}", config.server.map_file))?;
    let graph = std::sync::Arc::new(graph);
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );

    let server_url = format!(
        "{}{}",
        config.simulation.server_url, config.server.server_port
    );
    let virtual_start_unix_secs = unix_now();
    let mut world = World::new(
        graph.clone(),
        &server_url,
        config.physics.clone(),
        config.simulation.report_interval,
        virtual_start_unix_secs,
    );

    let mut rng = SimRng::new(virtual_start_unix_secs as u64);

    tracing::info!(num_cars = config.simulation.num_cars, "spawning initial population");
    for i in 0..config.simulation.num_cars {
        loop {
            let Some((src, dst)) = sample_distinct_nodes(&graph, &mut rng) else {
                return Err(anyhow::anyhow!("graph has fewer than two nodes to route between"));
            };
            match world.spawn_car(Some(i as i64), src, dst).await {
                Ok(_) => break,
                Err(err) => {
                    tracing::warn!(%err, "initial route request failed, retrying with a new pair");
                }
            }
        }
    }

    run_loop(&mut world, &graph, &mut rng, config.simulation.spawn_rate).await;

    tracing::info!("simulation finished");
    Ok(())
}

async fn run_loop(
    world: &mut World,
    graph: &waze_graph::Graph,
    rng: &mut SimRng,
    spawn_rate_secs: f64,
) {
    let mut last_log_secs = 0.0;
    let mut last_spawn_secs = 0.0;

    loop {
        if world.clock().sim_time_secs > MIN_RUNTIME_SECS && !world.has_active_cars() {
            tracing::info!("all cars arrived, stopping simulation");
            break;
        }

        let sim_time = world.clock().sim_time_secs;
        if sim_time - last_log_secs >= LOG_INTERVAL_SECS {
            tracing::info!(time = %format!("{sim_time:.0}"), cars = world.car_count(), "tick");
            last_log_secs = sim_time;
        }

        world.tick(DT_SECS).await;
        world.clean_arrived_cars();

        let sim_time = world.clock().sim_time_secs;
        if sim_time - last_spawn_secs >= spawn_rate_secs && sim_time < SPAWN_WINDOW_END_SECS {
            last_spawn_secs = sim_time;
            let mut spawned = false;
            for _ in 0..SPAWN_RETRY_ATTEMPTS {
                let Some((src, dst)) = sample_distinct_nodes(graph, rng) else {
                    break;
                };
                match world.spawn_car(None, src, dst).await {
                    Ok(_) => {
                        spawned = true;
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(%err, "spawn route request failed, retrying");
                    }
                }
            }
            if !spawned {
                tracing::info!("skipped spawn: could not find a valid route after retrying");
            }
        }

        tokio::time::sleep(TICK_SLEEP).await;
    }
}

/// Sample two distinct node ids uniformly at random for a spawn request.
fn sample_distinct_nodes(
    graph: &waze_graph::Graph,
    rng: &mut SimRng,
) -> Option<(waze_core::NodeId, waze_core::NodeId)> {
    let ids = graph.node_ids();
    let (a, b) = rng.gen_distinct_pair(ids.len())?;
    Some((ids[a], ids[b]))
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// `--config <path>` (or `--config=<path>`), defaulting to `config.json`,
/// matching `waze-server`'s convention.
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
