//! The two routing-server endpoints (§4.4).
//!
//! Grounded on `SolverForge-solverforge-quickstarts/rust/vehicle-routing/src/api.rs`'s
//! `AppState`/`create_router` shape (the teacher itself has no HTTP layer);
//! endpoint semantics (traffic-batch chunked fan-out, blocking-read-of-
//! dispatcher-response navigate handler, exact status codes) are grounded on
//! `original_source/internal/server/server.go`'s `HandleTrafficBatch` /
//! `HandleNavigation`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use waze_core::{EdgeId, NodeId};
use waze_dispatch::Dispatcher;
use waze_graph::{Graph, GraphError};
use waze_wire::{ErrorResponse, NavigateResponse, TrafficReport};

/// Traffic batches are partitioned into at most this many parallel chunks
/// (§4.4).
const MAX_TRAFFIC_CHUNKS: usize = 8;

pub struct AppState {
    pub graph: Arc<Graph>,
    pub dispatcher: Dispatcher,
    pub alpha: f64,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/traffic", post(handle_traffic))
        .route("/api/navigate", get(handle_navigate))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// `POST /api/traffic` — apply a batch of speed observations.
///
/// A malformed body is parsed manually (rather than via axum's `Json`
/// extractor) so a parse failure always maps to exactly 400, matching §4.4's
/// status-code contract independent of axum's own rejection mapping.
/// Non-POST requests never reach this handler — axum answers 405 for any
/// other method on a routed path automatically.
async fn handle_traffic(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let reports: Vec<TrafficReport> = match serde_json::from_slice(&body) {
        Ok(reports) => reports,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response();
        }
    };

    if reports.is_empty() {
        return StatusCode::OK.into_response();
    }

    let graph = state.graph.clone();
    let alpha = state.alpha;
    let chunk_count = reports.len().min(MAX_TRAFFIC_CHUNKS).max(1);
    let chunk_size = reports.len().div_ceil(chunk_count);

    tokio::task::spawn_blocking(move || {
        use rayon::prelude::*;
        reports.par_chunks(chunk_size).for_each(|chunk| {
            for report in chunk {
                if report.is_sentinel() {
                    continue;
                }
                graph.update_speed(EdgeId(report.edge_id), report.speed, alpha);
            }
        });
    })
    .await
    .expect("traffic ingest task panicked");

    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
struct NavigateQuery {
    from: u32,
    to: u32,
}

/// `GET /api/navigate?from=<int>&to=<int>` — submit a routing request to the
/// dispatcher and await its result (§4.4).
async fn handle_navigate(
    State(state): State<Arc<AppState>>,
    Query(q): Query<NavigateQuery>,
) -> Response {
    let from = NodeId(q.from);
    let to = NodeId(q.to);

    match state.dispatcher.submit(from, to).await {
        Ok(Ok(route)) => Json(NavigateResponse {
            route: route.edges.iter().map(|e| e.0).collect(),
            eta: route.eta_minutes,
            distance: route.distance_km,
        })
        .into_response(),
        Ok(Err(err)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format_route_error(&err),
            }),
        )
            .into_response(),
        Err(_closed) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "routing dispatcher is shutting down".to_string(),
            }),
        )
            .into_response(),
    }
}

fn format_route_error(err: &GraphError) -> String {
    err.to_string()
}
