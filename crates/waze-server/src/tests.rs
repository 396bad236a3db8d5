//! HTTP-level integration tests for `/api/traffic` and `/api/navigate`,
//! exercised through the router directly via `tower::ServiceExt::oneshot`
//! rather than a bound socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use waze_core::{EdgeId, NodeId, Point2D};
use waze_dispatch::Dispatcher;
use waze_graph::{AStarRouter, Graph, GraphBuilder};
use waze_wire::{NavigateResponse, TrafficReport};

use crate::http::{create_router, AppState};

fn minimal_graph() -> Arc<Graph> {
    let mut b = GraphBuilder::new();
    b.add_node(NodeId(0), "a", Point2D::new(0.0, 0.0));
    b.add_node(NodeId(1), "b", Point2D::new(1.0, 0.0));
    b.add_node(NodeId(2), "c", Point2D::new(3.0, 0.0));
    b.add_directed_edge(EdgeId(10), NodeId(0), NodeId(1), 1.0, 60.0).unwrap();
    b.add_directed_edge(EdgeId(11), NodeId(1), NodeId(2), 2.0, 60.0).unwrap();
    Arc::new(b.build())
}

fn test_app() -> axum::Router {
    let graph = minimal_graph();
    let router = Arc::new(AStarRouter::default());
    let dispatcher = Dispatcher::spawn(graph.clone(), router, 2);
    let state = Arc::new(AppState {
        graph,
        dispatcher,
        alpha: 0.5,
    });
    create_router(state)
}

/// S1 — `GET /api/navigate?from=0&to=2` returns the expected route/eta/distance.
#[tokio::test]
async fn navigate_returns_route_on_success() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/navigate?from=0&to=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: NavigateResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed.route, vec![10, 11]);
    assert!((parsed.distance - 3.0).abs() < 1e-9);
    assert!((parsed.eta - 3.0).abs() < 1e-9);
}

/// S2 — no path (edges are one-directional) maps to 404.
#[tokio::test]
async fn navigate_returns_404_for_no_path() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/navigate?from=2&to=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn navigate_returns_400_for_malformed_query() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/navigate?from=not-a-number&to=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn navigate_rejects_non_get_with_405() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/navigate?from=0&to=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn traffic_applies_reports_and_skips_sentinel() {
    let graph = minimal_graph();
    let router = Arc::new(AStarRouter::default());
    let dispatcher = Dispatcher::spawn(graph.clone(), router, 2);
    let state = Arc::new(AppState {
        graph: graph.clone(),
        dispatcher,
        alpha: 0.5,
    });
    let app = create_router(state);

    let reports = vec![
        TrafficReport {
            car_id: 1,
            edge_id: 10,
            speed: 30.0,
            timestamp: 0,
        },
        // Sentinel slot: must be skipped, not applied to edge 11.
        TrafficReport {
            car_id: -1,
            edge_id: 11,
            speed: 999.0,
            timestamp: 0,
        },
    ];

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/traffic")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&reports).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // S3: edge 10 blends toward the measured 30.0 km/h.
    let speed = graph.current_speed(EdgeId(10)).unwrap();
    assert!((speed - 40.0).abs() < 1e-9, "got {speed}");
    // The sentinel-carrying report must never have touched edge 11.
    assert_eq!(graph.current_speed(EdgeId(11)), Some(60.0));
}

#[tokio::test]
async fn traffic_rejects_malformed_body_with_400() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/traffic")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
