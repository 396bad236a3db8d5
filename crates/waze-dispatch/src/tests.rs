use std::sync::Arc;

use waze_core::{NodeId, Point2D};
use waze_graph::{AStarRouter, GraphBuilder};

use crate::Dispatcher;

fn tiny_graph() -> Arc<waze_graph::Graph> {
    let mut b = GraphBuilder::new();
    b.add_node(NodeId(0), "a", Point2D::new(0.0, 0.0));
    b.add_node(NodeId(1), "b", Point2D::new(1.0, 0.0));
    b.add_directed_edge(waze_core::EdgeId(0), NodeId(0), NodeId(1), 1.0, 60.0)
        .unwrap();
    Arc::new(b.build())
}

/// S5 — every submitted request receives exactly one response, none
/// dropped, even with many more requests in flight than workers.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_request_gets_exactly_one_response() {
    let graph = tiny_graph();
    let router = Arc::new(AStarRouter::default());
    let dispatcher = Dispatcher::spawn(graph, router, 4);

    let mut handles = Vec::new();
    for _ in 0..200 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            dispatcher.submit(NodeId(0), NodeId(1)).await
        }));
    }

    let mut ok_count = 0;
    for h in handles {
        let outer = h.await.expect("task panicked");
        let inner = outer.expect("dispatcher closed");
        assert!(inner.is_ok());
        ok_count += 1;
    }
    assert_eq!(ok_count, 200);
}
