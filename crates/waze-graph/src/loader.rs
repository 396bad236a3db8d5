//! Map-file loader.
//!
//! The map file is a persisted artifact only in the sense that it's read
//! from disk at startup — its on-disk lifecycle (versioning, regeneration by
//! the external connectivity pre-processor) is out of scope here; this
//! module only has to parse the schema in §6 and build a [`Graph`] from it.
//!
//! Map files are assumed to already be filtered to a single strongly
//! connected component by that external pre-processor. This loader does not
//! verify or enforce connectivity: a disconnected map simply makes some
//! [`crate::router::Router::route`] calls return
//! [`GraphError::NoPath`](crate::error::GraphError::NoPath) rather than
//! corrupting any state.

use std::path::Path;

use serde::Deserialize;

use waze_core::{EdgeId, NodeId, Point2D};

use crate::error::GraphError;
use crate::network::{Graph, GraphBuilder};

#[derive(Deserialize)]
struct MapFile {
    nodes: Vec<MapNode>,
    edges: Vec<MapEdge>,
}

#[derive(Deserialize)]
struct MapNode {
    id: u32,
    name: String,
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct MapEdge {
    #[allow(dead_code)]
    id: u32,
    from: u32,
    to: u32,
    length: f64,
    speedlimit: f64,
}

/// Load a [`Graph`] from a map file at `path`.
///
/// Edges referencing a missing endpoint are skipped with a `tracing::warn!`
/// rather than failing the whole load, matching the original loader's
/// tolerance for partially-broken extracts.
pub fn load_from_json(path: impl AsRef<Path>) -> Result<Graph, GraphError> {
    let data = std::fs::read_to_string(path)?;
    let map: MapFile = serde_json::from_str(&data)?;

    let mut builder = GraphBuilder::new();
    for node in &map.nodes {
        builder.add_node(NodeId(node.id), node.name.clone(), Point2D::new(node.x, node.y));
    }

    for edge in &map.edges {
        let from = NodeId(edge.from);
        let to = NodeId(edge.to);
        if let Err(err) = builder.add_directed_edge(
            EdgeId(edge.id),
            from,
            to,
            edge.length,
            edge.speedlimit,
        ) {
            tracing::warn!(edge_id = edge.id, %err, "skipping edge with missing endpoint");
        }
    }

    Ok(builder.build())
}
