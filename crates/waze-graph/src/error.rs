//! Graph/routing error type.

use thiserror::Error;

use waze_core::{EdgeId, NodeId};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("node {0} not found in graph")]
    UnknownNode(NodeId),

    #[error("edge {0} not found in graph")]
    UnknownEdge(EdgeId),

    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse map file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
