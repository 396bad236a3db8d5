//! Road network representation: nodes, directed edges, and the concurrent
//! edge-speed estimator.
//!
//! # Data layout
//!
//! Node and edge identities are whatever arbitrary integers a map file
//! assigns them (they need not be dense or start at zero) — mirroring the
//! original map-keyed `Nodes`/`Edges` representation. Internally, `Graph`
//! still lays out all per-node and per-edge data in dense, zero-based CSR
//! arrays for cache-friendly traversal, and keeps a small hash-map index
//! from external id to dense position at the boundary:
//!
//! ```text
//! out_edges(dense_node) = node_out_start[dense_node] .. node_out_start[dense_node + 1]
//! ```
//!
//! Edges are grouped by source node using a *stable* sort, so two parallel
//! edges between the same pair of nodes keep their original insertion
//! order — required by §4.2's reconstruction tie-break.

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use waze_core::{EdgeId, NodeId, Point2D};

use crate::error::GraphError;

/// Clamp bounds and default floor used by the speed estimator (§4.1, §4.2).
pub(crate) const MIN_SPEED_KMH: f64 = 1.0;

// ── Graph ─────────────────────────────────────────────────────────────────────

/// A directed road network with dense CSR adjacency and atomic per-edge
/// current speeds.
///
/// Topology (`node_*`, `edge_from`/`edge_to`/`edge_length_km`/
/// `edge_speed_limit_kmh`) is immutable after [`build`](GraphBuilder::build).
/// Only `edge_current_speed` mutates, via [`Graph::update_speed`].
pub struct Graph {
    // ── Node data (dense index = position in these Vecs) ───────────────────
    node_id: Vec<NodeId>,
    node_name: Vec<String>,
    node_pos: Vec<Point2D>,
    node_out_start: Vec<u32>,
    node_index: FxHashMap<NodeId, u32>,

    // ── Edge data (dense index = position in these Vecs, sorted by source) ─
    edge_id: Vec<EdgeId>,
    edge_from: Vec<NodeId>,
    edge_to: Vec<NodeId>,
    edge_to_dense: Vec<u32>,
    edge_length_km: Vec<f64>,
    edge_speed_limit_kmh: Vec<f64>,
    edge_current_speed: Vec<AtomicU64>,
    edge_index: FxHashMap<EdgeId, u32>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.node_id.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_id.len()
    }

    /// All node ids, for uniform random sampling (spawn src/dst selection).
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_id
    }

    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        let dense = *self.node_index.get(&node)?;
        Some(self.node_name[dense as usize].as_str())
    }

    pub fn node_pos(&self, node: NodeId) -> Option<Point2D> {
        let dense = *self.node_index.get(&node)?;
        Some(self.node_pos[dense as usize])
    }

    pub fn has_node(&self, node: NodeId) -> bool {
        self.node_index.contains_key(&node)
    }

    pub fn has_edge(&self, edge: EdgeId) -> bool {
        self.edge_index.contains_key(&edge)
    }

    pub fn edge_from(&self, edge: EdgeId) -> Option<NodeId> {
        let dense = *self.edge_index.get(&edge)?;
        Some(self.edge_from[dense as usize])
    }

    pub fn edge_to(&self, edge: EdgeId) -> Option<NodeId> {
        let dense = *self.edge_index.get(&edge)?;
        Some(self.edge_to[dense as usize])
    }

    pub fn edge_length_km(&self, edge: EdgeId) -> Option<f64> {
        let dense = *self.edge_index.get(&edge)?;
        Some(self.edge_length_km[dense as usize])
    }

    pub fn edge_speed_limit_kmh(&self, edge: EdgeId) -> Option<f64> {
        let dense = *self.edge_index.get(&edge)?;
        Some(self.edge_speed_limit_kmh[dense as usize])
    }

    /// Lock-free read of an edge's current speed (km/h).
    pub fn current_speed(&self, edge: EdgeId) -> Option<f64> {
        let dense = *self.edge_index.get(&edge)?;
        Some(f64::from_bits(
            self.edge_current_speed[dense as usize].load(Ordering::Acquire),
        ))
    }

    /// Iterator over the outgoing `EdgeId`s of `node`, in stored adjacency
    /// order (stable across parallel edges).
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let range = self
            .node_index
            .get(&node)
            .map(|&dense| {
                let start = self.node_out_start[dense as usize] as usize;
                let end = self.node_out_start[dense as usize + 1] as usize;
                start..end
            })
            .unwrap_or(0..0);
        range.map(move |i| self.edge_id[i])
    }

    /// Internal-use traversal: dense node position → outgoing (dense edge
    /// idx, to-node dense idx) pairs. Used by the router's hot loop to avoid
    /// repeated hash lookups.
    pub(crate) fn out_edges_dense(&self, dense_node: u32) -> impl Iterator<Item = u32> + '_ {
        let start = self.node_out_start[dense_node as usize] as usize;
        let end = self.node_out_start[dense_node as usize + 1] as usize;
        start as u32..end as u32
    }

    pub(crate) fn dense_of(&self, node: NodeId) -> Option<u32> {
        self.node_index.get(&node).copied()
    }

    pub(crate) fn node_id_of_dense(&self, dense: u32) -> NodeId {
        self.node_id[dense as usize]
    }

    pub(crate) fn edge_to_dense(&self, dense_edge: u32) -> u32 {
        self.edge_to_dense[dense_edge as usize]
    }

    pub(crate) fn edge_external_id(&self, dense_edge: u32) -> EdgeId {
        self.edge_id[dense_edge as usize]
    }

    pub(crate) fn edge_length_km_dense(&self, dense_edge: u32) -> f64 {
        self.edge_length_km[dense_edge as usize]
    }

    pub(crate) fn edge_speed_limit_kmh_dense(&self, dense_edge: u32) -> f64 {
        self.edge_speed_limit_kmh[dense_edge as usize]
    }

    pub(crate) fn current_speed_dense(&self, dense_edge: u32) -> f64 {
        f64::from_bits(self.edge_current_speed[dense_edge as usize].load(Ordering::Acquire))
    }

    pub(crate) fn node_pos_dense(&self, dense: u32) -> Point2D {
        self.node_pos[dense as usize]
    }

    /// Dense position of `edge`'s source node — used only during route
    /// reconstruction, which walks backward edge by edge.
    pub(crate) fn edge_from_dense(&self, dense_edge: u32) -> u32 {
        self.node_index[&self.edge_from[dense_edge as usize]]
    }

    /// Apply a single measured-speed observation to `edge`'s current-speed
    /// cell using the CAS retry loop from §4.1.
    ///
    /// Silently ignores non-positive `measured_speed_kmh` (sentinel reports
    /// already filtered out upstream, but this keeps the estimator itself
    /// total). Returns `false` if `edge` doesn't exist.
    pub fn update_speed(&self, edge: EdgeId, measured_speed_kmh: f64, alpha: f64) -> bool {
        let Some(&dense) = self.edge_index.get(&edge) else {
            return false;
        };
        if measured_speed_kmh <= 0.0 {
            return true;
        }

        let length_km = self.edge_length_km[dense as usize];
        let speed_limit = self.edge_speed_limit_kmh[dense as usize];
        let cell = &self.edge_current_speed[dense as usize];
        let clamp_max = 1.5 * speed_limit;

        loop {
            let current_bits = cell.load(Ordering::Acquire);
            let current = f64::from_bits(current_bits);
            let current = if current <= 0.0 { speed_limit } else { current };

            let t_current = length_km / current;
            let t_measured = length_km / measured_speed_kmh;
            let t_blended = alpha * t_measured + (1.0 - alpha) * t_current;
            let new_speed = (length_km / t_blended).clamp(MIN_SPEED_KMH, clamp_max);

            match cell.compare_exchange_weak(
                current_bits,
                new_speed.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(_) => continue,
            }
        }
    }
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

struct RawNode {
    id: NodeId,
    name: String,
    pos: Point2D,
}

struct RawEdge {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    length_km: f64,
    speed_limit_kmh: f64,
}

/// Incrementally construct a [`Graph`], then call [`build`](Self::build).
///
/// Edges referencing a node id not added via [`add_node`](Self::add_node)
/// are rejected with [`GraphError::UnknownNode`] rather than silently
/// dropped — the JSON loader (`loader.rs`) is the layer that implements the
/// "skip with a warning" policy from §6, by calling `add_node` for every
/// node up front and simply not calling `add_directed_edge` for bad edges.
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<RawNode>,
    edges: Vec<RawEdge>,
    node_ids_seen: FxHashMap<NodeId, ()>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId, name: impl Into<String>, pos: Point2D) {
        self.node_ids_seen.insert(id, ());
        self.nodes.push(RawNode {
            id,
            name: name.into(),
            pos,
        });
    }

    /// Add a directed edge. Returns `Err` if either endpoint hasn't been
    /// added via `add_node` yet.
    pub fn add_directed_edge(
        &mut self,
        id: EdgeId,
        from: NodeId,
        to: NodeId,
        length_km: f64,
        speed_limit_kmh: f64,
    ) -> Result<(), GraphError> {
        if !self.node_ids_seen.contains_key(&from) {
            return Err(GraphError::UnknownNode(from));
        }
        if !self.node_ids_seen.contains_key(&to) {
            return Err(GraphError::UnknownNode(to));
        }
        self.edges.push(RawEdge {
            id,
            from,
            to,
            length_km,
            speed_limit_kmh,
        });
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Consume the builder and produce a [`Graph`].
    pub fn build(self) -> Graph {
        let node_count = self.nodes.len();

        let mut node_id = Vec::with_capacity(node_count);
        let mut node_name = Vec::with_capacity(node_count);
        let mut node_pos = Vec::with_capacity(node_count);
        let mut node_index = FxHashMap::default();
        node_index.reserve(node_count);

        for (dense, n) in self.nodes.into_iter().enumerate() {
            node_index.insert(n.id, dense as u32);
            node_id.push(n.id);
            node_name.push(n.name);
            node_pos.push(n.pos);
        }

        // Stable sort by source node's dense position — preserves
        // insertion order among parallel edges sharing a source.
        let mut edges = self.edges;
        edges.sort_by_key(|e| node_index[&e.from]);

        let edge_count = edges.len();
        let mut edge_id = Vec::with_capacity(edge_count);
        let mut edge_from = Vec::with_capacity(edge_count);
        let mut edge_to = Vec::with_capacity(edge_count);
        let mut edge_to_dense = Vec::with_capacity(edge_count);
        let mut edge_length_km = Vec::with_capacity(edge_count);
        let mut edge_speed_limit_kmh = Vec::with_capacity(edge_count);
        let mut edge_current_speed = Vec::with_capacity(edge_count);
        let mut edge_index = FxHashMap::default();
        edge_index.reserve(edge_count);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &edges {
            node_out_start[node_index[&e.from] as usize + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        for (dense, e) in edges.into_iter().enumerate() {
            edge_index.insert(e.id, dense as u32);
            edge_id.push(e.id);
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_to_dense.push(node_index[&e.to]);
            edge_length_km.push(e.length_km);
            edge_speed_limit_kmh.push(e.speed_limit_kmh);
            // Initial current speed equals the speed limit (Invariant 1, §8).
            edge_current_speed.push(AtomicU64::new(e.speed_limit_kmh.to_bits()));
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        Graph {
            node_id,
            node_name,
            node_pos,
            node_out_start,
            node_index,
            edge_id,
            edge_from,
            edge_to,
            edge_to_dense,
            edge_length_km,
            edge_speed_limit_kmh,
            edge_current_speed,
            edge_index,
        }
    }
}
