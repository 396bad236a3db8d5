//! A single car agent: state machine, active route, and per-edge physics
//! (§3 "Car (simulator-local)", §4.6, §4.7).
//!
//! Grounded on the original `Car`/`TravelRoute`/`CalculatePhysics` in
//! `internal/sim/car.go`, reshaped into the teacher framework's SoA-free,
//! one-struct-per-agent style (this simulator has no behavior-model
//! indirection to drive toward, so a single inherent-impl struct is the
//! natural shape rather than a trait object).

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use waze_core::config::PhysicsConfig;
use waze_core::{CarId, EdgeId};
use waze_graph::Graph;

const CONVERT_TO_HOURS: f64 = 3600.0;
const MIN_CAR_SPEED_KMH: f64 = 5.0;

/// Lifecycle state (§3).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CarState {
    Idle,
    Waiting,
    Driving,
    Arrived,
}

/// The route a `Driving` car is currently executing.
#[derive(Clone, Debug)]
pub struct ActiveRoute {
    pub route_edges: Vec<EdgeId>,
    pub current_edge_index: usize,
    pub current_edge_len_km: f64,
    pub edge_progress_km: f64,
}

/// One simulated car.
///
/// `inbox` is the single-slot, replace-on-write mailbox a stale-route
/// reroute task writes into (§9's resolved "replace-on-write" choice): a
/// later writer simply overwrites an unread route, which is always safe
/// because the invariant only requires *some* valid route, never a specific
/// one.
pub struct Car {
    id: CarId,
    user_id: Option<i64>,
    state: CarState,
    current_speed_kmh: f64,
    active_route: Option<ActiveRoute>,
    last_route_req_secs: f64,
    inbox: Arc<Mutex<Option<Vec<EdgeId>>>>,
}

impl Car {
    pub fn new(id: CarId, user_id: Option<i64>, spawn_time_secs: f64) -> Self {
        Self {
            id,
            user_id,
            state: CarState::Idle,
            current_speed_kmh: 0.0,
            active_route: None,
            last_route_req_secs: spawn_time_secs,
            inbox: Arc::new(Mutex::new(None)),
        }
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn state(&self) -> CarState {
        self.state
    }

    pub fn is_arrived(&self) -> bool {
        self.state == CarState::Arrived
    }

    pub fn current_speed_kmh(&self) -> f64 {
        self.current_speed_kmh
    }

    pub fn last_route_req_secs(&self) -> f64 {
        self.last_route_req_secs
    }

    pub fn reset_reroute_timer(&mut self) {
        self.last_route_req_secs = 0.0;
    }

    /// The edge the car currently occupies, if driving.
    pub fn current_edge(&self) -> Option<EdgeId> {
        self.active_route
            .as_ref()
            .map(|r| r.route_edges[r.current_edge_index])
    }

    /// `true` once there is no edge left after the current one.
    pub fn is_on_final_edge(&self) -> bool {
        match &self.active_route {
            Some(r) => r.current_edge_index + 1 >= r.route_edges.len(),
            None => true,
        }
    }

    /// The remaining edges from (and including) the current one, a snapshot
    /// taken right before issuing a reroute request.
    pub fn route_tail(&self) -> Option<Vec<EdgeId>> {
        self.active_route
            .as_ref()
            .map(|r| r.route_edges[r.current_edge_index..].to_vec())
    }

    /// The final edge of the active route — its `to` node is the reroute
    /// destination.
    pub fn destination_edge(&self) -> Option<EdgeId> {
        self.active_route.as_ref().and_then(|r| r.route_edges.last().copied())
    }

    /// A clone of the reroute-result handle, to be moved into a
    /// fire-and-forget reroute task.
    pub fn inbox_handle(&self) -> Arc<Mutex<Option<Vec<EdgeId>>>> {
        self.inbox.clone()
    }

    /// Non-blocking check of the inbox; installs a new route if one has
    /// arrived since the last tick (§4.5 step 2, first bullet).
    pub fn try_install_pending_route(&mut self, graph: &Graph) {
        let pending = self.inbox.lock().take();
        if let Some(route) = pending {
            self.init_route(route, graph);
        }
    }

    /// Install a route. A no-op if `route_edges` is empty (§4.7).
    pub fn init_route(&mut self, route_edges: Vec<EdgeId>, graph: &Graph) {
        if route_edges.is_empty() {
            return;
        }

        let first_edge = route_edges[0];
        let (length_km, initial_speed_kmh) = match graph.edge_length_km(first_edge) {
            Some(length_km) => {
                let current = graph.current_speed(first_edge).unwrap_or(0.0);
                let speed = if current > 0.0 {
                    current
                } else {
                    graph.edge_speed_limit_kmh(first_edge).unwrap_or(0.0)
                };
                (length_km, speed)
            }
            None => (0.0, 0.0),
        };

        self.active_route = Some(ActiveRoute {
            route_edges,
            current_edge_index: 0,
            current_edge_len_km: length_km,
            edge_progress_km: 0.0,
        });
        self.current_speed_kmh = initial_speed_kmh;
        self.state = CarState::Driving;
    }

    /// Advance the car by `dt_secs` seconds: recompute congestion-aware
    /// speed, move along the current edge, and roll any overflow distance
    /// onto subsequent edges (§4.6).
    pub fn advance(
        &mut self,
        dt_secs: f64,
        graph: &Graph,
        density: &FxHashMap<EdgeId, u32>,
        physics: &PhysicsConfig,
    ) {
        if self.state != CarState::Driving || self.active_route.is_none() {
            return;
        }

        self.calculate_physics(graph, density, physics);

        let hours = dt_secs / CONVERT_TO_HOURS;
        let distance_km = self.current_speed_kmh * hours;
        if let Some(route) = self.active_route.as_mut() {
            route.edge_progress_km += distance_km;
        }

        // Roll overflow onto subsequent edges; a single `dt` can in
        // principle cross more than one short edge.
        while self.state == CarState::Driving {
            let crossed = match &self.active_route {
                Some(route) => route.edge_progress_km >= route.current_edge_len_km,
                None => false,
            };
            if !crossed {
                break;
            }
            self.switch_to_next_edge(graph);
        }

        self.last_route_req_secs += dt_secs;
    }

    fn calculate_physics(
        &mut self,
        graph: &Graph,
        density: &FxHashMap<EdgeId, u32>,
        physics: &PhysicsConfig,
    ) {
        let (edge_id, progress_km) = match &self.active_route {
            Some(route) => (
                route.route_edges[route.current_edge_index],
                route.edge_progress_km,
            ),
            None => return,
        };

        let length_km = match graph.edge_length_km(edge_id) {
            Some(length_km) => length_km,
            None => return,
        };
        let speed_limit_kmh = graph.edge_speed_limit_kmh(edge_id).unwrap_or(0.0);

        let capacity = (length_km / physics.car_length_km).max(1.0);
        let count = density.get(&edge_id).copied().unwrap_or(0) as f64;
        let density_ratio = (count / capacity).min(1.0);

        let mut speed_factor = 1.0 - density_ratio * density_ratio;

        let progress_fraction = progress_km / length_km;
        if progress_fraction > physics.density_threshold && density_ratio > physics.edge_density_threshold
        {
            speed_factor *= physics.speed_factor;
        }

        let final_speed = (speed_limit_kmh * speed_factor).max(MIN_CAR_SPEED_KMH);
        self.current_speed_kmh = final_speed;
    }

    /// Cross onto the next edge of the active route, or arrive / wait if
    /// there isn't one (§4.7).
    fn switch_to_next_edge(&mut self, graph: &Graph) {
        let (next_index, remainder_km) = match &self.active_route {
            Some(route) => (
                route.current_edge_index + 1,
                route.current_edge_len_km - route.edge_progress_km,
            ),
            None => return,
        };

        let route_len = self.active_route.as_ref().expect("checked above").route_edges.len();
        if next_index >= route_len {
            self.state = CarState::Arrived;
            self.current_speed_kmh = 0.0;
            self.active_route = None;
            return;
        }

        let next_edge = self.active_route.as_ref().expect("checked above").route_edges[next_index];
        match graph.edge_length_km(next_edge) {
            Some(next_len_km) => {
                let speed = match graph.current_speed(next_edge) {
                    Some(s) if s > 0.0 => s,
                    _ => graph.edge_speed_limit_kmh(next_edge).unwrap_or(0.0),
                };
                let route = self.active_route.as_mut().expect("checked above");
                route.current_edge_index = next_index;
                route.current_edge_len_km = next_len_km;
                route.edge_progress_km = -remainder_km;
                self.current_speed_kmh = speed;
            }
            None => {
                tracing::warn!(
                    car_id = self.id.0,
                    edge_id = next_edge.0,
                    "route referenced a missing edge, car now waiting"
                );
                self.state = CarState::Waiting;
            }
        }
    }
}
