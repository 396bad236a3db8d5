//! The simulation world and its per-tick loop (§3 "World", §4.5, §5).
//!
//! Grounded on `World`/`Tick`/`GenarateTrafficReports(Parallel)` in
//! `internal/sim/world.go`, reshaped around an async tick (reroute and
//! batched reporting become spawned tasks rather than bare goroutines) and
//! the teacher framework's chunked-parallel-advancement idiom from
//! `dt-sim/src/sim.rs` (there driving the intent/apply phases; here driving
//! car physics).

use std::sync::Arc;

use rustc_hash::FxHashMap;

use waze_core::config::PhysicsConfig;
use waze_core::{CarId, EdgeId, NodeId, SimClock};
use waze_graph::Graph;
use waze_wire::TrafficReport;

use crate::car::{Car, CarState};
use crate::client::{ClientError, NavClient};

/// Stale-route threshold: a driving car not on its final edge re-requests a
/// route once this many simulated seconds have elapsed since its last
/// request (§4.5 step 3).
const REROUTE_INTERVAL_SECS: f64 = 60.0;

/// Car-advancement chunk size for the (optional) Rayon-parallel path (§4.5).
#[cfg(feature = "parallel")]
const ADVANCE_CHUNK_SIZE: usize = 100;

pub struct World {
    graph: Arc<Graph>,
    cars: Vec<Car>,
    clock: SimClock,
    client: NavClient,
    physics: PhysicsConfig,
    report_interval_secs: f64,
    reports_buffer: Vec<TrafficReport>,
    next_car_id: i64,
}

impl World {
    pub fn new(
        graph: Arc<Graph>,
        server_url: &str,
        physics: PhysicsConfig,
        report_interval_secs: f64,
        virtual_start_unix_secs: i64,
    ) -> Self {
        Self {
            graph,
            cars: Vec::new(),
            clock: SimClock::starting_now(virtual_start_unix_secs),
            client: NavClient::new(server_url),
            physics,
            report_interval_secs,
            reports_buffer: Vec::new(),
            next_car_id: 0,
        }
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Spawn a new idle car and return its id. Callers install a route (by
    /// requesting one from the server) to set it driving.
    pub fn add_car(&mut self, user_id: Option<i64>) -> CarId {
        let id = CarId(self.next_car_id);
        self.next_car_id += 1;
        self.cars.push(Car::new(id, user_id, self.clock.sim_time_secs));
        id
    }

    pub fn has_active_cars(&self) -> bool {
        !self.cars.is_empty()
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    /// Request an initial route from `from` to `to`, spawn a car, and install
    /// that route on it directly (not via the inbox — there is no existing
    /// route for a fresh car's install to race against). Mirrors the
    /// original driver's spawn-then-`InitRoute` sequence
    /// (`internal/../cmd/simulation/main.go`), just wrapped behind `World` so
    /// both the initial population and later spawns share one path.
    pub async fn spawn_car(
        &mut self,
        user_id: Option<i64>,
        from: NodeId,
        to: NodeId,
    ) -> Result<CarId, ClientError> {
        let route = self.client.request_route(from, to).await?;
        let id = self.add_car(user_id);
        if let Some(car) = self.cars.iter_mut().find(|c| c.id() == id) {
            car.init_route(route, &self.graph);
        }
        Ok(id)
    }

    /// Compact the live vector, dropping cars that reached `Arrived` (§3
    /// "Lifecycles").
    pub fn clean_arrived_cars(&mut self) {
        self.cars.retain(|car| !car.is_arrived());
    }

    /// Advance the world by `dt_secs` seconds, performing all four steps of
    /// §4.5 in order. Reroute requests and the batched traffic report (if
    /// due) are spawned as fire-and-forget tasks and never block the tick.
    pub async fn tick(&mut self, dt_secs: f64) {
        self.clock.advance(dt_secs);

        // ── Step 1: density snapshot ───────────────────────────────────────
        let density = self.build_density_snapshot();

        // ── Step 2: car advancement ─────────────────────────────────────────
        self.advance_cars(dt_secs, &density);

        // ── Step 3: stale-route reroute ──────────────────────────────────────
        self.issue_reroutes();

        // ── Step 4: batched reporting ────────────────────────────────────────
        self.maybe_send_batch_report();
    }

    fn build_density_snapshot(&self) -> FxHashMap<EdgeId, u32> {
        let mut density = FxHashMap::default();
        for car in &self.cars {
            if car.state() == CarState::Driving {
                if let Some(edge) = car.current_edge() {
                    *density.entry(edge).or_insert(0) += 1;
                }
            }
        }
        density
    }

    #[cfg(not(feature = "parallel"))]
    fn advance_cars(&mut self, dt_secs: f64, density: &FxHashMap<EdgeId, u32>) {
        let graph = &self.graph;
        let physics = &self.physics;
        for car in &mut self.cars {
            car.try_install_pending_route(graph);
            car.advance(dt_secs, graph, density, physics);
        }
    }

    #[cfg(feature = "parallel")]
    fn advance_cars(&mut self, dt_secs: f64, density: &FxHashMap<EdgeId, u32>) {
        use rayon::prelude::*;

        let graph = &self.graph;
        let physics = &self.physics;
        self.cars
            .par_chunks_mut(ADVANCE_CHUNK_SIZE)
            .for_each(|chunk| {
                for car in chunk {
                    car.try_install_pending_route(graph);
                    car.advance(dt_secs, graph, density, physics);
                }
            });
    }

    fn issue_reroutes(&mut self) {
        for car in &mut self.cars {
            if car.state() != CarState::Driving {
                continue;
            }
            if car.last_route_req_secs() <= REROUTE_INTERVAL_SECS || car.is_on_final_edge() {
                continue;
            }

            car.reset_reroute_timer();

            let (Some(current_edge), Some(dest_edge)) = (car.current_edge(), car.destination_edge())
            else {
                continue;
            };
            let (Some(next_node), Some(dst_node)) =
                (self.graph.edge_to(current_edge), self.graph.edge_to(dest_edge))
            else {
                continue;
            };
            let Some(old_tail) = car.route_tail() else {
                continue;
            };

            let client = self.client.clone();
            let inbox = car.inbox_handle();
            let car_id = car.id();

            tokio::spawn(async move {
                match client.request_route(next_node, dst_node).await {
                    Ok(new_route) => {
                        if different(&new_route, &old_tail) {
                            *inbox.lock() = Some(new_route);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(car_id = car_id.0, %err, "reroute request failed");
                    }
                }
            });
        }
    }

    fn maybe_send_batch_report(&mut self) {
        let interval = self.report_interval_secs;
        if interval <= 0.0 {
            return;
        }
        let elapsed = self.clock.sim_time_secs.floor() as i64;
        if elapsed % (interval as i64) != 0 {
            return;
        }

        let batch = self.generate_traffic_reports();
        if batch.is_empty() {
            return;
        }

        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(err) = client.send_traffic_batch(&batch).await {
                tracing::warn!(%err, "failed to send traffic batch");
            }
        });
    }

    /// A fresh `TrafficReport` per car: a live report for `Driving` cars, the
    /// `car_id == -1` sentinel otherwise. Returns a copy — the tick keeps
    /// `reports_buffer` for itself so the spawned sender never aliases it
    /// (§5 "Reporting buffer").
    fn generate_traffic_reports(&mut self) -> Vec<TrafficReport> {
        self.reports_buffer.clear();
        self.reports_buffer.reserve(self.cars.len());

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.reports_buffer.extend(
                self.cars
                    .par_iter()
                    .map(|car| car_report(car, &self.clock))
                    .collect::<Vec<_>>(),
            );
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.reports_buffer
                .extend(self.cars.iter().map(|car| car_report(car, &self.clock)));
        }

        self.reports_buffer.clone()
    }
}

fn car_report(car: &Car, clock: &SimClock) -> TrafficReport {
    match (car.state(), car.current_edge()) {
        (CarState::Driving, Some(edge)) => TrafficReport {
            car_id: car.id().0,
            edge_id: edge.0,
            speed: car.current_speed_kmh(),
            timestamp: clock.current_unix_secs(),
        },
        _ => TrafficReport::sentinel(),
    }
}

/// Does `new_route` (requested from the car's current next-node to its
/// destination) differ from the tail of the route it is already driving?
///
/// Resolves the open question in §9 by comparing against the route tail
/// sliced at the car's *current index*, not any car identifier.
fn different(new_route: &[EdgeId], old_tail: &[EdgeId]) -> bool {
    new_route != old_tail
}

#[cfg(test)]
mod tests {
    use waze_core::{NodeId, Point2D};
    use waze_graph::GraphBuilder;

    use super::*;

    fn tiny_graph() -> Arc<Graph> {
        let mut b = GraphBuilder::new();
        b.add_node(NodeId(0), "a", Point2D::new(0.0, 0.0));
        b.add_node(NodeId(1), "b", Point2D::new(1.0, 0.0));
        b.add_directed_edge(EdgeId(10), NodeId(0), NodeId(1), 1.0, 60.0)
            .unwrap();
        Arc::new(b.build())
    }

    fn physics() -> PhysicsConfig {
        PhysicsConfig {
            car_length_km: 0.005,
            density_threshold: 0.5,
            edge_density_threshold: 0.8,
            speed_factor: 0.5,
            alpha: 0.5,
        }
    }

    #[test]
    fn different_detects_identical_and_changed_tails() {
        let a = [EdgeId(1), EdgeId(2)];
        let b = [EdgeId(1), EdgeId(2)];
        let c = [EdgeId(1), EdgeId(3)];
        assert!(!different(&a, &b));
        assert!(different(&a, &c));
        assert!(different(&a, &[EdgeId(1)]));
    }

    #[test]
    fn density_snapshot_sum_equals_driving_car_count() {
        let graph = tiny_graph();
        let mut world = World::new(graph.clone(), "http://localhost:0", physics(), 2.0, 0);
        let id_a = world.add_car(None);
        let id_b = world.add_car(None);
        for car in &mut world.cars {
            if car.id() == id_a || car.id() == id_b {
                car.init_route(vec![EdgeId(10)], &graph);
            }
        }
        let density = world.build_density_snapshot();
        let total: u32 = density.values().sum();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn tick_advances_clock_and_compacts_arrived_cars() {
        let graph = tiny_graph();
        let mut world = World::new(graph.clone(), "http://localhost:0", physics(), 1000.0, 0);
        let id = world.add_car(None);
        for car in &mut world.cars {
            if car.id() == id {
                car.init_route(vec![EdgeId(10)], &graph);
            }
        }

        // Enough dt to finish the 1 km edge at 60 km/h in well under an hour.
        world.tick(3600.0).await;
        world.clean_arrived_cars();

        assert!((world.clock().sim_time_secs - 3600.0).abs() < 1e-9);
        assert!(!world.has_active_cars());
    }
}
