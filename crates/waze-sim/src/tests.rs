//! Cross-module checks that don't fit neatly in `car`'s or `world`'s own
//! `#[cfg(test)]` blocks.

mod helpers {
    use std::sync::Arc;

    use waze_core::{EdgeId, NodeId, Point2D};
    use waze_graph::{Graph, GraphBuilder};

    pub fn single_edge_graph(length_km: f64, speed_limit_kmh: f64) -> Arc<Graph> {
        let mut b = GraphBuilder::new();
        b.add_node(NodeId(0), "a", Point2D::new(0.0, 0.0));
        b.add_node(NodeId(1), "b", Point2D::new(1.0, 0.0));
        b.add_directed_edge(EdgeId(0), NodeId(0), NodeId(1), length_km, speed_limit_kmh)
            .unwrap();
        Arc::new(b.build())
    }
}

mod car_invariants {
    use rustc_hash::FxHashMap;

    use waze_core::{CarId, EdgeId};
    use waze_core::config::PhysicsConfig;

    use crate::car::{Car, CarState};

    use super::helpers::single_edge_graph;

    fn physics() -> PhysicsConfig {
        PhysicsConfig {
            car_length_km: 0.005,
            density_threshold: 0.5,
            edge_density_threshold: 0.8,
            speed_factor: 0.5,
            alpha: 0.5,
        }
    }

    /// Invariant 2 — every `Driving` car has `0 <= edgeProgress < len`
    /// immediately after `advance`, or it has moved to the next edge (here:
    /// arrived, since this graph has only one edge).
    #[test]
    fn progress_stays_in_bounds_or_car_advances() {
        let graph = single_edge_graph(1.0, 60.0);
        let mut car = Car::new(CarId(1), None, 0.0);
        car.init_route(vec![EdgeId(0)], &graph);

        let density = FxHashMap::default();
        // 30 seconds at 60 km/h covers 0.5 km — well within the 1 km edge.
        car.advance(30.0, &graph, &density, &physics());
        assert_eq!(car.state(), CarState::Driving);
        assert!(car.current_edge().is_some());

        // A further 300 seconds covers 5 km, far past the edge end.
        car.advance(300.0, &graph, &density, &physics());
        assert_eq!(car.state(), CarState::Arrived);
    }
}

mod density_law {
    use rustc_hash::FxHashMap;

    use waze_core::{CarId, EdgeId};
    use waze_core::config::PhysicsConfig;

    use crate::car::Car;

    use super::helpers::single_edge_graph;

    /// S6 (two-car variant) — doubling the car count on the same edge moves
    /// `rho` from 0.005 to 0.01 and still barely perturbs the base speed,
    /// since `phi = 1 - rho^2` is quadratic in a small quantity.
    #[test]
    fn two_cars_on_one_edge_halve_the_slowdown_gap() {
        let graph = single_edge_graph(1.0, 50.0);
        let physics = PhysicsConfig {
            car_length_km: 0.005,
            density_threshold: 0.5,
            edge_density_threshold: 0.8,
            speed_factor: 0.5,
            alpha: 0.5,
        };

        let mut one_car_density = FxHashMap::default();
        one_car_density.insert(EdgeId(0), 1);
        let mut two_car_density = FxHashMap::default();
        two_car_density.insert(EdgeId(0), 2);

        let mut solo = Car::new(CarId(1), None, 0.0);
        solo.init_route(vec![EdgeId(0)], &graph);
        solo.advance(1.0, &graph, &one_car_density, &physics);

        let mut paired = Car::new(CarId(2), None, 0.0);
        paired.init_route(vec![EdgeId(0)], &graph);
        paired.advance(1.0, &graph, &two_car_density, &physics);

        let solo_speed = 50.0 * (1.0 - 0.005_f64.powi(2));
        let paired_speed = 50.0 * (1.0 - 0.01_f64.powi(2));
        assert!((solo.current_speed_kmh() - solo_speed).abs() < 1e-9);
        assert!((paired.current_speed_kmh() - paired_speed).abs() < 1e-9);
        assert!(paired.current_speed_kmh() < solo.current_speed_kmh());
    }
}
