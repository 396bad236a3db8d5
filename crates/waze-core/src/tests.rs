//! Cross-module smoke tests. Per-module edge cases live next to their code
//! (see `config::tests`).

use crate::clock::SimClock;
use crate::geo::Point2D;
use crate::ids::{CarId, EdgeId, NodeId};

#[test]
fn node_and_edge_ids_index_cleanly() {
    let n = NodeId(3);
    assert_eq!(n.index(), 3);
    assert_eq!(NodeId::default(), NodeId::INVALID);

    let e = EdgeId(7);
    assert_eq!(e.index(), 7);
}

#[test]
fn car_id_sentinel_is_negative_one() {
    assert_eq!(CarId::NONE, CarId(-1));
    assert!(CarId::NONE.is_none());
    assert!(!CarId(1).is_none());
}

#[test]
fn point2d_euclidean_distance() {
    let a = Point2D::new(0.0, 0.0);
    let b = Point2D::new(3.0, 4.0);
    assert!((a.dist(b) - 5.0).abs() < 1e-6);
}

#[test]
fn clock_advances_continuously() {
    let mut clock = SimClock::starting_now(1_000);
    clock.advance(1.0);
    clock.advance(1.5);
    assert!((clock.sim_time_secs - 2.5).abs() < 1e-9);
    assert_eq!(clock.current_unix_secs(), 1_002);
}
