//! `waze-graph` — the road network, the concurrent edge-speed estimator,
//! the map-file loader, and time-weighted A* routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                              |
//! |-------------|--------------------------------------------------------|
//! | [`network`] | `Graph`, `GraphBuilder`, the atomic speed estimator    |
//! | [`loader`]  | `load_from_json` — parses the §6 map-file schema       |
//! | [`router`]  | `Router` trait, `Route`, `AStarRouter`                 |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                         |

pub mod error;
pub mod loader;
pub mod network;
pub mod router;


pub use error::{GraphError, GraphResult};
pub use loader::load_from_json;
pub use network::{Graph, GraphBuilder};
pub use router::{AStarRouter, Route, Router, DEFAULT_V_REF_KMH};
