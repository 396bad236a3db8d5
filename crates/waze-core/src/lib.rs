//! `waze-core` — foundational types shared by the routing server and the
//! traffic simulator.
//!
//! This crate has no sibling-crate dependencies and minimal external ones
//! (`rand`, `serde`, `thiserror`). Everything here is plain data with no
//! networking or I/O beyond [`config::Config::load_from_file`].
//!
//! # What lives here
//!
//! | Module     | Contents                                   |
//! |------------|---------------------------------------------|
//! | [`ids`]    | `NodeId`, `EdgeId`, `CarId`                  |
//! | [`geo`]    | `Point2D`, planar distance                   |
//! | [`clock`]  | `SimClock` (continuous simulated seconds)    |
//! | [`config`] | `Config`, loaded from the JSON config file   |
//! | [`rng`]    | `SimRng`, used for random node sampling      |
//! | [`error`]  | `CoreError`, `CoreResult`                    |

pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;

#[cfg(test)]
mod tests;

pub use clock::SimClock;
pub use config::{Config, ConfigError};
pub use error::{CoreError, CoreResult};
pub use geo::Point2D;
pub use ids::{CarId, EdgeId, NodeId};
pub use rng::SimRng;
