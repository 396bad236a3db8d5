//! `waze-sim` — car agents and the per-tick world loop for the traffic
//! simulator (§3, §4.5–§4.7).
//!
//! # Tick loop
//!
//! ```text
//! for each tick of dt seconds:
//!   ① Density snapshot — edgeId -> count of Driving cars currently on it.
//!   ② Car advancement  — non-blocking inbox check, physics, edge crossing
//!                         (chunked; parallel with the `parallel` feature).
//!   ③ Stale reroute    — cars idle on a route for 60s+ (not on the final
//!                         edge) fire a fire-and-forget reroute request.
//!   ④ Batched report   — every `report_interval` simulated seconds, send
//!                         the whole population's current edge/speed.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                    |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Car advancement and report generation run on Rayon's pool.  |

pub mod car;
pub mod client;
pub mod error;
pub mod world;

#[cfg(test)]
mod tests;

pub use car::{ActiveRoute, Car, CarState};
pub use client::NavClient;
pub use error::ClientError;
pub use world::World;
