//! `waze-server` — the routing server's HTTP surface (§4.4).
//!
//! The binary entry point lives in `main.rs`; this library exposes the
//! router and app state so integration tests can build one without binding
//! a real socket.

pub mod http;

pub use http::{create_router, AppState};

#[cfg(test)]
mod tests;
