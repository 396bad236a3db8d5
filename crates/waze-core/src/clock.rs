//! Simulation time model.
//!
//! Unlike a tick-indexed digital twin, this simulation advances continuous
//! simulated seconds: each loop iteration calls [`SimClock::advance`] with a
//! `dt` (typically 1.0 s) rather than incrementing an integer counter. Wall
//! time is derived on demand:
//!
//!   wall_time = virtual_start_unix_secs + sim_time_secs

use std::fmt;

/// Converts between simulated elapsed seconds and Unix wall-clock time.
#[derive(Clone, Debug)]
pub struct SimClock {
    /// Unix timestamp the simulation considers "time zero".
    pub virtual_start_unix_secs: i64,
    /// Simulated seconds elapsed since `virtual_start_unix_secs`.
    pub sim_time_secs: f64,
}

impl SimClock {
    pub fn starting_now(virtual_start_unix_secs: i64) -> Self {
        Self {
            virtual_start_unix_secs,
            sim_time_secs: 0.0,
        }
    }

    /// Advance simulated time by `dt` seconds.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        self.sim_time_secs += dt;
    }

    /// The wall-clock Unix timestamp corresponding to the current sim time.
    #[inline]
    pub fn current_unix_secs(&self) -> i64 {
        self.virtual_start_unix_secs + self.sim_time_secs as i64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.1}s", self.sim_time_secs)
    }
}
