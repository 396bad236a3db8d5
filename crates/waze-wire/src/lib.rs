//! Wire schemas shared by `waze-server` and `waze-simulator`.
//!
//! Field names match §6/§3 exactly (`car_id`, `edge_id`, `speed`,
//! `timestamp`, `route`, `eta`, `distance`) so existing map/config tooling
//! and any hand-written HTTP clients keep working unchanged.

use serde::{Deserialize, Serialize};

/// A single car's speed observation on one edge, or the `car_id == -1`
/// sentinel meaning "no active car in this report slot".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficReport {
    pub car_id: i64,
    pub edge_id: u32,
    pub speed: f64,
    pub timestamp: i64,
}

impl TrafficReport {
    pub const SENTINEL_CAR_ID: i64 = -1;

    /// A sentinel report for a report-buffer slot with no active car.
    pub fn sentinel() -> Self {
        Self {
            car_id: Self::SENTINEL_CAR_ID,
            edge_id: 0,
            speed: 0.0,
            timestamp: 0,
        }
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.car_id == Self::SENTINEL_CAR_ID
    }
}

/// A successful `/api/navigate` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateResponse {
    pub route: Vec<u32>,
    pub eta: f64,
    pub distance: f64,
}

/// Error response body for a non-2xx `/api/navigate` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traffic_report_serializes_with_snake_case_fields() {
        let report = TrafficReport {
            car_id: 5,
            edge_id: 10,
            speed: 42.0,
            timestamp: 1_700_000_000,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"car_id\":5"));
        assert!(json.contains("\"edge_id\":10"));
    }

    #[test]
    fn sentinel_report_is_recognized() {
        assert!(TrafficReport::sentinel().is_sentinel());
        assert!(!TrafficReport {
            car_id: 1,
            edge_id: 0,
            speed: 0.0,
            timestamp: 0,
        }
        .is_sentinel());
    }
}
