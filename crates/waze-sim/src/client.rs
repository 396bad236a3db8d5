//! HTTP client to the routing server's `/api/navigate` and `/api/traffic`
//! endpoints (§4.4, §5).
//!
//! A 5-second total timeout bounds both calls (§5 "cancellation and
//! timeouts") — neither reroute nor batched reporting ever blocks the tick
//! beyond that, since both are issued from fire-and-forget tasks.

use std::time::Duration;

use waze_core::{EdgeId, NodeId};
use waze_wire::{ErrorResponse, NavigateResponse, TrafficReport};

use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A cheaply clonable handle to the routing server.
#[derive(Clone)]
pub struct NavClient {
    http: reqwest::Client,
    base_url: String,
}

impl NavClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client builds with a fixed timeout");
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// `GET /api/navigate?from=<from>&to=<to>`, returning the route as edge
    /// ids in travel order.
    pub async fn request_route(
        &self,
        from: NodeId,
        to: NodeId,
    ) -> Result<Vec<EdgeId>, ClientError> {
        let url = format!(
            "{}/api/navigate?from={}&to={}",
            self.base_url,
            from.0,
            to.0
        );
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: NavigateResponse = response.json().await?;
        Ok(body.route.into_iter().map(EdgeId).collect())
    }

    /// `POST /api/traffic` with the full batch of speed observations.
    pub async fn send_traffic_batch(&self, batch: &[TrafficReport]) -> Result<(), ClientError> {
        let url = format!("{}/api/traffic", self.base_url);
        let response = self.http.post(url).json(batch).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }
        Ok(())
    }
}
