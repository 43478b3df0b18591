use thiserror::Error;

use crate::types::{DirectionsResponse, ProviderRequest, point_param};

#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Awaitable seam over the directions provider, so retry and fallback
/// compose as sequential control flow and tests can script responses.
pub trait DirectionsApi: Send + Sync {
    fn fetch(
        &self,
        request: &ProviderRequest,
    ) -> impl Future<Output = Result<DirectionsResponse, DirectionsError>> + Send;
}

#[derive(Clone, Debug)]
pub struct DirectionsClientParams {
    pub api_base: String,
    pub api_key: String,
}

pub const DIRECTIONS_API_PATH: &str = "/maps/api/directions/json";

pub struct GoogleDirectionsClient {
    params: DirectionsClientParams,
    client: reqwest::Client,
}

impl GoogleDirectionsClient {
    pub fn new(params: DirectionsClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }
}

impl DirectionsApi for GoogleDirectionsClient {
    async fn fetch(
        &self,
        request: &ProviderRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        let url = format!("https://{}{}", self.params.api_base, DIRECTIONS_API_PATH);

        let response = self
            .client
            .get(url)
            .query(&[("key", self.params.api_key.as_str())])
            .query(&[("origin", point_param(&request.origin).as_str())])
            .query(&[("destination", point_param(&request.destination).as_str())])
            .query(&[("waypoints", request.waypoints_param().as_str())])
            .query(&[("mode", request.travel_mode.to_string().as_str())])
            .query(&[("region", request.region.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(DirectionsError::Api { status, message });
        }

        Ok(response.json().await?)
    }
}
