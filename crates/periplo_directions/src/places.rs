use serde::Deserialize;
use thiserror::Error;

use periplo_core::geopoint::GeoPoint;

use crate::client::DirectionsClientParams;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("no place matches the query")]
    NotFound,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: GeoPoint,
}

#[derive(Clone, Debug)]
pub struct LocatedPlace {
    pub formatted_address: String,
    pub coordinates: GeoPoint,
}

pub const GEOCODE_API_PATH: &str = "/maps/api/geocode/json";

/// Resolves a free-text origin ("Liceo Industrial de Valparaíso") to a
/// point the route request can start from.
pub struct PlaceLookupClient {
    params: DirectionsClientParams,
    client: reqwest::Client,
}

impl PlaceLookupClient {
    pub fn new(params: DirectionsClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub async fn locate(&self, query: &str, region: &str) -> Result<LocatedPlace, PlacesError> {
        let url = format!("https://{}{}", self.params.api_base, GEOCODE_API_PATH);

        let response = self
            .client
            .get(url)
            .query(&[("key", self.params.api_key.as_str())])
            .query(&[("address", query)])
            .query(&[("region", region)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(PlacesError::Api { status, message });
        }

        let data: GeocodeResponse = response.json().await?;

        if !(data.status == "OK" || data.status == "ZERO_RESULTS") {
            return Err(PlacesError::Api {
                status: 200,
                message: data.status,
            });
        }

        data.results
            .into_iter()
            .next()
            .map(|result| LocatedPlace {
                formatted_address: result.formatted_address,
                coordinates: result.geometry.location,
            })
            .ok_or(PlacesError::NotFound)
    }
}
