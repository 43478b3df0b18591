use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use periplo_core::geopoint::GeoPoint;
use periplo_directions::places::PlacesError;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LocateRequestBody {
    pub query: String,
}

#[derive(Serialize)]
pub struct LocateResponse {
    pub formatted_address: String,
    pub coordinates: GeoPoint,
}

/// Free-text origin lookup, run before any route is requested.
pub async fn locate_place_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocateRequestBody>,
) -> Result<Json<LocateResponse>, ApiError> {
    let place = state
        .places
        .locate(&body.query, &state.region)
        .await
        .map_err(|error| match error {
            PlacesError::NotFound => ApiError::NotFound(error.to_string()),
            other => ApiError::BadGateway(other.to_string()),
        })?;

    Ok(Json(LocateResponse {
        formatted_address: place.formatted_address,
        coordinates: place.coordinates,
    }))
}
