use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use periplo_core::geopoint::GeoPoint;
use periplo_core::polyline;
use periplo_staticmap::MapArtifact;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MapRequestBody {
    pub path_enc: String,
    #[serde(default)]
    pub origin: Option<GeoPoint>,
    #[serde(default)]
    pub stops: Vec<GeoPoint>,
}

/// Runs the tier chain. A raster tier answers with image bytes; the vector
/// and placeholder fallbacks answer as JSON draw instructions.
pub async fn map_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MapRequestBody>,
) -> Result<Response, ApiError> {
    let path = polyline::decode(&body.path_enc)
        .map_err(|error| ApiError::BadRequest(error.to_string()))?;

    let artifact = state.renderer.render(&path, body.origin, &body.stops).await;

    Ok(match artifact {
        MapArtifact::Image(image) => {
            ([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response()
        }
        other => Json(other).into_response(),
    })
}
