use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use periplo_core::geopoint::GeoPoint;
use periplo_core::metrics::RouteMetrics;
use periplo_core::polyline;
use periplo_core::request::RouteRequestBuilder;
use periplo_core::route::{Leg, TravelMode};
use periplo_core::stop::Stop;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct VisualizeRequestBody {
    pub origin: GeoPoint,
    pub stops: Vec<Stop>,
    pub travel_mode: TravelMode,
    #[serde(default)]
    pub supervisor_label: Option<String>,
    #[serde(default)]
    pub route_name: Option<String>,
}

#[derive(Serialize)]
pub struct VisualizeResponse {
    pub legs: Vec<Leg>,
    pub metrics: RouteMetrics,
    pub mode: TravelMode,
    /// Transit was silently answered with a driving route; the UI shows a
    /// non-blocking notice.
    pub fallback_applied: bool,
    /// Stops dropped to honor the waypoint cap; the UI warns when nonzero.
    pub truncated: usize,
    pub path_enc: String,
}

pub async fn visualize_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VisualizeRequestBody>,
) -> Result<Json<VisualizeResponse>, ApiError> {
    let token = state.session.begin();

    let mut builder = RouteRequestBuilder::default()
        .with_origin(body.origin)
        .with_stops(body.stops)
        .with_travel_mode(body.travel_mode);
    if let Some(label) = body.supervisor_label {
        builder = builder.with_supervisor_label(label);
    }
    if let Some(name) = body.route_name {
        builder = builder.with_route_name(name);
    }

    let built = builder
        .build()
        .map_err(|error| ApiError::BadRequest(error.to_string()))?;

    let resolution = state.resolver.resolve(&built.request).await?;

    // The user may have edited the round while we were waiting on the
    // provider; that result belongs to nobody now.
    if !state.session.is_current(token) {
        return Err(ApiError::Conflict("superseded by a newer request".into()));
    }

    let metrics = RouteMetrics::compute(&resolution.route, resolution.mode, &state.cost_model);
    let path_enc = polyline::encode(&polyline::downsample(&resolution.route.path));

    Ok(Json(VisualizeResponse {
        legs: resolution.route.legs,
        metrics,
        mode: resolution.mode,
        fallback_applied: resolution.fallback_applied,
        truncated: built.truncated,
        path_enc,
    }))
}
