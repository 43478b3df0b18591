use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use periplo_core::geopoint::GeoPoint;
use periplo_core::metrics::RouteMetrics;
use periplo_core::route::{ResolvedRoute, TravelMode};
use periplo_document::blocks::ItineraryDocument;
use periplo_document::compose::{ItineraryInput, StopRoster, compose};
use periplo_document::layout::PageSpec;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DocumentRequestBody {
    pub route: ResolvedRoute,
    pub travel_mode: TravelMode,
    pub date: jiff::civil::Date,
    #[serde(default)]
    pub stops: Vec<GeoPoint>,
    #[serde(default)]
    pub rosters: Vec<StopRoster>,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub supervisor_label: Option<String>,
}

/// Composes the printable itinerary: metrics and map first (both read the
/// resolved route), then the paginated layout. The UI hands the result to
/// its page renderer and saves it under `file_name`.
pub async fn document_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DocumentRequestBody>,
) -> Result<Json<ItineraryDocument>, ApiError> {
    let metrics = RouteMetrics::compute(&body.route, body.travel_mode, &state.cost_model);

    let origin = body.route.path.first().copied();
    let map = state
        .renderer
        .render(&body.route.path, origin, &body.stops)
        .await;

    let document = compose(
        &ItineraryInput {
            route: &body.route,
            metrics: &metrics,
            map: &map,
            rosters: &body.rosters,
            travel_mode: body.travel_mode,
            route_name: body.route_name.as_deref(),
            supervisor_label: body.supervisor_label.as_deref(),
            date: body.date,
        },
        PageSpec::default(),
    );

    Ok(Json(document))
}
