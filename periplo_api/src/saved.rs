use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use periplo_core::saved::{NewSavedRoute, SavedRoute, SavedRouteRepository};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_routes_handler(State(state): State<Arc<AppState>>) -> Json<Vec<SavedRoute>> {
    Json(state.saved_routes.list())
}

/// Explicit user save only; nothing in the pipeline persists routes on its
/// own.
pub async fn create_route_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewSavedRoute>,
) -> (StatusCode, Json<SavedRoute>) {
    let saved = state.saved_routes.create(body);
    tracing::info!(id = %saved.id, name = %saved.name, "saved route created");

    (StatusCode::CREATED, Json(saved))
}

pub async fn delete_route_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.saved_routes.delete(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("no saved route {id}")))
    }
}
