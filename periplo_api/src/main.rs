mod error;
mod places;
mod route;
mod saved;
mod state;

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::{Router, serve};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};

use crate::places::locate_place_handler;
use crate::route::document::document_handler;
use crate::route::map::map_handler;
use crate::route::visualize::visualize_handler;
use crate::saved::{create_route_handler, delete_route_handler, list_routes_handler};
use crate::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::from_filename("./.env.local").ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let state = Arc::new(AppState::from_env());

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/places/locate", post(locate_place_handler))
        .route("/route/visualize", post(visualize_handler))
        .route("/route/map", post(map_handler))
        .route("/route/document", post(document_handler))
        .route("/routes", get(list_routes_handler).post(create_route_handler))
        .route("/routes/{id}", delete(delete_route_handler))
        .layer(ServiceBuilder::new().layer(cors_layer))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .unwrap();

    info!("periplo api listening on 127.0.0.1:8080");

    serve(listener, app).await.unwrap();
}
