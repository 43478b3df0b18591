use std::collections::HashMap;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};

use jiff::Timestamp;
use parking_lot::Mutex;
use uuid::Uuid;

use periplo_core::metrics::CostModel;
use periplo_core::saved::{NewSavedRoute, SavedRoute, SavedRouteRepository};
use periplo_directions::client::{DirectionsClientParams, GoogleDirectionsClient};
use periplo_directions::places::PlaceLookupClient;
use periplo_directions::resolver::{DirectionsResolver, ResolverParams};
use periplo_staticmap::builder::ImageBuilderClient;
use periplo_staticmap::{RendererParams, StaticMapRenderer};

pub struct AppState {
    pub resolver: DirectionsResolver<GoogleDirectionsClient>,
    pub places: PlaceLookupClient,
    pub renderer: StaticMapRenderer<ImageBuilderClient>,
    pub cost_model: CostModel,
    pub region: String,
    pub saved_routes: InMemorySavedRoutes,
    pub session: PlannerSession,
}

impl AppState {
    pub fn from_env() -> Self {
        let region = env::var("ROUTING_REGION").unwrap_or_else(|_| "cl".into());

        let client_params = DirectionsClientParams {
            api_base: env::var("DIRECTIONS_API_BASE")
                .unwrap_or_else(|_| "maps.googleapis.com".into()),
            api_key: env::var("DIRECTIONS_API_KEY").unwrap(),
        };
        let directions_client = GoogleDirectionsClient::new(client_params.clone());
        let places = PlaceLookupClient::new(client_params);

        let primary = ImageBuilderClient::new(env::var("STATICMAP_BUILDER_URL").unwrap());
        let mut renderer = StaticMapRenderer::new(
            primary,
            RendererParams {
                region: region.clone(),
                ..RendererParams::default()
            },
        );
        if let Ok(proxy_url) = env::var("STATICMAP_PROXY_URL") {
            renderer = renderer.with_proxy(ImageBuilderClient::new(proxy_url));
        }

        AppState {
            resolver: DirectionsResolver::new(
                directions_client,
                ResolverParams {
                    region: region.clone(),
                    ..ResolverParams::default()
                },
            ),
            places,
            renderer,
            cost_model: CostModel::default(),
            region,
            saved_routes: InMemorySavedRoutes::default(),
            session: PlannerSession::default(),
        }
    }
}

/// Monotonic generation counter for in-flight route computations. A
/// handler takes a token before resolving and checks it afterwards, so a
/// result arriving for an already-superseded request is discarded instead
/// of overwriting newer state.
#[derive(Default)]
pub struct PlannerSession {
    generation: AtomicU64,
}

impl PlannerSession {
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }
}

/// Dev/test stand-in for the hosted record store. Last-write-wins, like
/// the real one.
#[derive(Default)]
pub struct InMemorySavedRoutes {
    routes: Mutex<HashMap<Uuid, SavedRoute>>,
}

impl SavedRouteRepository for InMemorySavedRoutes {
    fn create(&self, route: NewSavedRoute) -> SavedRoute {
        let saved = SavedRoute {
            id: Uuid::new_v4(),
            name: route.name,
            origin: route.origin,
            stops: route.stops,
            travel_mode: route.travel_mode,
            supervisor_label: route.supervisor_label,
            created_at: Timestamp::now(),
        };
        self.routes.lock().insert(saved.id, saved.clone());
        saved
    }

    fn list(&self) -> Vec<SavedRoute> {
        let mut routes: Vec<SavedRoute> = self.routes.lock().values().cloned().collect();
        routes.sort_by_key(|route| route.created_at);
        routes
    }

    fn delete(&self, id: Uuid) -> bool {
        self.routes.lock().remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use periplo_core::geopoint::GeoPoint;
    use periplo_core::route::TravelMode;

    use super::*;

    #[test]
    fn test_stale_tokens_are_rejected() {
        let session = PlannerSession::default();

        let first = session.begin();
        let second = session.begin();

        assert!(!session.is_current(first));
        assert!(session.is_current(second));
    }

    #[test]
    fn test_saved_route_crud() {
        let store = InMemorySavedRoutes::default();

        let saved = store.create(NewSavedRoute {
            name: "Ronda Quilpué".into(),
            origin: GeoPoint::new(-33.05, -71.44),
            stops: vec![],
            travel_mode: TravelMode::Driving,
            supervisor_label: None,
        });

        assert_eq!(store.list().len(), 1);
        assert!(store.delete(saved.id));
        assert!(!store.delete(saved.id));
        assert!(store.list().is_empty());
    }
}
