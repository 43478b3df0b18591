use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geopoint::GeoPoint;
use crate::route::TravelMode;
use crate::stop::Stop;

/// A named reusable round. Created only by an explicit user save action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedRoute {
    pub id: Uuid,
    pub name: String,
    pub origin: GeoPoint,
    pub stops: Vec<Stop>,
    pub travel_mode: TravelMode,
    pub supervisor_label: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewSavedRoute {
    pub name: String,
    pub origin: GeoPoint,
    pub stops: Vec<Stop>,
    pub travel_mode: TravelMode,
    pub supervisor_label: Option<String>,
}

/// Persistence collaborator for saved rounds. Last-write-wins is all the
/// backing store promises.
pub trait SavedRouteRepository: Send + Sync {
    fn create(&self, route: NewSavedRoute) -> SavedRoute;

    fn list(&self) -> Vec<SavedRoute>;

    fn delete(&self, id: Uuid) -> bool;
}
