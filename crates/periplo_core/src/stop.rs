use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;

/// A visitable entity (a company hosting students, in practice). Owned by
/// the roster collaborator; the route pipeline only reads it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub display_name: String,
    /// Stops without coordinates never reach route construction.
    pub coordinates: Option<GeoPoint>,
}

impl Stop {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Stop {
            id: id.into(),
            display_name: display_name.into(),
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, coordinates: GeoPoint) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn is_located(&self) -> bool {
        self.coordinates.is_some()
    }
}
