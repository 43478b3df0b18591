use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geopoint::GeoPoint;
use crate::route::TravelMode;
use crate::stop::Stop;

/// Provider ceiling of 25 locations, minus the origin and the implicit
/// return-to-origin leg.
pub const MAX_WAYPOINTS: usize = 23;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: GeoPoint,
    pub stops: Vec<Stop>,
    pub travel_mode: TravelMode,
    pub supervisor_label: Option<String>,
    pub route_name: Option<String>,
}

/// A validated request plus how many located stops were dropped to honor
/// the waypoint cap, so callers can warn instead of silently shrinking the
/// round.
#[derive(Clone, Debug)]
pub struct BuiltRequest {
    pub request: RouteRequest,
    pub truncated: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("no origin selected")]
    MissingOrigin,

    #[error("no stops selected")]
    NoStops,

    #[error("none of the selected stops has coordinates")]
    NoLocatedStops,
}

#[derive(Default)]
pub struct RouteRequestBuilder {
    origin: Option<GeoPoint>,
    stops: Vec<Stop>,
    travel_mode: Option<TravelMode>,
    supervisor_label: Option<String>,
    route_name: Option<String>,
}

impl RouteRequestBuilder {
    pub fn with_origin(mut self, origin: GeoPoint) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_stop(mut self, stop: Stop) -> Self {
        self.stops.push(stop);
        self
    }

    pub fn with_stops(mut self, stops: impl IntoIterator<Item = Stop>) -> Self {
        self.stops.extend(stops);
        self
    }

    pub fn with_travel_mode(mut self, travel_mode: TravelMode) -> Self {
        self.travel_mode = Some(travel_mode);
        self
    }

    pub fn with_supervisor_label(mut self, label: impl Into<String>) -> Self {
        self.supervisor_label = Some(label.into());
        self
    }

    pub fn with_route_name(mut self, name: impl Into<String>) -> Self {
        self.route_name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<BuiltRequest, ValidationError> {
        let origin = self.origin.ok_or(ValidationError::MissingOrigin)?;

        if self.stops.is_empty() {
            return Err(ValidationError::NoStops);
        }

        let mut stops: Vec<Stop> = self.stops.into_iter().filter(Stop::is_located).collect();
        if stops.is_empty() {
            return Err(ValidationError::NoLocatedStops);
        }

        let truncated = stops.len().saturating_sub(MAX_WAYPOINTS);
        if truncated > 0 {
            tracing::warn!(
                dropped = truncated,
                cap = MAX_WAYPOINTS,
                "stop selection exceeds the waypoint cap, dropping the excess"
            );
            stops.truncate(MAX_WAYPOINTS);
        }

        Ok(BuiltRequest {
            request: RouteRequest {
                origin,
                stops,
                travel_mode: self.travel_mode.unwrap_or(TravelMode::Driving),
                supervisor_label: self.supervisor_label,
                route_name: self.route_name,
            },
            truncated,
        })
    }
}
