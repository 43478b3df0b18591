use serde::Deserialize;

use periplo_core::geopoint::GeoPoint;
use periplo_core::polyline::{self, PolylineError};
use periplo_core::request::RouteRequest;
use periplo_core::route::{Leg, ResolvedRoute, Step, TravelMode};

/// A provider round trip: origin, optimizable waypoints, and a destination
/// equal to the origin so the round closes where it started.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
    pub optimize_waypoints: bool,
    pub travel_mode: TravelMode,
    pub region: String,
}

impl ProviderRequest {
    pub fn round_trip(request: &RouteRequest, travel_mode: TravelMode, region: &str) -> Self {
        let waypoints = request
            .stops
            .iter()
            .filter_map(|stop| stop.coordinates)
            .collect();

        ProviderRequest {
            origin: request.origin,
            destination: request.origin,
            waypoints,
            optimize_waypoints: true,
            travel_mode,
            region: region.to_string(),
        }
    }

    /// `optimize:true|lat,lng|lat,lng|…` — the provider may reorder the
    /// intermediate stops; origin and the closing leg stay fixed.
    pub fn waypoints_param(&self) -> String {
        let mut param = String::from(if self.optimize_waypoints {
            "optimize:true"
        } else {
            "optimize:false"
        });

        for point in &self.waypoints {
            param.push('|');
            param.push_str(&point_param(point));
        }

        param
    }
}

pub fn point_param(point: &GeoPoint) -> String {
    format!("{},{}", point.lat, point.lng)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderStatus {
    Ok,
    ZeroResults,
    UnknownError,
    OverQueryLimit,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DirectionsResponse {
    pub status: ProviderStatus,
    #[serde(default)]
    pub routes: Vec<ProviderRoute>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderRoute {
    pub legs: Vec<ProviderLeg>,
    pub overview_polyline: OverviewPolyline,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OverviewPolyline {
    pub points: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderLeg {
    pub start_address: String,
    pub end_address: String,
    pub duration: ProviderValue,
    pub distance: ProviderValue,
    #[serde(default)]
    pub steps: Vec<ProviderStep>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderStep {
    #[serde(default)]
    pub html_instructions: String,
    pub duration: ProviderValue,
    pub distance: ProviderValue,
}

/// The provider pairs every quantity with display text; only the numeric
/// value matters here.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderValue {
    pub value: f64,
}

impl ProviderRoute {
    pub fn into_resolved(self) -> Result<ResolvedRoute, PolylineError> {
        let path = polyline::decode(&self.overview_polyline.points)?;

        let legs = self
            .legs
            .into_iter()
            .map(|leg| Leg {
                start_address: leg.start_address,
                end_address: leg.end_address,
                duration_seconds: leg.duration.value as i64,
                distance_meters: leg.distance.value,
                steps: leg
                    .steps
                    .into_iter()
                    .map(|step| Step {
                        instruction: step.html_instructions,
                        duration_seconds: step.duration.value as i64,
                        distance_meters: step.distance.value,
                    })
                    .collect(),
            })
            .collect();

        Ok(ResolvedRoute { legs, path })
    }
}
