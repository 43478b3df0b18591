use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    Driving,
    Transit,
}

impl Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TravelMode::Driving => "driving",
                TravelMode::Transit => "transit",
            }
        )
    }
}

/// One provider segment between two consecutive visits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Leg {
    pub start_address: String,
    pub end_address: String,
    pub duration_seconds: i64,
    pub distance_meters: f64,
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    pub instruction: String,
    pub duration_seconds: i64,
    pub distance_meters: f64,
}

/// The provider's answer for a supervision round: ordered legs plus the
/// decoded overview path used for map rendering.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub legs: Vec<Leg>,
    pub path: Vec<GeoPoint>,
}

impl ResolvedRoute {
    /// Number of visited stops. A round trip with N stops yields N+1 legs
    /// (the last one returns to the origin), so a single leg means the
    /// route never left the origin's neighborhood.
    pub fn stop_count(&self) -> usize {
        if self.legs.len() > 1 {
            self.legs.len() - 1
        } else {
            0
        }
    }

    pub fn travel_seconds(&self) -> i64 {
        self.legs.iter().map(|leg| leg.duration_seconds).sum()
    }

    pub fn distance_meters(&self) -> f64 {
        self.legs.iter().map(|leg| leg.distance_meters).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(duration_seconds: i64, distance_meters: f64) -> Leg {
        Leg {
            start_address: "A".into(),
            end_address: "B".into(),
            duration_seconds,
            distance_meters,
            steps: vec![],
        }
    }

    #[test]
    fn test_stop_count_round_trip() {
        let route = ResolvedRoute {
            legs: vec![leg(600, 5000.0), leg(900, 7000.0), leg(300, 2000.0)],
            path: vec![],
        };

        assert_eq!(route.stop_count(), 2);
    }

    #[test]
    fn test_stop_count_degenerate() {
        let single = ResolvedRoute {
            legs: vec![leg(600, 5000.0)],
            path: vec![],
        };
        let empty = ResolvedRoute {
            legs: vec![],
            path: vec![],
        };

        assert_eq!(single.stop_count(), 0);
        assert_eq!(empty.stop_count(), 0);
    }

    #[test]
    fn test_totals() {
        let route = ResolvedRoute {
            legs: vec![leg(600, 5000.0), leg(900, 7000.0)],
            path: vec![],
        };

        assert_eq!(route.travel_seconds(), 1500);
        assert_eq!(route.distance_meters(), 12000.0);
    }
}
