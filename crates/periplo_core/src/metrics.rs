use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::route::{ResolvedRoute, TravelMode};

/// Business constants behind the derived metrics. Units are explicit so
/// tests and callers can override single values without touching the
/// calculation itself.
#[derive(Clone, Debug)]
pub struct CostModel {
    /// On-site time budgeted per visited stop when driving.
    pub dwell_driving: SignedDuration,
    /// On-site time budgeted per visited stop on public transport. Longer,
    /// to absorb schedule slack between connections.
    pub dwell_transit: SignedDuration,
    /// Assumed vehicle consumption, kilometers per liter.
    pub fuel_km_per_liter: f64,
    /// Fuel price, currency units per liter.
    pub fuel_price_per_liter: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        CostModel {
            dwell_driving: SignedDuration::from_mins(30),
            dwell_transit: SignedDuration::from_mins(45),
            fuel_km_per_liter: 12.0,
            fuel_price_per_liter: 1300.0,
        }
    }
}

impl CostModel {
    pub fn dwell_per_stop(&self, mode: TravelMode) -> SignedDuration {
        match mode {
            TravelMode::Driving => self.dwell_driving,
            TravelMode::Transit => self.dwell_transit,
        }
    }
}

/// Derived, read-only figures for a resolved route. Recomputed whenever the
/// route or travel mode changes; never persisted on their own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub travel_duration: SignedDuration,
    pub dwell_duration: SignedDuration,
    pub total_duration: SignedDuration,
    pub total_distance_meters: f64,
    /// `None` when the mode has no fuel cost (not the same as zero cost).
    pub estimated_fuel_cost: Option<f64>,
}

impl RouteMetrics {
    pub fn compute(route: &ResolvedRoute, mode: TravelMode, model: &CostModel) -> Self {
        let travel_duration = SignedDuration::from_secs(route.travel_seconds());
        let dwell_duration = model.dwell_per_stop(mode) * route.stop_count() as i32;
        let total_distance_meters = route.distance_meters();

        let estimated_fuel_cost = match mode {
            TravelMode::Driving => {
                let kilometers = total_distance_meters / 1000.0;
                Some(kilometers / model.fuel_km_per_liter * model.fuel_price_per_liter)
            }
            TravelMode::Transit => None,
        };

        RouteMetrics {
            travel_duration,
            dwell_duration,
            total_duration: travel_duration + dwell_duration,
            total_distance_meters,
            estimated_fuel_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Leg;

    fn two_leg_route() -> ResolvedRoute {
        let leg = |duration_seconds, distance_meters| Leg {
            start_address: "Liceo".into(),
            end_address: "Empresa".into(),
            duration_seconds,
            distance_meters,
            steps: vec![],
        };

        ResolvedRoute {
            legs: vec![leg(600, 5000.0), leg(900, 7000.0)],
            path: vec![],
        }
    }

    #[test]
    fn test_driving_metrics() {
        let metrics = RouteMetrics::compute(
            &two_leg_route(),
            TravelMode::Driving,
            &CostModel::default(),
        );

        assert_eq!(metrics.travel_duration, SignedDuration::from_secs(1500));
        assert_eq!(metrics.dwell_duration, SignedDuration::from_secs(1800));
        assert_eq!(metrics.total_duration, SignedDuration::from_secs(3300));
        assert_eq!(metrics.total_distance_meters, 12000.0);
        // 12 km at 12 km/L is one liter
        assert_eq!(metrics.estimated_fuel_cost, Some(1300.0));
    }

    #[test]
    fn test_transit_metrics() {
        let metrics = RouteMetrics::compute(
            &two_leg_route(),
            TravelMode::Transit,
            &CostModel::default(),
        );

        assert_eq!(metrics.dwell_duration, SignedDuration::from_secs(2700));
        assert_eq!(metrics.total_duration, SignedDuration::from_secs(4200));
        assert_eq!(metrics.estimated_fuel_cost, None);
    }

    #[test]
    fn test_empty_route() {
        let empty = ResolvedRoute {
            legs: vec![],
            path: vec![],
        };

        let driving = RouteMetrics::compute(&empty, TravelMode::Driving, &CostModel::default());
        let transit = RouteMetrics::compute(&empty, TravelMode::Transit, &CostModel::default());

        assert_eq!(driving.total_duration, SignedDuration::ZERO);
        assert_eq!(driving.total_distance_meters, 0.0);
        assert_eq!(driving.estimated_fuel_cost, Some(0.0));
        assert_eq!(transit.estimated_fuel_cost, None);
    }
}
