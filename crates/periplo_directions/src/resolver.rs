use std::time::Duration;

use thiserror::Error;

use periplo_core::request::RouteRequest;
use periplo_core::route::{ResolvedRoute, TravelMode};

use crate::client::DirectionsApi;
use crate::types::{ProviderRequest, ProviderStatus};

#[derive(Clone, Debug)]
pub struct ResolverParams {
    /// Extra attempts after the first call, per mode.
    pub max_retries: u32,
    /// First backoff delay; doubles on every further retry.
    pub initial_backoff: Duration,
    /// Region bias forwarded to the provider.
    pub region: String,
}

impl Default for ResolverParams {
    fn default() -> Self {
        ResolverParams {
            max_retries: 3,
            initial_backoff: Duration::from_millis(400),
            region: "cl".into(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("no route connects the origin and the selected stops")]
    RouteUnreachable,

    #[error("route resolution failed in the requested mode and its fallback")]
    ResolutionFailed,
}

/// A successful resolution. `fallback_applied` marks a transit request that
/// was silently answered with a driving route; callers must surface that
/// substitution to the user.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub route: ResolvedRoute,
    pub mode: TravelMode,
    pub fallback_applied: bool,
}

enum ModeFailure {
    ZeroResults,
    Exhausted,
}

pub struct DirectionsResolver<A> {
    api: A,
    params: ResolverParams,
}

impl<A: DirectionsApi> DirectionsResolver<A> {
    pub fn new(api: A, params: ResolverParams) -> Self {
        Self { api, params }
    }

    pub async fn resolve(&self, request: &RouteRequest) -> Result<Resolution, ResolveError> {
        match self.attempt_mode(request, request.travel_mode).await {
            Ok(route) => Ok(Resolution {
                route,
                mode: request.travel_mode,
                fallback_applied: false,
            }),
            Err(_) if request.travel_mode == TravelMode::Transit => {
                tracing::warn!("transit routing failed, retrying the round as driving");
                match self.attempt_mode(request, TravelMode::Driving).await {
                    Ok(route) => Ok(Resolution {
                        route,
                        mode: TravelMode::Driving,
                        fallback_applied: true,
                    }),
                    Err(_) => Err(ResolveError::ResolutionFailed),
                }
            }
            Err(ModeFailure::ZeroResults) => Err(ResolveError::RouteUnreachable),
            Err(ModeFailure::Exhausted) => Err(ResolveError::ResolutionFailed),
        }
    }

    /// One mode's retry loop: transient statuses and transport errors back
    /// off and retry, a zero-result answer is terminal for the mode.
    async fn attempt_mode(
        &self,
        request: &RouteRequest,
        mode: TravelMode,
    ) -> Result<ResolvedRoute, ModeFailure> {
        let provider_request = ProviderRequest::round_trip(request, mode, &self.params.region);
        let mut backoff = self.params.initial_backoff;

        for attempt in 0..=self.params.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.api.fetch(&provider_request).await {
                Ok(response) => match response.status {
                    ProviderStatus::Ok => match response.routes.into_iter().next() {
                        Some(route) => match route.into_resolved() {
                            Ok(resolved) => return Ok(resolved),
                            Err(err) => {
                                tracing::debug!(%err, attempt, "malformed route in OK response");
                            }
                        },
                        None => return Err(ModeFailure::ZeroResults),
                    },
                    ProviderStatus::ZeroResults => return Err(ModeFailure::ZeroResults),
                    status => {
                        tracing::debug!(
                            ?status,
                            attempt,
                            %mode,
                            message = response.error_message.as_deref().unwrap_or(""),
                            "transient provider status"
                        );
                    }
                },
                Err(err) => {
                    tracing::debug!(%err, attempt, %mode, "provider request failed");
                }
            }
        }

        Err(ModeFailure::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::time::Instant;

    use periplo_core::geopoint::GeoPoint;
    use periplo_core::polyline;
    use periplo_core::request::RouteRequestBuilder;
    use periplo_core::stop::Stop;

    use crate::client::DirectionsError;
    use crate::types::{DirectionsResponse, OverviewPolyline, ProviderLeg, ProviderRoute, ProviderValue};

    use super::*;

    struct ScriptedApi {
        script: Mutex<VecDeque<DirectionsResponse>>,
        calls: Mutex<Vec<(Instant, TravelMode)>>,
    }

    impl ScriptedApi {
        fn new(script: impl IntoIterator<Item = DirectionsResponse>) -> Self {
            ScriptedApi {
                script: Mutex::new(script.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(Instant, TravelMode)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DirectionsApi for &ScriptedApi {
        async fn fetch(
            &self,
            request: &ProviderRequest,
        ) -> Result<DirectionsResponse, DirectionsError> {
            self.calls
                .lock()
                .unwrap()
                .push((Instant::now(), request.travel_mode));
            Ok(self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("provider called more often than scripted"))
        }
    }

    fn status_response(status: ProviderStatus) -> DirectionsResponse {
        DirectionsResponse {
            status,
            routes: vec![],
            error_message: None,
        }
    }

    fn ok_response() -> DirectionsResponse {
        let leg = |duration: f64, distance: f64| ProviderLeg {
            start_address: "Av. Matta 680".into(),
            end_address: "Camino La Pólvora km 5".into(),
            duration: ProviderValue { value: duration },
            distance: ProviderValue { value: distance },
            steps: vec![],
        };

        DirectionsResponse {
            status: ProviderStatus::Ok,
            routes: vec![ProviderRoute {
                legs: vec![leg(600.0, 5000.0), leg(900.0, 7000.0)],
                overview_polyline: OverviewPolyline {
                    points: polyline::encode(&[
                        GeoPoint::new(-33.45, -70.6667),
                        GeoPoint::new(-33.0472, -71.6127),
                    ]),
                },
            }],
            error_message: None,
        }
    }

    fn request(mode: TravelMode) -> RouteRequest {
        RouteRequestBuilder::default()
            .with_origin(GeoPoint::new(-33.45, -70.6667))
            .with_stop(
                Stop::new("s1", "Empresa 1").with_coordinates(GeoPoint::new(-33.0472, -71.6127)),
            )
            .with_travel_mode(mode)
            .build()
            .unwrap()
            .request
    }

    fn params() -> ResolverParams {
        ResolverParams::default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_retry_with_backoff() {
        let api = ScriptedApi::new([
            status_response(ProviderStatus::UnknownError),
            status_response(ProviderStatus::UnknownError),
            ok_response(),
        ]);
        let resolver = DirectionsResolver::new(&api, params());

        let resolution = resolver.resolve(&request(TravelMode::Driving)).await.unwrap();

        assert!(!resolution.fallback_applied);
        assert_eq!(resolution.route.legs.len(), 2);

        let calls = api.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].0 - calls[0].0, Duration::from_millis(400));
        assert_eq!(calls[2].0 - calls[1].0, Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_results_is_not_retried() {
        let api = ScriptedApi::new([status_response(ProviderStatus::ZeroResults)]);
        let resolver = DirectionsResolver::new(&api, params());

        let error = resolver
            .resolve(&request(TravelMode::Driving))
            .await
            .unwrap_err();

        assert_eq!(error, ResolveError::RouteUnreachable);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transit_falls_back_to_driving() {
        let api = ScriptedApi::new([
            status_response(ProviderStatus::ZeroResults),
            ok_response(),
        ]);
        let resolver = DirectionsResolver::new(&api, params());

        let resolution = resolver.resolve(&request(TravelMode::Transit)).await.unwrap();

        assert!(resolution.fallback_applied);
        assert_eq!(resolution.mode, TravelMode::Driving);

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, TravelMode::Transit);
        assert_eq!(calls[1].1, TravelMode::Driving);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_modes_failing_is_terminal() {
        let api = ScriptedApi::new([
            status_response(ProviderStatus::ZeroResults),
            status_response(ProviderStatus::ZeroResults),
        ]);
        let resolver = DirectionsResolver::new(&api, params());

        let error = resolver
            .resolve(&request(TravelMode::Transit))
            .await
            .unwrap_err();

        assert_eq!(error, ResolveError::ResolutionFailed);
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_exhaustion() {
        let api = ScriptedApi::new(
            std::iter::repeat_with(|| status_response(ProviderStatus::OverQueryLimit)).take(4),
        );
        let resolver = DirectionsResolver::new(&api, params());

        let error = resolver
            .resolve(&request(TravelMode::Driving))
            .await
            .unwrap_err();

        assert_eq!(error, ResolveError::ResolutionFailed);
        assert_eq!(api.calls().len(), 4);
    }
}
