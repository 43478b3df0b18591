//! Tiered acquisition of a route map: trusted builder, proxy builder,
//! live snapshot, vector sketch, placeholder. Strictly sequential, first
//! success wins, and every tier failure is absorbed — rendering always
//! produces something to put in the document.

pub mod builder;
pub mod sketch;
pub mod snapshot;

use std::time::Duration;

use serde::Serialize;

use periplo_core::geopoint::GeoPoint;
use periplo_core::polyline;

use crate::builder::{ImageBuilder, MAX_MARKER_STOPS, MapImage, StaticMapPayload};
use crate::sketch::VectorSketch;
use crate::snapshot::{NoSnapshot, SnapshotError, SnapshotSource, SnapshotState};

#[derive(Clone, Debug)]
pub struct RendererParams {
    /// Side of the square image/canvas, pixels.
    pub size: u32,
    pub maptype: String,
    pub region: String,
    /// Wall-clock bound on the live-capture tier.
    pub snapshot_timeout: Duration,
}

impl Default for RendererParams {
    fn default() -> Self {
        RendererParams {
            size: 512,
            maptype: "roadmap".into(),
            region: "cl".into(),
            snapshot_timeout: Duration::from_secs(4),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Placeholder {
    pub size: f64,
    pub caption: String,
}

/// Whatever the tier chain managed to produce.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapArtifact {
    Image(MapImage),
    Sketch(VectorSketch),
    Placeholder(Placeholder),
}

pub struct StaticMapRenderer<B, S = NoSnapshot> {
    primary: B,
    proxy: Option<B>,
    snapshot: Option<S>,
    params: RendererParams,
}

impl<B: ImageBuilder> StaticMapRenderer<B, NoSnapshot> {
    pub fn new(primary: B, params: RendererParams) -> Self {
        StaticMapRenderer {
            primary,
            proxy: None,
            snapshot: None,
            params,
        }
    }
}

impl<B: ImageBuilder, S: SnapshotSource> StaticMapRenderer<B, S> {
    pub fn with_proxy(mut self, proxy: B) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_snapshot<S2: SnapshotSource>(self, snapshot: S2) -> StaticMapRenderer<B, S2> {
        StaticMapRenderer {
            primary: self.primary,
            proxy: self.proxy,
            snapshot: Some(snapshot),
            params: self.params,
        }
    }

    pub async fn render(
        &self,
        path: &[GeoPoint],
        origin: Option<GeoPoint>,
        stops: &[GeoPoint],
    ) -> MapArtifact {
        if path.len() >= 2 {
            let payload = self.payload(path, origin, stops);

            match self.primary.build(&payload).await {
                Ok(image) => return MapArtifact::Image(image),
                Err(err) => tracing::debug!(%err, "trusted image builder failed"),
            }

            if let Some(proxy) = &self.proxy {
                match proxy.build(&payload).await {
                    Ok(image) => return MapArtifact::Image(image),
                    Err(err) => tracing::debug!(%err, "proxy image builder failed"),
                }
            }

            if let Some(source) = &self.snapshot {
                match self.capture_snapshot(source).await {
                    Ok(image) => return MapArtifact::Image(image),
                    Err(err) => tracing::debug!(%err, "live snapshot unavailable"),
                }
            }
        }

        match sketch::sketch_route(path, origin.as_ref(), stops, self.params.size as f64) {
            Ok(sketch) => return MapArtifact::Sketch(sketch),
            Err(err) => tracing::debug!(%err, "vector sketch unavailable"),
        }

        MapArtifact::Placeholder(Placeholder {
            size: self.params.size as f64,
            caption: "Mapa no disponible".into(),
        })
    }

    fn payload(
        &self,
        path: &[GeoPoint],
        origin: Option<GeoPoint>,
        stops: &[GeoPoint],
    ) -> StaticMapPayload {
        let sampled = polyline::downsample(path);

        StaticMapPayload {
            path_enc: polyline::encode(&sampled),
            start: origin,
            stops: stops.iter().copied().take(MAX_MARKER_STOPS).collect(),
            size: self.params.size,
            maptype: self.params.maptype.clone(),
            region: self.params.region.clone(),
        }
    }

    async fn capture_snapshot(&self, source: &S) -> Result<MapImage, SnapshotError> {
        match source.state() {
            SnapshotState::Ready => {}
            SnapshotState::NotLoaded | SnapshotState::Failed => {
                return Err(SnapshotError::NotReady);
            }
        }

        match tokio::time::timeout(self.params.snapshot_timeout, source.capture()).await {
            Ok(result) => result,
            Err(_) => Err(SnapshotError::TimedOut),
        }
    }
}
