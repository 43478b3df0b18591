use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use thiserror::Error;

use periplo_core::geopoint::GeoPoint;

/// Marker budget accepted by the image-builder endpoint.
pub const MAX_MARKER_STOPS: usize = 8;

#[derive(Clone, Debug, Serialize)]
pub struct StaticMapPayload {
    #[serde(rename = "pathEnc")]
    pub path_enc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<GeoPoint>,
    pub stops: Vec<GeoPoint>,
    pub size: u32,
    pub maptype: String,
    pub region: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct MapImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("image builder returned {status}")]
    Status { status: u16 },

    #[error("image builder returned {content_type:?}, not an image")]
    NotAnImage { content_type: String },
}

/// One rendering tier that turns an encoded path into raster bytes. The
/// trusted and proxy endpoints both implement this; tests script it.
pub trait ImageBuilder: Send + Sync {
    fn build(
        &self,
        payload: &StaticMapPayload,
    ) -> impl Future<Output = Result<MapImage, BuilderError>> + Send;
}

/// Backend composition endpoint holding the map-provider credential
/// server side; the client only ever sees image bytes.
pub struct ImageBuilderClient {
    endpoint: String,
    client: reqwest::Client,
}

impl ImageBuilderClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl ImageBuilder for ImageBuilderClient {
    async fn build(&self, payload: &StaticMapPayload) -> Result<MapImage, BuilderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BuilderError::Status {
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.starts_with("image/") {
            return Err(BuilderError::NotAnImage { content_type });
        }

        let bytes = response.bytes().await?.to_vec();

        Ok(MapImage {
            content_type,
            bytes,
        })
    }
}
