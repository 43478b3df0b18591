//! Last resort before the placeholder: a markered line drawing of the
//! route with no basemap imagery.

use serde::Serialize;
use thiserror::Error;

use periplo_core::geopoint::GeoPoint;

/// Intermediate-stop markers rendered before the drawing gets cluttered.
pub const SKETCH_MARKER_CAP: usize = 5;

const CANVAS_PADDING_FRACTION: f64 = 0.06;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Origin,
    Stop,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Segment {
        from: (f64, f64),
        to: (f64, f64),
    },
    Marker {
        at: (f64, f64),
        radius: f64,
        kind: MarkerKind,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct VectorSketch {
    pub size: f64,
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SketchError {
    #[error("fewer than two points to draw")]
    TooFewPoints,
}

struct BBox {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl Default for BBox {
    fn default() -> Self {
        BBox {
            min_lat: f64::MAX,
            max_lat: f64::MIN,
            min_lng: f64::MAX,
            max_lng: f64::MIN,
        }
    }
}

impl BBox {
    fn extend(&mut self, point: &GeoPoint) {
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lat = self.max_lat.max(point.lat);
        self.min_lng = self.min_lng.min(point.lng);
        self.max_lng = self.max_lng.max(point.lng);
    }
}

fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if min == max {
        // Degenerate extent, center everything
        return 0.5;
    }

    (value - min) / (max - min)
}

/// Projects the route into a fixed square canvas and emits draw ops.
/// Latitude increases northward while canvas Y grows downward, so the
/// vertical axis is inverted.
pub fn sketch_route(
    path: &[GeoPoint],
    origin: Option<&GeoPoint>,
    stops: &[GeoPoint],
    size: f64,
) -> Result<VectorSketch, SketchError> {
    if path.len() < 2 {
        return Err(SketchError::TooFewPoints);
    }

    let mut bbox = BBox::default();
    for point in path.iter().chain(origin).chain(stops) {
        bbox.extend(point);
    }

    let padding = size * CANVAS_PADDING_FRACTION;
    let span = size - 2.0 * padding;
    let project = |point: &GeoPoint| {
        let x = padding + normalize(point.lng, bbox.min_lng, bbox.max_lng) * span;
        let y = padding + (1.0 - normalize(point.lat, bbox.min_lat, bbox.max_lat)) * span;
        (x, y)
    };

    let mut ops = Vec::with_capacity(path.len() + stops.len());

    for pair in path.windows(2) {
        ops.push(DrawOp::Segment {
            from: project(&pair[0]),
            to: project(&pair[1]),
        });
    }

    for stop in stops.iter().take(SKETCH_MARKER_CAP) {
        ops.push(DrawOp::Marker {
            at: project(stop),
            radius: size / 64.0,
            kind: MarkerKind::Stop,
        });
    }

    if let Some(origin) = origin {
        ops.push(DrawOp::Marker {
            at: project(origin),
            radius: size / 48.0,
            kind: MarkerKind::Origin,
        });
    }

    Ok(VectorSketch { size, ops })
}
