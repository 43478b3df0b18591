//! Compact ASCII path encoding for route geometries.
//!
//! Deltas in microdegrees, zig-zag transformed, emitted as 5-bit groups
//! with a 0x20 continuation bit and a +63 printable offset. Lossy at 1e-5
//! degrees; round-trips exactly at that precision.

use thiserror::Error;

use crate::geopoint::GeoPoint;

/// Paths longer than this are downsampled before encoding so the encoded
/// string stays within provider URL limits.
pub const MAX_ENCODED_POINTS: usize = 200;

const PRECISION: f64 = 1e5;

#[derive(Debug, Error, PartialEq)]
pub enum PolylineError {
    #[error("encoded polyline ends mid-value")]
    Truncated,

    #[error("invalid polyline character {0:?}")]
    InvalidCharacter(char),
}

pub fn encode(points: &[GeoPoint]) -> String {
    let mut out = String::with_capacity(points.len() * 10);
    let mut last_lat = 0i64;
    let mut last_lng = 0i64;

    for point in points {
        let lat = (point.lat * PRECISION).round() as i64;
        let lng = (point.lng * PRECISION).round() as i64;

        encode_value(lat - last_lat, &mut out);
        encode_value(lng - last_lng, &mut out);

        last_lat = lat;
        last_lng = lng;
    }

    out
}

pub fn decode(encoded: &str) -> Result<Vec<GeoPoint>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();

    let mut idx = 0;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while idx < bytes.len() {
        let (delta_lat, next) = decode_value(bytes, idx)?;
        let (delta_lng, next) = decode_value(bytes, next)?;

        lat += delta_lat;
        lng += delta_lng;
        idx = next;

        points.push(GeoPoint {
            lat: lat as f64 / PRECISION,
            lng: lng as f64 / PRECISION,
        });
    }

    Ok(points)
}

/// Keeps every `ceil(n / MAX_ENCODED_POINTS)`-th point, and always the
/// final one so the path still ends where the route ends.
pub fn downsample(points: &[GeoPoint]) -> Vec<GeoPoint> {
    if points.len() <= MAX_ENCODED_POINTS {
        return points.to_vec();
    }

    let step = points.len().div_ceil(MAX_ENCODED_POINTS);
    let mut sampled: Vec<GeoPoint> = points.iter().step_by(step).copied().collect();

    if (points.len() - 1) % step != 0 {
        if let Some(last) = points.last() {
            sampled.push(*last);
        }
    }

    sampled
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };

    while v >= 0x20 {
        out.push(((0x20 | (v & 0x1f)) as u8 + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}

fn decode_value(bytes: &[u8], mut idx: usize) -> Result<(i64, usize), PolylineError> {
    let mut accumulated = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(idx) else {
            return Err(PolylineError::Truncated);
        };
        if byte < 63 {
            return Err(PolylineError::InvalidCharacter(byte as char));
        }

        let chunk = (byte - 63) as i64;
        accumulated |= (chunk & 0x1f) << shift;
        shift += 5;
        idx += 1;

        if chunk & 0x20 == 0 {
            break;
        }
    }

    let delta = if accumulated & 1 != 0 {
        !(accumulated >> 1)
    } else {
        accumulated >> 1
    };

    Ok((delta, idx))
}
