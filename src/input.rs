//! Boundary inputs: decoded images and landmark files written by an
//! external landmark model.
//!
//! Accepted landmark file shapes (JSON):
//! - `[[x, y], [x, y], ...]`
//! - `[{"x": .., "y": ..}, ...]`
//! - `{"landmarks": <either of the above>}`

use anyhow::{Context, Result};
use faceform_geometry::{LandmarkSet, Point};
use image::RgbImage;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair([f32; 2]),
    Object { x: f32, y: f32 },
}

impl From<RawPoint> for Point {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Pair([x, y]) => Point::new(x, y),
            RawPoint::Object { x, y } => Point::new(x, y),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkFile {
    Bare(Vec<RawPoint>),
    Wrapped { landmarks: Vec<RawPoint> },
}

pub fn parse_landmarks(raw: &str) -> Result<LandmarkSet> {
    let file: LandmarkFile = serde_json::from_str(raw).context("parsing landmark JSON")?;
    let points = match file {
        LandmarkFile::Bare(points) | LandmarkFile::Wrapped { landmarks: points } => points,
    };
    let set: LandmarkSet = points.into_iter().map(Point::from).collect();
    if let Some(bad) = set.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
        anyhow::bail!("landmark {} is not a finite coordinate", bad);
    }
    Ok(set)
}

pub fn load_landmarks(path: &Path) -> Result<LandmarkSet> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading landmarks {}", path.display()))?;
    let set = parse_landmarks(&raw).with_context(|| format!("in {}", path.display()))?;
    log::debug!("loaded {} landmarks from {}", set.len(), path.display());
    Ok(set)
}

/// Decode any supported image into a 3-channel buffer.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).with_context(|| format!("decoding image {}", path.display()))?;
    Ok(img.to_rgb8())
}
