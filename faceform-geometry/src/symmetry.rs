//! Symmetry scoring over the five reference points.
//!
//! The score measures how far the eyes and mouth corners are from being
//! mirror images of each other about the vertical axis through the eye
//! midpoint, normalized by the inter-eye distance:
//!
//! ```text
//! avg_x = (| |le.x - c| - |re.x - c| | + | |lm.x - c| - |rm.x - c| |) / 2
//! avg_y = (|le.y - re.y| + |lm.y - rm.y|) / 2
//! index = max(0, 100 - ((avg_x + avg_y) / eye_distance) / max_deviation * 100)
//! ```

use crate::error::{Error, Result};
use crate::landmarks::{reduce_to_five, FivePointSet, LandmarkLayout, LandmarkSet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Calibration constants for the symmetry score and its text buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetryThresholds {
    /// Normalized deviation at which the index reaches 0.
    pub max_deviation: f32,
    pub excellent: f32,
    pub high: f32,
    pub good: f32,
}

impl Default for SymmetryThresholds {
    fn default() -> Self {
        Self {
            max_deviation: 0.4,
            excellent: 90.0,
            high: 75.0,
            good: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryBucket {
    Excellent,
    High,
    Good,
    NoticeableDeviation,
}

impl SymmetryBucket {
    /// Threshold ladder, evaluated top-down.
    pub fn classify(index: f32, thresholds: &SymmetryThresholds) -> Self {
        if index > thresholds.excellent {
            Self::Excellent
        } else if index > thresholds.high {
            Self::High
        } else if index > thresholds.good {
            Self::Good
        } else {
            Self::NoticeableDeviation
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent facial symmetry.",
            Self::High => "High facial symmetry.",
            Self::Good => "Good facial symmetry with minor deviations.",
            Self::NoticeableDeviation => "Noticeable deviation from facial symmetry.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmetryResult {
    /// Symmetry percentage in [0, 100], two decimals.
    pub index: f32,
    pub bucket: SymmetryBucket,
}

impl SymmetryResult {
    fn new(index: f32, thresholds: &SymmetryThresholds) -> Self {
        Self {
            index,
            bucket: SymmetryBucket::classify(index, thresholds),
        }
    }

    /// Result used whenever the score cannot be computed.
    pub fn floor(thresholds: &SymmetryThresholds) -> Self {
        Self::new(0.0, thresholds)
    }

    pub fn description(&self) -> &'static str {
        self.bucket.description()
    }
}

/// Raw symmetry percentage, or [`Error::DegenerateGeometry`] when the eyes
/// coincide.
pub fn symmetry_index(five: &FivePointSet, thresholds: &SymmetryThresholds) -> Result<f32> {
    let (le, re) = (five.left_eye(), five.right_eye());
    let (lm, rm) = (five.left_mouth(), five.right_mouth());
    let center_x = five.center_x();

    let diff_eyes_x = ((le.x - center_x).abs() - (re.x - center_x).abs()).abs();
    let diff_mouth_x = ((lm.x - center_x).abs() - (rm.x - center_x).abs()).abs();
    let avg_x_deviation = (diff_eyes_x + diff_mouth_x) / 2.0;

    let avg_y_deviation = ((le.y - re.y).abs() + (lm.y - rm.y).abs()) / 2.0;

    let eye_distance = le.distance(&re);
    if eye_distance == 0.0 {
        return Err(Error::DegenerateGeometry("eye points coincide"));
    }

    let normalized = (avg_x_deviation + avg_y_deviation) / eye_distance;
    let percentage = (100.0 - normalized / thresholds.max_deviation * 100.0).max(0.0);
    debug!(
        "symmetry: avg_x={:.3} avg_y={:.3} eye_distance={:.3} normalized={:.4} -> {:.2}",
        avg_x_deviation, avg_y_deviation, eye_distance, normalized, percentage
    );

    Ok(round2(percentage))
}

/// Score a five-point set. Degenerate geometry floors to 0.
pub fn score_symmetry(five: &FivePointSet, thresholds: &SymmetryThresholds) -> SymmetryResult {
    match symmetry_index(five, thresholds) {
        Ok(index) => SymmetryResult::new(index, thresholds),
        Err(e) => {
            debug!("symmetry floored to 0: {}", e);
            SymmetryResult::floor(thresholds)
        }
    }
}

/// Reduce and score a dense landmark set, returning the reference points
/// that were scored. Empty input and unsupported layouts floor to 0 instead
/// of failing.
pub fn symmetry_from_landmarks(
    landmarks: &LandmarkSet,
    layout: &LandmarkLayout,
    thresholds: &SymmetryThresholds,
) -> (SymmetryResult, Option<FivePointSet>) {
    if landmarks.is_empty() {
        return (SymmetryResult::floor(thresholds), None);
    }
    match reduce_to_five(landmarks, layout) {
        Ok(five) => (score_symmetry(&five, thresholds), Some(five)),
        Err(e) => {
            warn!("skipping symmetry score: {}", e);
            (SymmetryResult::floor(thresholds), None)
        }
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
