//! Landmark data types, layout index tables and the five-point reducer.
//!
//! A [`LandmarkSet`] is the dense point list produced by an external landmark
//! model. Which array position means which anatomical feature is described by
//! a [`LandmarkLayout`]; the engine never hardcodes indices outside of it.
//!
//! WFLW-98 layout summary:
//! - 0..=32: face contour, left to right in image space (16 is the chin)
//! - 33..=41 / 42..=50: left / right eyebrow (33 and 46 are the outer ends)
//! - 51..=54: nose bridge, top to tip
//! - 60..=67 / 68..=75: left / right eye
//! - 76..=95: mouth (76 and 82 are the outer corners)
//! - 96 / 97: left / right pupil

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Rounded integer pixel position, as used by the drawing routines.
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// Dense landmark output of an external model, index-addressed per a
/// [`LandmarkLayout`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    pub points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Point> {
        self.points.get(idx).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }
}

impl From<Vec<Point>> for LandmarkSet {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl FromIterator<Point> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl std::ops::Index<usize> for LandmarkSet {
    type Output = Point;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.points[idx]
    }
}

/// Canonical five reference points: left eye, right eye, nose,
/// left mouth corner, right mouth corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FivePointSet {
    pub points: [Point; 5],
}

impl FivePointSet {
    pub const LEFT_EYE: usize = 0;
    pub const RIGHT_EYE: usize = 1;
    pub const NOSE: usize = 2;
    pub const LEFT_MOUTH: usize = 3;
    pub const RIGHT_MOUTH: usize = 4;

    pub const fn new(points: [Point; 5]) -> Self {
        Self { points }
    }

    pub fn left_eye(&self) -> Point {
        self.points[Self::LEFT_EYE]
    }

    pub fn right_eye(&self) -> Point {
        self.points[Self::RIGHT_EYE]
    }

    pub fn nose(&self) -> Point {
        self.points[Self::NOSE]
    }

    pub fn left_mouth(&self) -> Point {
        self.points[Self::LEFT_MOUTH]
    }

    pub fn right_mouth(&self) -> Point {
        self.points[Self::RIGHT_MOUTH]
    }

    /// X coordinate of the vertical symmetry axis (midpoint of the eyes).
    pub fn center_x(&self) -> f32 {
        self.left_eye().midpoint(&self.right_eye()).x
    }
}

/// Indices of the five reference points within a dense layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FivePointIndices {
    pub left_eye: usize,
    pub right_eye: usize,
    pub nose: usize,
    pub left_mouth: usize,
    pub right_mouth: usize,
}

impl FivePointIndices {
    fn as_array(&self) -> [usize; 5] {
        [
            self.left_eye,
            self.right_eye,
            self.nose,
            self.left_mouth,
            self.right_mouth,
        ]
    }
}

/// Indices of the endpoints used for the four structural measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementIndices {
    pub chin: usize,
    pub nose_bridge_top: usize,
    pub left_cheek: usize,
    pub right_cheek: usize,
    pub left_brow_outer: usize,
    pub right_brow_outer: usize,
    pub left_jaw: usize,
    pub right_jaw: usize,
}

impl MeasurementIndices {
    fn as_array(&self) -> [usize; 8] {
        [
            self.chin,
            self.nose_bridge_top,
            self.left_cheek,
            self.right_cheek,
            self.left_brow_outer,
            self.right_brow_outer,
            self.left_jaw,
            self.right_jaw,
        ]
    }
}

/// Index table for one landmark annotation scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkLayout {
    pub name: String,
    pub num_points: usize,
    pub five_point: FivePointIndices,
    pub measurement: MeasurementIndices,
}

impl LandmarkLayout {
    pub const WFLW98_POINTS: usize = 98;

    pub fn wflw98() -> Self {
        Self {
            name: "wflw98".to_string(),
            num_points: Self::WFLW98_POINTS,
            five_point: FivePointIndices {
                left_eye: 96,
                right_eye: 97,
                nose: 54,
                left_mouth: 76,
                right_mouth: 82,
            },
            measurement: MeasurementIndices {
                chin: 16,
                nose_bridge_top: 51,
                left_cheek: 0,
                right_cheek: 32,
                left_brow_outer: 33,
                right_brow_outer: 46,
                left_jaw: 8,
                right_jaw: 24,
            },
        }
    }

    /// First index in the table that does not fit inside `num_points`.
    pub fn out_of_range_index(&self) -> Option<usize> {
        self.five_point
            .as_array()
            .into_iter()
            .chain(self.measurement.as_array())
            .find(|&idx| idx >= self.num_points)
    }
}

impl Default for LandmarkLayout {
    fn default() -> Self {
        Self::wflw98()
    }
}

/// Reduce a dense landmark set to the five reference points.
///
/// Fails with [`Error::UnsupportedLayout`] when the landmark count does not
/// match the layout's table; callers treat that as a soft failure.
pub fn reduce_to_five(landmarks: &LandmarkSet, layout: &LandmarkLayout) -> Result<FivePointSet> {
    let count = landmarks.len();
    if count != layout.num_points {
        return Err(Error::UnsupportedLayout { count });
    }

    let idx = layout.five_point.as_array();
    let mut points = [Point::default(); 5];
    for (slot, &i) in points.iter_mut().zip(idx.iter()) {
        *slot = landmarks
            .get(i)
            .ok_or(Error::UnsupportedLayout { count })?;
    }
    Ok(FivePointSet::new(points))
}
