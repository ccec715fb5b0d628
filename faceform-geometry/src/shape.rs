//! Face shape classification from four structural measurements.
//!
//! Categories are not mutually exclusive under the raw ratios; the result is
//! well defined only because the rules are evaluated in a fixed order and the
//! first match wins:
//!
//! 1. jaw wider than cheekbones and forehead: Pear
//! 2. forehead > cheekbones > jaw: Heart/triangle
//! 3. short face (aspect < long_face_aspect): Square or Round by jaw/cheek
//! 4. long face: Rectangle/elongated when jaw and forehead are both close to
//!    cheekbone width, otherwise Oval

use crate::error::{Error, Result};
use crate::landmarks::{LandmarkLayout, LandmarkSet, Point};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceShape {
    Pear,
    Heart,
    Square,
    Round,
    Rectangle,
    Oval,
    Undetermined,
}

impl FaceShape {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pear => "Pear",
            Self::Heart => "Heart/triangle",
            Self::Square => "Square",
            Self::Round => "Round",
            Self::Rectangle => "Rectangle/elongated",
            Self::Oval => "Oval",
            Self::Undetermined => "undetermined",
        }
    }

    /// Fixed styling guidance for each category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Pear => {
                "The jawline is the widest part of the face, with a narrower forehead. \
                 Volume and width at the crown and temples balance the lower face; \
                 avoid cuts that end at the jaw."
            }
            Self::Heart => {
                "A wide forehead tapering to a narrow jaw and chin. Side-swept fringes \
                 and chin-length cuts with volume at the bottom soften the upper width."
            }
            Self::Square => {
                "Face length and width are similar, with a strong, angular jaw. Soft \
                 layers, waves and rounded frames relax the angles."
            }
            Self::Round => {
                "Face length and width are similar, with soft curves and a rounded jaw. \
                 Height at the crown and angular frames add definition and length."
            }
            Self::Rectangle => {
                "A long face with forehead, cheekbones and jaw of similar width. Fringes \
                 and volume at the sides shorten and widen the visual proportions."
            }
            Self::Oval => {
                "Balanced proportions, longer than wide, with a gently tapering jaw. \
                 Most cuts and frames suit this shape."
            }
            Self::Undetermined => "The face shape could not be determined.",
        }
    }
}

/// One structural dimension of the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    Height,
    Cheekbone,
    Forehead,
    Jaw,
}

impl Span {
    pub const ALL: [Span; 4] = [Span::Height, Span::Cheekbone, Span::Forehead, Span::Jaw];
}

/// Two endpoints of one measured span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPair {
    pub start: Point,
    pub end: Point,
}

impl MeasurementPair {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn dx(&self) -> f32 {
        (self.end.x - self.start.x).abs()
    }

    pub fn dy(&self) -> f32 {
        (self.end.y - self.start.y).abs()
    }
}

pub type MeasurementPoints = BTreeMap<Span, MeasurementPair>;

/// Calibration constants for the decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeThresholds {
    /// Aspect ratio (height / cheekbone width) from which a face counts as long.
    pub long_face_aspect: f32,
    /// Jaw/cheek ratio above which a short face is square.
    pub square_jaw_to_cheek: f32,
    /// Jaw/cheek ratio above which a long face may be rectangular.
    pub rectangle_jaw_to_cheek: f32,
    /// Forehead/cheek ratio above which a long face may be rectangular.
    pub rectangle_forehead_to_cheek: f32,
}

impl Default for ShapeThresholds {
    fn default() -> Self {
        Self {
            long_face_aspect: 1.1,
            square_jaw_to_cheek: 0.92,
            rectangle_jaw_to_cheek: 0.9,
            rectangle_forehead_to_cheek: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMeasurements {
    pub face_height: f32,
    pub cheekbone_width: f32,
    pub forehead_width: f32,
    pub jaw_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeRatios {
    pub aspect: f32,
    pub jaw_to_cheek: f32,
    pub forehead_to_cheek: f32,
}

impl FaceMeasurements {
    pub fn from_points(points: &MeasurementPoints) -> Option<Self> {
        Some(Self {
            face_height: points.get(&Span::Height)?.dy(),
            cheekbone_width: points.get(&Span::Cheekbone)?.dx(),
            forehead_width: points.get(&Span::Forehead)?.dx(),
            jaw_width: points.get(&Span::Jaw)?.dx(),
        })
    }

    pub fn ratios(&self) -> Result<ShapeRatios> {
        if self.cheekbone_width == 0.0 || self.face_height == 0.0 {
            return Err(Error::DegenerateGeometry("zero face height or cheekbone width"));
        }
        Ok(ShapeRatios {
            aspect: self.face_height / self.cheekbone_width,
            jaw_to_cheek: self.jaw_width / self.cheekbone_width,
            forehead_to_cheek: self.forehead_width / self.cheekbone_width,
        })
    }

    /// Run the ordered decision tree.
    pub fn classify(&self, thresholds: &ShapeThresholds) -> Result<FaceShape> {
        let ratios = self.ratios()?;
        debug!("shape measurements: {:?} ratios: {:?}", self, ratios);

        let (jaw, cheek, forehead) = (self.jaw_width, self.cheekbone_width, self.forehead_width);
        if jaw > cheek && jaw > forehead {
            return Ok(FaceShape::Pear);
        }
        if forehead > cheek && cheek > jaw {
            return Ok(FaceShape::Heart);
        }

        let shape = if ratios.aspect < thresholds.long_face_aspect {
            if ratios.jaw_to_cheek > thresholds.square_jaw_to_cheek {
                FaceShape::Square
            } else {
                FaceShape::Round
            }
        } else if ratios.jaw_to_cheek > thresholds.rectangle_jaw_to_cheek
            && ratios.forehead_to_cheek > thresholds.rectangle_forehead_to_cheek
        {
            FaceShape::Rectangle
        } else {
            FaceShape::Oval
        };
        Ok(shape)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeResult {
    pub shape: FaceShape,
    pub description: String,
    pub measurement_points: MeasurementPoints,
    pub measurements: Option<FaceMeasurements>,
}

impl ShapeResult {
    fn undetermined(description: &str, measurement_points: MeasurementPoints) -> Self {
        Self {
            shape: FaceShape::Undetermined,
            description: description.to_string(),
            measurement_points,
            measurements: None,
        }
    }

    pub fn shape_name(&self) -> &'static str {
        self.shape.name()
    }
}

const INSUFFICIENT_DATA: &str =
    "Not enough landmark data to determine the face shape.";
const NO_PROPORTIONS: &str =
    "Could not compute face proportions from the landmarks.";

/// Look up the endpoints of the four spans in a dense landmark set.
pub fn measurement_points(
    landmarks: &LandmarkSet,
    layout: &LandmarkLayout,
) -> Result<MeasurementPoints> {
    let count = landmarks.len();
    if count != layout.num_points {
        return Err(Error::InsufficientData {
            count,
            required: layout.num_points,
        });
    }

    let at = |idx: usize| {
        landmarks.get(idx).ok_or(Error::InsufficientData {
            count,
            required: idx + 1,
        })
    };
    let m = &layout.measurement;

    let mut points = MeasurementPoints::new();
    points.insert(
        Span::Height,
        MeasurementPair::new(at(m.nose_bridge_top)?, at(m.chin)?),
    );
    points.insert(
        Span::Cheekbone,
        MeasurementPair::new(at(m.left_cheek)?, at(m.right_cheek)?),
    );
    points.insert(
        Span::Forehead,
        MeasurementPair::new(at(m.left_brow_outer)?, at(m.right_brow_outer)?),
    );
    points.insert(
        Span::Jaw,
        MeasurementPair::new(at(m.left_jaw)?, at(m.right_jaw)?),
    );
    Ok(points)
}

/// Classify a dense landmark set. Never fails: missing data and degenerate
/// proportions resolve to [`FaceShape::Undetermined`].
pub fn classify_shape(
    landmarks: &LandmarkSet,
    layout: &LandmarkLayout,
    thresholds: &ShapeThresholds,
) -> ShapeResult {
    let points = match measurement_points(landmarks, layout) {
        Ok(points) => points,
        Err(e) => {
            debug!("shape undetermined: {}", e);
            return ShapeResult::undetermined(INSUFFICIENT_DATA, MeasurementPoints::new());
        }
    };

    let Some(measurements) = FaceMeasurements::from_points(&points) else {
        return ShapeResult::undetermined(INSUFFICIENT_DATA, MeasurementPoints::new());
    };

    match measurements.classify(thresholds) {
        Ok(shape) => ShapeResult {
            shape,
            description: shape.description().to_string(),
            measurement_points: points,
            measurements: Some(measurements),
        },
        Err(e) => {
            debug!("shape undetermined: {}", e);
            ShapeResult::undetermined(NO_PROPORTIONS, points)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn m(face_height: f32, cheekbone_width: f32, forehead_width: f32, jaw_width: f32) -> FaceMeasurements {
        FaceMeasurements {
            face_height,
            cheekbone_width,
            forehead_width,
            jaw_width,
        }
    }

    #[rstest]
    #[case::pear(m(100.0, 100.0, 80.0, 120.0), FaceShape::Pear)]
    // also satisfies the long-face rectangle ratios; rule 1 wins
    #[case::pear_before_rectangle(m(200.0, 100.0, 95.0, 101.0), FaceShape::Pear)]
    #[case::heart(m(140.0, 100.0, 120.0, 70.0), FaceShape::Heart)]
    #[case::square(m(100.0, 100.0, 97.0, 97.0), FaceShape::Square)]
    #[case::round(m(100.0, 100.0, 90.0, 92.0), FaceShape::Round)]
    #[case::rectangle(m(150.0, 100.0, 95.0, 95.0), FaceShape::Rectangle)]
    #[case::oval(m(150.0, 100.0, 85.0, 80.0), FaceShape::Oval)]
    #[case::oval_wide_forehead_only(m(150.0, 100.0, 95.0, 90.0), FaceShape::Oval)]
    fn decision_tree(#[case] input: FaceMeasurements, #[case] expected: FaceShape) {
        assert_eq!(input.classify(&ShapeThresholds::default()).unwrap(), expected);
    }

    #[test]
    fn aspect_boundary_is_long_face() {
        // aspect == 1.1 takes the long-face branch
        let at_boundary = m(110.0, 100.0, 95.0, 95.0);
        assert_eq!(
            at_boundary.classify(&ShapeThresholds::default()).unwrap(),
            FaceShape::Rectangle
        );
    }

    #[test]
    fn jaw_ratio_boundary_is_strict() {
        // jaw_to_cheek == 0.92 is not square
        let boundary = m(100.0, 100.0, 90.0, 92.0);
        assert_eq!(
            boundary.classify(&ShapeThresholds::default()).unwrap(),
            FaceShape::Round
        );
    }

    #[test]
    fn zero_dimensions_are_degenerate() {
        let t = ShapeThresholds::default();
        assert!(matches!(
            m(0.0, 100.0, 90.0, 90.0).classify(&t),
            Err(Error::DegenerateGeometry(_))
        ));
        assert!(matches!(
            m(100.0, 0.0, 90.0, 90.0).classify(&t),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn custom_thresholds_move_the_boundary() {
        let t = ShapeThresholds {
            long_face_aspect: 1.6,
            ..ShapeThresholds::default()
        };
        assert_eq!(m(150.0, 100.0, 95.0, 95.0).classify(&t).unwrap(), FaceShape::Square);
    }

    #[test]
    fn wrong_count_is_undetermined() {
        let layout = LandmarkLayout::wflw98();
        for n in [0usize, 5, 68, 97, 99] {
            let set: LandmarkSet = (0..n).map(|i| Point::new(i as f32, 1.0)).collect();
            let result = classify_shape(&set, &layout, &ShapeThresholds::default());
            assert_eq!(result.shape, FaceShape::Undetermined);
            assert_eq!(result.description, INSUFFICIENT_DATA);
            assert!(result.measurement_points.is_empty());
            assert!(result.measurements.is_none());
        }
    }

    #[test]
    fn flat_landmarks_cannot_be_proportioned() {
        let layout = LandmarkLayout::wflw98();
        let set: LandmarkSet = (0..98).map(|_| Point::new(10.0, 10.0)).collect();
        let result = classify_shape(&set, &layout, &ShapeThresholds::default());
        assert_eq!(result.shape, FaceShape::Undetermined);
        assert_eq!(result.description, NO_PROPORTIONS);
        assert_eq!(result.measurement_points.len(), 4);
    }

    #[test]
    fn names_and_descriptions() {
        assert_eq!(FaceShape::Heart.name(), "Heart/triangle");
        assert_eq!(FaceShape::Rectangle.name(), "Rectangle/elongated");
        assert_eq!(FaceShape::Undetermined.name(), "undetermined");
        assert!(!FaceShape::Oval.description().is_empty());
    }
}
