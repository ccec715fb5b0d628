use image::RgbImage;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::landmarks::{FivePointSet, LandmarkLayout, LandmarkSet};
use crate::overlay::{self, Overlay, RenderStyle};
use crate::shape::{classify_shape, ShapeResult, ShapeThresholds};
use crate::symmetry::{symmetry_from_landmarks, SymmetryResult, SymmetryThresholds};

/// Every tunable of the engine, passed by value into [`Analyzer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub jpeg_quality: u8,
    pub layout: LandmarkLayout,
    pub symmetry: SymmetryThresholds,
    pub shape: ShapeThresholds,
    pub render: RenderStyle,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            layout: LandmarkLayout::default(),
            symmetry: SymmetryThresholds::default(),
            shape: ShapeThresholds::default(),
            render: RenderStyle::default(),
        }
    }
}

/// Results of one analysis call, with both annotated images.
#[derive(Debug, Clone)]
pub struct FaceAnalysis {
    pub symmetry: SymmetryResult,
    /// `None` when the landmark layout could not be reduced.
    pub five_points: Option<FivePointSet>,
    pub shape: ShapeResult,
    pub symmetry_image: RgbImage,
    pub shape_image: RgbImage,
}

/// JPEG bytes of the two annotated images.
#[derive(Debug, Clone)]
pub struct EncodedImages {
    pub symmetry: Vec<u8>,
    pub shape: Vec<u8>,
}

impl FaceAnalysis {
    pub fn encode(&self, quality: u8) -> Result<EncodedImages> {
        Ok(EncodedImages {
            symmetry: overlay::encode_jpeg(&self.symmetry_image, quality)?,
            shape: overlay::encode_jpeg(&self.shape_image, quality)?,
        })
    }
}

/// Full analysis: reduce → score, classify, render both overlays.
///
/// Holds only immutable configuration and can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn symmetry(&self, landmarks: &LandmarkSet) -> (SymmetryResult, Option<FivePointSet>) {
        symmetry_from_landmarks(landmarks, &self.config.layout, &self.config.symmetry)
    }

    pub fn shape(&self, landmarks: &LandmarkSet) -> ShapeResult {
        classify_shape(landmarks, &self.config.layout, &self.config.shape)
    }

    /// Analyze one face. Never fails; degraded inputs produce sentinel
    /// results and landmark-only images.
    pub fn analyze(&self, image: &RgbImage, landmarks: &LandmarkSet) -> FaceAnalysis {
        let style = &self.config.render;

        let (symmetry, five_points) = self.symmetry(landmarks);
        let symmetry_image = match &five_points {
            Some(five) => overlay::render_overlay(image, landmarks, Overlay::Symmetry(five), style),
            None => overlay::render_landmarks(image, landmarks, style),
        };

        let shape = self.shape(landmarks);
        let shape_image = overlay::render_overlay(
            image,
            landmarks,
            Overlay::Shape(&shape.measurement_points),
            style,
        );

        info!(
            "analyzed {} landmarks: symmetry {:.2}% ({:?}), shape {}",
            landmarks.len(),
            symmetry.index,
            symmetry.bucket,
            shape.shape_name()
        );
        debug!("measurement points: {:?}", shape.measurement_points);

        FaceAnalysis {
            symmetry,
            five_points,
            shape,
            symmetry_image,
            shape_image,
        }
    }

    /// [`Analyzer::analyze`] followed by JPEG encoding; encode failure is
    /// the only error.
    pub fn analyze_encoded(
        &self,
        image: &RgbImage,
        landmarks: &LandmarkSet,
    ) -> Result<(FaceAnalysis, EncodedImages)> {
        let analysis = self.analyze(image, landmarks);
        let encoded = analysis.encode(self.config.jpeg_quality)?;
        Ok((analysis, encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Point;
    use crate::shape::FaceShape;

    #[test]
    fn analyzer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Analyzer>();
    }

    #[test]
    fn unsupported_layout_degrades() {
        let analyzer = Analyzer::default();
        let image = RgbImage::new(120, 90);
        let landmarks: LandmarkSet = (0..68).map(|i| Point::new(i as f32, 40.0)).collect();

        let analysis = analyzer.analyze(&image, &landmarks);
        assert_eq!(analysis.symmetry.index, 0.0);
        assert!(analysis.five_points.is_none());
        assert_eq!(analysis.shape.shape, FaceShape::Undetermined);
        assert_eq!(analysis.symmetry_image.dimensions(), (120, 90));
        assert_eq!(analysis.shape_image.dimensions(), (120, 90));
    }

    #[test]
    fn far_off_landmark_still_renders() {
        let analyzer = Analyzer::default();
        let mut landmarks: LandmarkSet = (0..98).map(|_| Point::new(50.0, 50.0)).collect();
        landmarks.points[analyzer.config().layout.measurement.left_cheek] = Point::new(3.0e9, 50.0);

        let analysis = analyzer.analyze(&RgbImage::new(100, 100), &landmarks);
        assert!(analysis.five_points.is_some());
        assert_eq!(analysis.symmetry_image.dimensions(), (100, 100));
        assert_eq!(analysis.shape_image.dimensions(), (100, 100));
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"jpeg_quality": 75}"#).unwrap();
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.layout, LandmarkLayout::wflw98());
        assert_eq!(config.symmetry, SymmetryThresholds::default());
    }
}
