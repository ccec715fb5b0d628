use base64::{engine::general_purpose::STANDARD, Engine};
use faceform_geometry::pipeline::EncodedImages;
use faceform_geometry::shape::FaceMeasurements;
use faceform_geometry::{FaceAnalysis, FivePointSet, MeasurementPoints, SymmetryBucket};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryData {
    pub index: f32,
    pub bucket: SymmetryBucket,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceShapeData {
    pub name: String,
    pub description: String,
    pub measurements: Option<FaceMeasurements>,
    pub measurement_points: MeasurementPoints,
}

/// Serializable summary of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub landmark_count: usize,
    pub five_points: Option<FivePointSet>,
    pub symmetry_data: SymmetryData,
    pub face_shape: FaceShapeData,
    /// Base64 JPEG, present when images are embedded.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub symmetry_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub face_shape_image: Option<String>,
}

impl AnalysisReport {
    pub fn new(landmark_count: usize, analysis: &FaceAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            landmark_count,
            five_points: analysis.five_points,
            symmetry_data: SymmetryData {
                index: analysis.symmetry.index,
                bucket: analysis.symmetry.bucket,
                description: analysis.symmetry.description().to_string(),
            },
            face_shape: FaceShapeData {
                name: analysis.shape.shape_name().to_string(),
                description: analysis.shape.description.clone(),
                measurements: analysis.shape.measurements,
                measurement_points: analysis.shape.measurement_points.clone(),
            },
            symmetry_image: None,
            face_shape_image: None,
        }
    }

    pub fn with_images(mut self, images: &EncodedImages) -> Self {
        self.symmetry_image = Some(STANDARD.encode(&images.symmetry));
        self.face_shape_image = Some(STANDARD.encode(&images.shape));
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
