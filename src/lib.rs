pub mod config;
pub mod input;
pub mod report;

// Re-export engine types for convenience
pub use faceform_geometry::{
    shape, symmetry, AnalysisConfig, Analyzer, FaceAnalysis, FaceShape, LandmarkSet,
};
