pub mod error;
pub mod landmarks;
pub mod overlay;
pub mod pipeline;
pub mod shape;
pub mod symmetry;

// Re-export commonly used types
pub use error::{Error, Result};
pub use landmarks::{reduce_to_five, FivePointSet, LandmarkLayout, LandmarkSet, Point};
pub use overlay::{encode_jpeg, render_overlay, render_overlay_in_place, Overlay, RenderStyle};
pub use pipeline::{AnalysisConfig, Analyzer, FaceAnalysis};
pub use shape::{classify_shape, FaceShape, MeasurementPair, MeasurementPoints, ShapeResult, Span};
pub use symmetry::{score_symmetry, SymmetryBucket, SymmetryResult};
