use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported landmark layout: {count} points")]
    UnsupportedLayout { count: usize },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    #[error("insufficient landmark data: got {count} points, need {required}")]
    InsufficientData { count: usize, required: usize },

    #[error("could not encode annotated image: {0}")]
    Encode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use image::error::{ParameterError, ParameterErrorKind};

    #[test]
    fn messages_carry_context() {
        assert_eq!(
            Error::UnsupportedLayout { count: 68 }.to_string(),
            "unsupported landmark layout: 68 points"
        );
        assert_eq!(
            Error::InsufficientData { count: 0, required: 98 }.to_string(),
            "insufficient landmark data: got 0 points, need 98"
        );

        let encode = Error::from(image::ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )));
        assert!(matches!(encode, Error::Encode(_)));
        assert!(encode.to_string().starts_with("could not encode annotated image"));
    }
}
