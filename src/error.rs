use thiserror::Error;

pub type Result<T> = std::result::Result<T, CurveError>;

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl CurveError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CurveError::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
