use thiserror::Error;

/// Reasons an image could not be turned into features.
///
/// Callers of [`crate::extract`] never see these; they are logged and
/// replaced by a fallback result.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("image has no pixels")]
    EmptyImage,
}
