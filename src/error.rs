use thiserror::Error;

/// Errors surfaced by map persistence and the remote exchange.
///
/// Drawing operations themselves never fail: invalid user input (deleting
/// without a selection, out-of-bounds pointer samples) degrades to a logged
/// no-op instead. A failed remote call leaves local state untouched.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("transport error: {0}")]
    Http(#[from] ureq::Error),

    #[error("server reported failure: {0}")]
    Api(String),

    #[error("failed to encode or decode map image: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("not a PNG data URI")]
    DataUri,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for persistence operations.
pub type MapResult<T> = Result<T, MapError>;
