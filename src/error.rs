use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure modes of backend-facing operations.
///
/// `Backend` is the envelope-level failure: the server answered 200 but the
/// body carried a non-zero `code`. Everything transport-shaped lands in
/// `Http`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend error (code {code}): {msg}")]
    Backend { code: i64, msg: String },

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("a synthesis request is already in flight")]
    SynthesisInFlight,

    #[error("entry has not been saved to the backend yet")]
    UnsavedEntry,
}
