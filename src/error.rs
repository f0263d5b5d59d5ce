use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The blob handed to `decode` is truncated, malformed, or was rejected
    /// by the underlying decompressor / image decoder.
    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    /// The array cannot be represented by an image codec (rank, channel
    /// count, element type, or an empty image).
    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("Unknown codec id: {0}")]
    UnknownCodecId(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid array: {0}")]
    InvalidArray(String),

    #[error("Encode error: {0}")]
    Encode(String),
}
