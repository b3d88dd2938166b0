use thiserror::Error;

/// Errors of the object store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    ObjectStore(#[from] object_store::Error),

    #[error(transparent)]
    Json(#[from] simd_json::Error),

    /// The backend could not start its I/O runtime.
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("unsupported array format version {version}")]
    UnsupportedVersion { version: u32 },

    /// The blob length doesn't match the stored extent.
    #[error("wrong byte length: expected {expected}, got {actual}")]
    WrongByteLen { expected: usize, actual: usize },

    /// For strings: the length prefix table is missing or short.
    #[error("missing/short header: expected {expected} bytes, got {actual}")]
    WrongPrefixLen { expected: usize, actual: usize },

    /// UTF-8 validation failed.
    #[error("invalid UTF-8")]
    InvalidUtf8,

    /// Summing lengths overflowed `usize`.
    #[error("string length sum overflow")]
    LengthsOverflow,

    /// A single string length exceeded what can be encoded.
    #[error("string too large to encode (len={len})")]
    StringLenTooLarge { len: usize },

    /// A declared string length exceeded the available payload bytes.
    #[error("string payload out of bounds")]
    PayloadOutOfBounds,
}
