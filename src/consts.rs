/// Objects of a stored array directory:
///     array_dir/array.json
///     array_dir/data.bin
///
pub const ARRAY_METADATA_OBJECT: &str = "array.json";
pub const ARRAY_DATA_OBJECT: &str = "data.bin";

/// Bounds used when guessing a chunk shape (bytes).
pub const CHUNK_BASE: f64 = 16.0 * 1024.0;
pub const CHUNK_MIN: f64 = 8.0 * 1024.0;
pub const CHUNK_MAX: f64 = 1024.0 * 1024.0;

/// Extent substituted for unlimited (zero) dimensions when guessing chunks.
pub const CHUNK_UNLIMITED_GUESS: usize = 1024;
