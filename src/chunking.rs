use crate::{
    consts::{CHUNK_BASE, CHUNK_MAX, CHUNK_MIN, CHUNK_UNLIMITED_GUESS},
    error::ArrayError,
    shape::Shape,
};

/// Guess a chunk shape for an array of extent `dims` with `element_size`-byte elements.
///
/// The target chunk size grows with the dataset size (`CHUNK_BASE * 2^log10(MiB)`), clamped to
/// `[CHUNK_MIN, CHUNK_MAX]`. Dimensions are halved round-robin until the chunk is below the
/// target, or within 50% of it, and below `CHUNK_MAX`. Zero (unlimited) extents are guessed as
/// `CHUNK_UNLIMITED_GUESS`.
pub fn guess_chunking(dims: &Shape, element_size: usize) -> Result<Shape, ArrayError> {
    if dims.is_empty() {
        return Err(ArrayError::InvalidRank {
            reason: "chunking needs at least one dimension",
            shape: dims.clone(),
        });
    }

    let mut chunks: Vec<f64> = dims
        .iter()
        .map(|&d| if d == 0 { CHUNK_UNLIMITED_GUESS } else { d })
        .map(|d| d as f64)
        .collect();
    let element_size = element_size as f64;

    let dset_size = chunks.iter().product::<f64>() * element_size;
    let target = (CHUNK_BASE * 2f64.powf((dset_size / (1024.0 * 1024.0)).log10()))
        .clamp(CHUNK_MIN, CHUNK_MAX);

    let mut idx = 0;
    loop {
        let elements = chunks.iter().product::<f64>();
        let chunk_bytes = elements * element_size;
        if (chunk_bytes < target || (chunk_bytes - target).abs() / target < 0.5)
            && chunk_bytes < CHUNK_MAX
        {
            break;
        }
        if elements <= 1.0 {
            break;
        }
        let d = idx % chunks.len();
        chunks[d] = (chunks[d] / 2.0).ceil();
        idx += 1;
    }

    Ok(chunks.into_iter().map(|c| c as usize).collect())
}
