//! Encoding of the `data.bin` object.
//!
//! Fixed-width elements are stored little-endian, row-major, with no header. Strings are stored
//! as a table of `u32` little-endian byte lengths (one per element) followed by the
//! concatenated UTF-8 payload:
//!
//! ```text
//! [len_0: u32][len_1: u32] ... [len_n-1: u32][bytes_0][bytes_1] ... [bytes_n-1]
//! ```
use bytes::Bytes;

use crate::{dataset::storage::Storage, dtype::DataType, store::error::StoreError};

const LEN_PREFIX: usize = std::mem::size_of::<u32>();

/// Swap between native and little-endian element order in place.
fn swap_le(width: usize, bytes: &mut [u8]) {
    if cfg!(target_endian = "big") && width > 1 {
        bytes.chunks_exact_mut(width).for_each(|chunk| chunk.reverse());
    }
}

pub(crate) fn encode(storage: &Storage) -> Result<Bytes, StoreError> {
    match storage {
        Storage::Fixed { data_type, bytes } => {
            let mut out = bytes.clone();
            swap_le(data_type.width(), &mut out);
            Ok(Bytes::from(out))
        }
        Storage::Strings(strings) => {
            let payload_len = strings
                .iter()
                .try_fold(0usize, |acc, s| acc.checked_add(s.len()))
                .ok_or(StoreError::LengthsOverflow)?;
            let mut out = Vec::with_capacity(strings.len() * LEN_PREFIX + payload_len);
            for s in strings {
                let len =
                    u32::try_from(s.len()).map_err(|_| StoreError::StringLenTooLarge { len: s.len() })?;
                out.extend_from_slice(&len.to_le_bytes());
            }
            for s in strings {
                out.extend_from_slice(s.as_bytes());
            }
            Ok(Bytes::from(out))
        }
    }
}

/// Decode `len` elements of `data_type`.
pub(crate) fn decode(data_type: DataType, len: usize, bytes: &[u8]) -> Result<Storage, StoreError> {
    if !data_type.is_variable_sized() {
        let expected = len
            .checked_mul(data_type.width())
            .ok_or(StoreError::LengthsOverflow)?;
        if bytes.len() != expected {
            return Err(StoreError::WrongByteLen {
                expected,
                actual: bytes.len(),
            });
        }
        let mut native = bytes.to_vec();
        swap_le(data_type.width(), &mut native);
        return Ok(Storage::Fixed {
            data_type,
            bytes: native,
        });
    }

    let lengths_bytes = len
        .checked_mul(LEN_PREFIX)
        .ok_or(StoreError::LengthsOverflow)?;
    if bytes.len() < lengths_bytes {
        return Err(StoreError::WrongPrefixLen {
            expected: lengths_bytes,
            actual: bytes.len(),
        });
    }

    let (lengths, payload) = bytes.split_at(lengths_bytes);
    let mut strings = Vec::with_capacity(len);
    let mut offset = 0usize;
    for chunk in lengths.chunks_exact(LEN_PREFIX) {
        let mut prefix = [0u8; LEN_PREFIX];
        prefix.copy_from_slice(chunk);
        let end = offset
            .checked_add(u32::from_le_bytes(prefix) as usize)
            .ok_or(StoreError::LengthsOverflow)?;
        let span = payload
            .get(offset..end)
            .ok_or(StoreError::PayloadOutOfBounds)?;
        let s = std::str::from_utf8(span).map_err(|_| StoreError::InvalidUtf8)?;
        strings.push(s.to_string());
        offset = end;
    }

    if offset != payload.len() {
        return Err(StoreError::WrongByteLen {
            expected: lengths_bytes + offset,
            actual: bytes.len(),
        });
    }
    Ok(Storage::Strings(strings))
}
