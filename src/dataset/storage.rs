//! Row-major element storage shared by the in-memory and object store backends.
use std::borrow::Cow;

use crate::{
    dataset::{hyperslab::for_each_run, specified},
    dtype::DataType,
    element::{Elements, ElementsMut, convert_packed},
    error::ArrayError,
    selection::{Mode, Selection},
    shape::Shape,
};

/// A resolved transfer window inside an extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Window {
    pub count: Shape,
    pub offset: Shape,
}

impl Window {
    /// Resolve the optional `count` / `offset` of a transfer against `extent`.
    ///
    /// Without an offset the window is the whole extent and `count` only has to agree in
    /// element count. With an offset and no count the window is one element per dimension.
    pub fn resolve(
        extent: &Shape,
        count: Option<&Shape>,
        offset: Option<&Shape>,
    ) -> Result<Self, ArrayError> {
        let Some(offset) = specified(offset) else {
            let expected = extent.checked_nelms()?;
            if let Some(count) = specified(count) {
                let actual = count.checked_nelms()?;
                if actual != expected {
                    return Err(ArrayError::WrongElementCount { expected, actual });
                }
            }
            return Ok(Self {
                count: extent.clone(),
                offset: Shape::zeros(extent.rank()),
            });
        };

        let count = specified(count)
            .cloned()
            .unwrap_or_else(|| Shape::ones(offset.rank()));
        let mut selection = Selection::new(extent.clone());
        selection.select(&count, offset, Mode::Set)?;
        if !selection.is_valid() {
            return Err(ArrayError::OutOfBounds {
                index: offset.checked_add(&count)?,
                extent: extent.clone(),
            });
        }
        Ok(Self {
            count,
            offset: offset.clone(),
        })
    }

    pub fn nelms(&self) -> usize {
        self.count.nelms()
    }
}

/// Check the tag of a transfer against its buffer and the stored type.
///
/// Numeric kinds convert into one another; every other kind must match the stored type.
pub(crate) fn check_types(
    stored: DataType,
    requested: DataType,
    buffer: DataType,
) -> Result<(), ArrayError> {
    if requested != buffer {
        return Err(ArrayError::DataTypeMismatch {
            expected: requested,
            actual: buffer,
        });
    }
    if stored != requested && !(stored.is_numeric() && requested.is_numeric()) {
        return Err(ArrayError::DataTypeMismatch {
            expected: stored,
            actual: requested,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Storage {
    /// Native-endian bytes of a fixed-width type.
    Fixed { data_type: DataType, bytes: Vec<u8> },
    Strings(Vec<String>),
}

impl Storage {
    /// Default-initialised storage for `len` elements.
    pub fn new(data_type: DataType, len: usize) -> Result<Self, ArrayError> {
        if data_type.is_variable_sized() {
            return Ok(Storage::Strings(vec![String::new(); len]));
        }
        let bytes = len
            .checked_mul(data_type.width())
            .ok_or(ArrayError::ShapeOverflow)?;
        Ok(Storage::Fixed {
            data_type,
            bytes: vec![0; bytes],
        })
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Storage::Fixed { data_type, .. } => *data_type,
            Storage::Strings(_) => DataType::String,
        }
    }

    /// Copy `window` of this `extent`-shaped storage into `buffer`, converting numeric kinds.
    pub fn read_window(
        &self,
        extent: &Shape,
        window: &Window,
        mut buffer: ElementsMut<'_>,
    ) -> Result<(), ArrayError> {
        let expected = window.nelms();
        if buffer.len() != expected {
            return Err(ArrayError::WrongElementCount {
                expected,
                actual: buffer.len(),
            });
        }
        let origin = Shape::zeros(window.count.rank());

        match self {
            Storage::Fixed { data_type, bytes } => {
                let width = data_type.width();
                let mut gathered = vec![0u8; expected * width];
                for_each_run(
                    extent,
                    &window.offset,
                    &window.count,
                    &origin,
                    &window.count,
                    |src, dst, len| {
                        gathered[dst * width..(dst + len) * width]
                            .copy_from_slice(&bytes[src * width..(src + len) * width]);
                    },
                );
                let requested = buffer.data_type();
                if requested != *data_type {
                    gathered = convert_packed(*data_type, &gathered, requested)?;
                }
                buffer.unpack_from(&gathered)
            }
            Storage::Strings(strings) => {
                let actual = buffer.data_type();
                let out = buffer
                    .as_strings_mut()
                    .ok_or(ArrayError::DataTypeMismatch {
                        expected: DataType::String,
                        actual,
                    })?;
                for_each_run(
                    extent,
                    &window.offset,
                    &window.count,
                    &origin,
                    &window.count,
                    |src, dst, len| {
                        out[dst..dst + len].clone_from_slice(&strings[src..src + len]);
                    },
                );
                Ok(())
            }
        }
    }

    /// Copy `buffer` into `window` of this `extent`-shaped storage, converting numeric kinds.
    pub fn write_window(
        &mut self,
        extent: &Shape,
        window: &Window,
        buffer: Elements<'_>,
    ) -> Result<(), ArrayError> {
        let expected = window.nelms();
        if buffer.len() != expected {
            return Err(ArrayError::WrongElementCount {
                expected,
                actual: buffer.len(),
            });
        }
        let origin = Shape::zeros(window.count.rank());

        match self {
            Storage::Fixed { data_type, bytes } => {
                let width = data_type.width();
                let mut packed = buffer.to_packed()?;
                if buffer.data_type() != *data_type {
                    packed = Cow::Owned(convert_packed(buffer.data_type(), &packed, *data_type)?);
                }
                for_each_run(
                    &window.count,
                    &origin,
                    extent,
                    &window.offset,
                    &window.count,
                    |src, dst, len| {
                        bytes[dst * width..(dst + len) * width]
                            .copy_from_slice(&packed[src * width..(src + len) * width]);
                    },
                );
                Ok(())
            }
            Storage::Strings(strings) => {
                let input = buffer.as_strings().ok_or(ArrayError::DataTypeMismatch {
                    expected: DataType::String,
                    actual: buffer.data_type(),
                })?;
                for_each_run(
                    &window.count,
                    &origin,
                    extent,
                    &window.offset,
                    &window.count,
                    |src, dst, len| {
                        strings[dst..dst + len].clone_from_slice(&input[src..src + len]);
                    },
                );
                Ok(())
            }
        }
    }

    /// Storage for `new_extent`, keeping the overlap with `old_extent` when the rank is unchanged.
    pub fn resized(&self, old_extent: &Shape, new_extent: &Shape) -> Result<Self, ArrayError> {
        let mut resized = Storage::new(self.data_type(), new_extent.checked_nelms()?)?;
        if old_extent.rank() != new_extent.rank() {
            return Ok(resized);
        }

        let overlap: Shape = old_extent
            .iter()
            .zip(new_extent.iter())
            .map(|(&a, &b)| a.min(b))
            .collect();
        let origin = Shape::zeros(overlap.rank());
        match (self, &mut resized) {
            (Storage::Fixed { data_type, bytes: old }, Storage::Fixed { bytes: new, .. }) => {
                let width = data_type.width();
                for_each_run(
                    old_extent,
                    &origin,
                    new_extent,
                    &origin,
                    &overlap,
                    |src, dst, len| {
                        new[dst * width..(dst + len) * width]
                            .copy_from_slice(&old[src * width..(src + len) * width]);
                    },
                );
            }
            (Storage::Strings(old), Storage::Strings(new)) => {
                for_each_run(
                    old_extent,
                    &origin,
                    new_extent,
                    &origin,
                    &overlap,
                    |src, dst, len| {
                        new[dst..dst + len].clone_from_slice(&old[src..src + len]);
                    },
                );
            }
            _ => {}
        }
        Ok(resized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    #[test]
    fn window_without_offset_is_whole_extent() {
        let extent = Shape::from([4, 3]);
        let window = Window::resolve(&extent, Some(&Shape::from([12])), None).unwrap();
        assert_eq!(window.count, extent);
        assert_eq!(window.offset, Shape::zeros(2));

        assert!(matches!(
            Window::resolve(&extent, Some(&Shape::from([11])), None),
            Err(ArrayError::WrongElementCount {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn window_with_offset_only_is_one_element() {
        let extent = Shape::from([4, 3]);
        let window = Window::resolve(&extent, None, Some(&Shape::from([3, 2]))).unwrap();
        assert_eq!(window.count, Shape::from([1, 1]));

        let err = Window::resolve(&extent, None, Some(&Shape::from([4, 0]))).unwrap_err();
        assert!(matches!(err, ArrayError::OutOfBounds { .. }));
        let err = Window::resolve(&extent, Some(&Shape::from([1])), Some(&Shape::from([0, 0])))
            .unwrap_err();
        assert!(matches!(err, ArrayError::ShapeMismatch { .. }));
    }

    #[test]
    fn strings_window_roundtrip() {
        let extent = Shape::from([2, 3]);
        let mut storage = Storage::new(DataType::String, 6).unwrap();
        let window = Window::resolve(&extent, Some(&Shape::from([2, 1])), Some(&Shape::from([0, 2])))
            .unwrap();
        let input = vec!["a".to_string(), "b".to_string()];
        storage
            .write_window(&extent, &window, String::elements(&input))
            .unwrap();
        assert_eq!(
            storage,
            Storage::Strings(
                ["", "", "a", "", "", "b"].into_iter().map(String::from).collect()
            )
        );

        let mut out = vec![String::new(); 2];
        storage
            .read_window(&extent, &window, String::elements_mut(&mut out))
            .unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn resize_keeps_overlap_for_same_rank() {
        let old_extent = Shape::from([2, 2]);
        let mut storage = Storage::new(DataType::I32, 4).unwrap();
        let whole = Window::resolve(&old_extent, None, None).unwrap();
        storage
            .write_window(&old_extent, &whole, i32::elements(&[1, 2, 3, 4]))
            .unwrap();

        let new_extent = Shape::from([3, 1]);
        let resized = storage.resized(&old_extent, &new_extent).unwrap();
        let mut out = [0i32; 3];
        resized
            .read_window(
                &new_extent,
                &Window::resolve(&new_extent, None, None).unwrap(),
                i32::elements_mut(&mut out),
            )
            .unwrap();
        assert_eq!(out, [1, 3, 0]);

        let reranked = storage.resized(&old_extent, &Shape::from([4])).unwrap();
        assert_eq!(reranked, Storage::new(DataType::I32, 4).unwrap());
    }

    #[test]
    fn stored_type_must_match_unless_numeric() {
        assert!(check_types(DataType::F64, DataType::F64, DataType::F64).is_ok());
        assert!(check_types(DataType::F64, DataType::I32, DataType::I32).is_ok());
        assert!(matches!(
            check_types(DataType::F64, DataType::String, DataType::String),
            Err(ArrayError::DataTypeMismatch {
                expected: DataType::F64,
                actual: DataType::String
            })
        ));
        assert!(check_types(DataType::Bool, DataType::U8, DataType::U8).is_err());
        assert!(check_types(DataType::Nothing, DataType::I8, DataType::I8).is_err());
        assert!(check_types(DataType::F64, DataType::F64, DataType::I64).is_err());
    }

    #[test]
    fn numeric_windows_convert_both_ways() {
        let extent = Shape::from([3]);
        let whole = Window::resolve(&extent, None, None).unwrap();
        let mut storage = Storage::new(DataType::F64, 3).unwrap();
        storage
            .write_window(&extent, &whole, i32::elements(&[1, -2, 3]))
            .unwrap();

        let mut doubles = [0f64; 3];
        storage
            .read_window(&extent, &whole, f64::elements_mut(&mut doubles))
            .unwrap();
        assert_eq!(doubles, [1.0, -2.0, 3.0]);

        let mut bytes = [0u8; 3];
        storage
            .read_window(&extent, &whole, u8::elements_mut(&mut bytes))
            .unwrap();
        assert_eq!(bytes, [1, 0, 3]);
    }
}
