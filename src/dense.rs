//! A contiguous, row-major, type-tagged element buffer.
//!
//! [`DenseBuffer`] stores every fixed-width [`DataType`] in one byte vector and carries the tag
//! next to it. Element access copies `T::WIDTH` bytes at `index * T::WIDTH`; the caller picks
//! `T` and is responsible for it matching [`DenseBuffer::data_type`]. Type agreement is only
//! enforced when the buffer is handed to a [`crate::DataSet`].
use std::ops::Range;

use crate::{dtype::DataType, element::FixedWidth, error::ArrayError, shape::Shape};

#[derive(Debug, Clone, PartialEq)]
pub struct DenseBuffer {
    data_type: DataType,
    shape: Shape,
    strides: Shape,
    data: Vec<u8>,
}

fn byte_len(data_type: DataType, shape: &Shape) -> Result<usize, ArrayError> {
    shape
        .checked_nelms()?
        .checked_mul(data_type.width())
        .ok_or(ArrayError::ShapeOverflow)
}

impl DenseBuffer {
    /// A zero-filled buffer of `shape`.
    ///
    /// # Errors
    /// - [`ArrayError::UnsupportedVariableWidth`] for [`DataType::String`]
    /// - [`ArrayError::ShapeOverflow`] if the byte size overflows `usize`
    pub fn new(data_type: DataType, shape: Shape) -> Result<Self, ArrayError> {
        if data_type.is_variable_sized() {
            return Err(ArrayError::UnsupportedVariableWidth);
        }
        let len = byte_len(data_type, &shape)?;
        Ok(Self {
            data_type,
            strides: shape.strides(),
            shape,
            data: vec![0; len],
        })
    }

    /// A buffer of `shape` holding `values` in row-major order.
    pub fn from_elements<T: FixedWidth>(shape: Shape, values: &[T]) -> Result<Self, ArrayError> {
        let mut buffer = Self::new(T::TYPE, shape)?;
        let expected = buffer.num_elements();
        if values.len() != expected {
            return Err(ArrayError::WrongElementCount {
                expected,
                actual: values.len(),
            });
        }
        for (value, chunk) in values.iter().zip(buffer.data.chunks_exact_mut(T::WIDTH)) {
            value.write_ne(chunk);
        }
        Ok(buffer)
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Row-major strides, in elements.
    pub fn strides(&self) -> &Shape {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn num_elements(&self) -> usize {
        self.shape.nelms()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Linear element index of `subscript`.
    pub fn sub2index(&self, subscript: &Shape) -> Result<usize, ArrayError> {
        self.strides.dot(subscript)
    }

    pub fn get<T: FixedWidth>(&self, index: usize) -> Result<T, ArrayError> {
        let range = self.byte_range::<T>(index)?;
        Ok(T::read_ne(&self.data[range]))
    }

    pub fn set<T: FixedWidth>(&mut self, index: usize, value: T) -> Result<(), ArrayError> {
        let range = self.byte_range::<T>(index)?;
        value.write_ne(&mut self.data[range]);
        Ok(())
    }

    pub fn get_at<T: FixedWidth>(&self, subscript: &Shape) -> Result<T, ArrayError> {
        self.get(self.checked_index(subscript)?)
    }

    pub fn set_at<T: FixedWidth>(&mut self, subscript: &Shape, value: T) -> Result<(), ArrayError> {
        self.set(self.checked_index(subscript)?, value)
    }

    /// Reshape and reallocate. Contents are not preserved.
    pub fn resize(&mut self, shape: &Shape) -> Result<(), ArrayError> {
        let len = byte_len(self.data_type, shape)?;
        self.shape = shape.clone();
        self.strides = shape.strides();
        self.data = vec![0; len];
        Ok(())
    }

    /// [`Self::sub2index`] after checking every component against the shape.
    fn checked_index(&self, subscript: &Shape) -> Result<usize, ArrayError> {
        if !subscript.all_lt(&self.shape)? {
            return Err(ArrayError::OutOfBounds {
                index: subscript.clone(),
                extent: self.shape.clone(),
            });
        }
        self.sub2index(subscript)
    }

    fn byte_range<T: FixedWidth>(&self, index: usize) -> Result<Range<usize>, ArrayError> {
        let out_of_bounds = || ArrayError::IndexOutOfBounds {
            index,
            len: self.data.len() / T::WIDTH,
        };
        let start = index.checked_mul(T::WIDTH).ok_or_else(out_of_bounds)?;
        let end = start.checked_add(T::WIDTH).ok_or_else(out_of_bounds)?;
        if end > self.data.len() {
            return Err(out_of_bounds());
        }
        Ok(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iota(shape: Shape) -> DenseBuffer {
        let values: Vec<f64> = (0..shape.nelms()).map(|v| v as f64).collect();
        DenseBuffer::from_elements(shape, &values).unwrap()
    }

    #[test]
    fn grid_5x5_row_major() {
        let buffer = iota(Shape::from([5, 5]));
        assert_eq!(buffer.get_at::<f64>(&Shape::from([1, 0])).unwrap(), 5.0);
        assert_eq!(buffer.get_at::<f64>(&Shape::from([3, 3])).unwrap(), 18.0);
        assert_eq!(buffer.get_at::<f64>(&Shape::from([4, 4])).unwrap(), 24.0);
    }

    #[test]
    fn cube_3x4x5_innermost_increasing() {
        let buffer = iota(Shape::from([3, 4, 5]));
        assert_eq!(buffer.get_at::<f64>(&Shape::from([1, 0, 3])).unwrap(), 23.0);
        assert_eq!(buffer.get_at::<f64>(&Shape::from([2, 0, 2])).unwrap(), 42.0);
        assert_eq!(buffer.get_at::<f64>(&Shape::from([1, 1, 1])).unwrap(), 26.0);
    }

    #[test]
    fn origin_is_index_zero() {
        for shape in [Shape::from([7]), Shape::from([2, 3]), Shape::from([4, 1, 9])] {
            let buffer = DenseBuffer::new(DataType::I32, shape.clone()).unwrap();
            assert_eq!(buffer.sub2index(&Shape::zeros(shape.rank())).unwrap(), 0);
        }
    }

    #[test]
    fn set_then_get_every_subscript() {
        let shape = Shape::from([2, 3, 2]);
        let mut buffer = DenseBuffer::new(DataType::U16, shape.clone()).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..2 {
                    let sub = Shape::from([i, j, k]);
                    let value = (i * 100 + j * 10 + k) as u16;
                    buffer.set_at(&sub, value).unwrap();
                    assert_eq!(buffer.get_at::<u16>(&sub).unwrap(), value);
                }
            }
        }
        assert_eq!(buffer.get::<u16>(shape.nelms() - 1).unwrap(), 121);
    }

    #[test]
    fn access_past_the_end_fails() {
        let mut buffer = DenseBuffer::new(DataType::F32, Shape::from([2, 2])).unwrap();
        assert!(matches!(
            buffer.get::<f32>(4),
            Err(ArrayError::IndexOutOfBounds { index: 4, len: 4 })
        ));
        assert!(buffer.set(4, 1.0f32).is_err());
        assert!(matches!(
            buffer.get_at::<f32>(&Shape::from([2])),
            Err(ArrayError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn subscript_component_past_its_dimension_fails() {
        let mut buffer = iota(Shape::from([5, 5]));
        let err = buffer.get_at::<f64>(&Shape::from([0, 7])).unwrap_err();
        match err {
            ArrayError::OutOfBounds { index, extent } => {
                assert_eq!(index, Shape::from([0, 7]));
                assert_eq!(extent, Shape::from([5, 5]));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            buffer.set_at(&Shape::from([5, 0]), 1.0f64),
            Err(ArrayError::OutOfBounds { .. })
        ));
        assert_eq!(buffer.get_at::<f64>(&Shape::from([1, 2])).unwrap(), 7.0);
    }

    #[test]
    fn nothing_buffer_counts_its_shape() {
        let buffer = DenseBuffer::new(DataType::Nothing, Shape::from([2, 3])).unwrap();
        assert_eq!(buffer.num_elements(), 6);
        assert!(buffer.as_bytes().is_empty());
    }

    #[test]
    fn strings_are_rejected() {
        assert!(matches!(
            DenseBuffer::new(DataType::String, Shape::from([3])),
            Err(ArrayError::UnsupportedVariableWidth)
        ));
    }

    #[test]
    fn resize_reallocates() {
        let mut buffer = iota(Shape::from([2, 2]));
        buffer.resize(&Shape::from([3, 4, 5])).unwrap();
        assert_eq!(buffer.rank(), 3);
        assert_eq!(buffer.num_elements(), 60);
        assert_eq!(buffer.strides(), &Shape::from([20, 5, 1]));
        assert_eq!(buffer.as_bytes().len(), 60 * 8);
    }

    #[test]
    fn scalar_buffer_holds_one_element() {
        let mut buffer = DenseBuffer::new(DataType::I64, Shape::new()).unwrap();
        assert_eq!(buffer.num_elements(), 1);
        buffer.set_at(&Shape::new(), -3i64).unwrap();
        assert_eq!(buffer.get::<i64>(0).unwrap(), -3);
    }
}
