//! Host containers the engine can read into and write from.
//!
//! [`HostAdapter`] is implemented once per supported container: every scalar [`Element`],
//! `Vec<T>`, `[T; N]`, `ndarray::Array<T, D>` and [`DenseBuffer`]. The generic algorithms in
//! [`crate::DataSetExt`] only talk to this trait.
use ndarray::{Array, ArrayD, Dimension, IxDyn};

use crate::{
    dense::DenseBuffer,
    dtype::DataType,
    element::{Char, Element, Elements, ElementsMut},
    error::ArrayError,
    shape::Shape,
};

pub trait HostAdapter {
    /// Element kind of the value.
    fn element_type(&self) -> DataType;

    /// Current shape; empty for scalars.
    fn shape(&self) -> Shape;

    /// Number of elements held.
    fn count(&self) -> usize {
        self.shape().nelms()
    }

    /// Contiguous element storage, row-major.
    fn data(&self) -> Result<Elements<'_>, ArrayError>;

    fn data_mut(&mut self) -> Result<ElementsMut<'_>, ArrayError>;

    /// Reshape the value to hold `shape`. Existing contents need not survive.
    ///
    /// # Errors
    /// [`ArrayError::InvalidRank`] if the container cannot represent `shape`.
    fn resize(&mut self, shape: &Shape) -> Result<(), ArrayError>;
}

macro_rules! impl_scalar_adapter {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HostAdapter for $ty {
                fn element_type(&self) -> DataType {
                    <$ty as Element>::TYPE
                }

                fn shape(&self) -> Shape {
                    Shape::new()
                }

                fn count(&self) -> usize {
                    1
                }

                fn data(&self) -> Result<Elements<'_>, ArrayError> {
                    Ok(<$ty as Element>::elements(std::slice::from_ref(self)))
                }

                fn data_mut(&mut self) -> Result<ElementsMut<'_>, ArrayError> {
                    Ok(<$ty as Element>::elements_mut(std::slice::from_mut(self)))
                }

                fn resize(&mut self, shape: &Shape) -> Result<(), ArrayError> {
                    if shape.is_empty() || shape.checked_nelms()? == 1 {
                        Ok(())
                    } else {
                        Err(ArrayError::InvalidRank {
                            reason: "a scalar holds exactly one element",
                            shape: shape.clone(),
                        })
                    }
                }
            }
        )*
    };
}

impl_scalar_adapter!(bool, Char, f32, f64, i8, i16, i32, i64, u8, u16, u32, u64, String);

impl<T: Element> HostAdapter for Vec<T> {
    fn element_type(&self) -> DataType {
        T::TYPE
    }

    fn shape(&self) -> Shape {
        Shape::from([self.len()])
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn data(&self) -> Result<Elements<'_>, ArrayError> {
        Ok(T::elements(self))
    }

    fn data_mut(&mut self) -> Result<ElementsMut<'_>, ArrayError> {
        Ok(T::elements_mut(self))
    }

    /// Any shape with at most one dimension larger than one; `{}` means one element.
    fn resize(&mut self, shape: &Shape) -> Result<(), ArrayError> {
        if shape.iter().filter(|&&d| d > 1).count() > 1 {
            return Err(ArrayError::InvalidRank {
                reason: "a vector has at most one non-singleton dimension",
                shape: shape.clone(),
            });
        }
        let len = shape.checked_nelms()?;
        self.clear();
        self.resize(len, T::default());
        Ok(())
    }
}

impl<T: Element, const N: usize> HostAdapter for [T; N] {
    fn element_type(&self) -> DataType {
        T::TYPE
    }

    fn shape(&self) -> Shape {
        Shape::from([N])
    }

    fn count(&self) -> usize {
        N
    }

    fn data(&self) -> Result<Elements<'_>, ArrayError> {
        Ok(T::elements(self))
    }

    fn data_mut(&mut self) -> Result<ElementsMut<'_>, ArrayError> {
        Ok(T::elements_mut(self))
    }

    fn resize(&mut self, shape: &Shape) -> Result<(), ArrayError> {
        if shape.as_slice() != [N] {
            return Err(ArrayError::InvalidRank {
                reason: "a fixed-size array only holds its own length",
                shape: shape.clone(),
            });
        }
        Ok(())
    }
}

/// Fixed-rank arrays (`Ix1`..`Ix6`) keep their rank, `IxDyn` accepts any shape.
impl<T: Element, D: Dimension> HostAdapter for Array<T, D> {
    fn element_type(&self) -> DataType {
        T::TYPE
    }

    fn shape(&self) -> Shape {
        Shape::from(self.shape())
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn data(&self) -> Result<Elements<'_>, ArrayError> {
        self.as_slice()
            .map(T::elements)
            .ok_or(ArrayError::NonContiguousNdarray)
    }

    fn data_mut(&mut self) -> Result<ElementsMut<'_>, ArrayError> {
        self.as_slice_mut()
            .map(T::elements_mut)
            .ok_or(ArrayError::NonContiguousNdarray)
    }

    fn resize(&mut self, shape: &Shape) -> Result<(), ArrayError> {
        let invalid_rank = || ArrayError::InvalidRank {
            reason: "the array has a fixed rank",
            shape: shape.clone(),
        };
        if D::NDIM.is_some_and(|ndim| ndim != shape.rank()) {
            return Err(invalid_rank());
        }
        shape.checked_nelms()?;
        *self = ArrayD::<T>::default(IxDyn(shape.as_slice()))
            .into_dimensionality::<D>()
            .map_err(|_| invalid_rank())?;
        Ok(())
    }
}

impl HostAdapter for DenseBuffer {
    fn element_type(&self) -> DataType {
        self.data_type()
    }

    fn shape(&self) -> Shape {
        DenseBuffer::shape(self).clone()
    }

    fn count(&self) -> usize {
        self.num_elements()
    }

    fn data(&self) -> Result<Elements<'_>, ArrayError> {
        Ok(Elements::Packed {
            data_type: self.data_type(),
            len: self.num_elements(),
            bytes: self.as_bytes(),
        })
    }

    fn data_mut(&mut self) -> Result<ElementsMut<'_>, ArrayError> {
        Ok(ElementsMut::Packed {
            data_type: self.data_type(),
            len: self.num_elements(),
            bytes: self.as_bytes_mut(),
        })
    }

    fn resize(&mut self, shape: &Shape) -> Result<(), ArrayError> {
        DenseBuffer::resize(self, shape)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, Array3, ShapeBuilder};

    use super::*;

    #[test]
    fn scalars_have_empty_shape() {
        let mut value = 7i32;
        assert_eq!(value.element_type(), DataType::I32);
        assert!(HostAdapter::shape(&value).is_empty());
        assert_eq!(value.count(), 1);
        assert!(HostAdapter::resize(&mut value, &Shape::new()).is_ok());
        assert!(HostAdapter::resize(&mut value, &Shape::from([1, 1])).is_ok());
        assert!(matches!(
            HostAdapter::resize(&mut value, &Shape::from([2])),
            Err(ArrayError::InvalidRank { .. })
        ));

        let text = "abc".to_string();
        assert_eq!(text.element_type(), DataType::String);
        assert_eq!(text.data().unwrap().as_strings().unwrap(), ["abc"]);
    }

    #[test]
    fn vec_resizes_along_one_dimension() {
        let mut values: Vec<u8> = vec![9; 2];
        HostAdapter::resize(&mut values, &Shape::from([1, 4, 1])).unwrap();
        assert_eq!(values, vec![0; 4]);
        HostAdapter::resize(&mut values, &Shape::new()).unwrap();
        assert_eq!(values.len(), 1);
        assert!(matches!(
            HostAdapter::resize(&mut values, &Shape::from([2, 2])),
            Err(ArrayError::InvalidRank { .. })
        ));
    }

    #[test]
    fn fixed_array_only_accepts_its_length() {
        let mut values = [1.0f32; 3];
        assert_eq!(HostAdapter::shape(&values), Shape::from([3]));
        assert!(HostAdapter::resize(&mut values, &Shape::from([3])).is_ok());
        assert!(HostAdapter::resize(&mut values, &Shape::from([4])).is_err());
        assert!(HostAdapter::resize(&mut values, &Shape::from([3, 1])).is_err());
    }

    #[test]
    fn fixed_rank_ndarray_rejects_other_ranks() {
        let mut grid = Array2::<f64>::zeros((2, 2));
        HostAdapter::resize(&mut grid, &Shape::from([3, 5])).unwrap();
        assert_eq!(grid.dim(), (3, 5));
        let err = HostAdapter::resize(&mut grid, &Shape::from([3, 5, 1])).unwrap_err();
        assert!(matches!(err, ArrayError::InvalidRank { .. }));
        assert_eq!(grid.dim(), (3, 5));
    }

    #[test]
    fn dynamic_ndarray_accepts_any_rank() {
        let mut value = ArrayD::<i64>::zeros(IxDyn(&[2]));
        HostAdapter::resize(&mut value, &Shape::from([2, 3, 4])).unwrap();
        assert_eq!(HostAdapter::shape(&value), Shape::from([2, 3, 4]));
        assert_eq!(value.data().unwrap().len(), 24);
    }

    #[test]
    fn column_major_ndarray_is_rejected() {
        let value = Array3::<f64>::zeros((2, 3, 4).f());
        assert!(matches!(
            value.data(),
            Err(ArrayError::NonContiguousNdarray)
        ));
    }

    #[test]
    fn dense_buffer_exposes_packed_bytes() {
        let mut buffer = DenseBuffer::new(DataType::U32, Shape::from([2, 2])).unwrap();
        assert_eq!(buffer.count(), 4);
        match buffer.data().unwrap() {
            Elements::Packed {
                data_type,
                len,
                bytes,
            } => {
                assert_eq!(data_type, DataType::U32);
                assert_eq!(len, 4);
                assert_eq!(bytes.len(), 16);
            }
            other => panic!("unexpected elements: {:?}", other),
        }
        HostAdapter::resize(&mut buffer, &Shape::from([3])).unwrap();
        assert_eq!(buffer.count(), 3);
    }
}
