use crate::{
    dataset::{DataSet, specified},
    dtype::DataType,
    element::{Elements, ElementsMut},
    error::ArrayError,
    shape::Shape,
};

/// A fixed-size window (`count` at `offset`) over another [`DataSet`].
///
/// The view borrows its parent for its whole lifetime. Its extent is always `count` and can't
/// be changed. Transfers are translated into the parent's coordinates:
///
/// - the transfer count defaults to the view's `count`
/// - without an offset, the transfer starts at the view's origin and must fit in `count`
/// - with an offset, `count + offset` must fit in the view and the transfer starts at
///   `view.offset + offset`
#[derive(Debug)]
pub struct DataView<'a, D: DataSet + ?Sized> {
    parent: &'a mut D,
    count: Shape,
    offset: Shape,
}

impl<'a, D: DataSet + ?Sized> DataView<'a, D> {
    /// # Errors
    /// [`ArrayError::OutOfBounds`] unless `offset + count` fits inside the parent's extent.
    pub fn new(parent: &'a mut D, count: Shape, offset: Shape) -> Result<Self, ArrayError> {
        let extent = parent.extent()?;
        let end = offset.checked_add(&count)?;
        if !end.all_le(&extent)? {
            return Err(ArrayError::OutOfBounds { index: end, extent });
        }
        Ok(Self {
            parent,
            count,
            offset,
        })
    }

    pub fn count(&self) -> &Shape {
        &self.count
    }

    pub fn offset(&self) -> &Shape {
        &self.offset
    }

    /// Parent-space `(count, offset)` of a transfer on this view.
    fn translate(&self, count: Option<&Shape>, offset: Option<&Shape>) -> Result<(Shape, Shape), ArrayError> {
        let count = specified(count).unwrap_or(&self.count).clone();
        let (end, origin) = match specified(offset) {
            None => (count.clone(), self.offset.clone()),
            Some(offset) => (count.checked_add(offset)?, self.offset.checked_add(offset)?),
        };
        if !end.all_le(&self.count)? {
            return Err(ArrayError::OutOfBounds {
                index: end,
                extent: self.count.clone(),
            });
        }
        log::trace!("view {} at {}: transfer {} at {}", self.count, self.offset, count, origin);
        Ok((count, origin))
    }
}

impl<D: DataSet + ?Sized> DataSet for DataView<'_, D> {
    fn data_type(&self) -> DataType {
        self.parent.data_type()
    }

    fn extent(&self) -> Result<Shape, ArrayError> {
        Ok(self.count.clone())
    }

    fn set_extent(&mut self, _extent: &Shape) -> Result<(), ArrayError> {
        Err(ArrayError::ImmutableExtent)
    }

    fn read(
        &self,
        data_type: DataType,
        buffer: ElementsMut<'_>,
        count: Option<&Shape>,
        offset: Option<&Shape>,
    ) -> Result<(), ArrayError> {
        let (count, origin) = self.translate(count, offset)?;
        self.parent.read(data_type, buffer, Some(&count), Some(&origin))
    }

    fn write(
        &mut self,
        data_type: DataType,
        buffer: Elements<'_>,
        count: Option<&Shape>,
        offset: Option<&Shape>,
    ) -> Result<(), ArrayError> {
        let (count, origin) = self.translate(count, offset)?;
        self.parent.write(data_type, buffer, Some(&count), Some(&origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::{DataSetExt, memory::MemoryArray},
        element::Element,
    };

    fn parent() -> MemoryArray {
        let values: Vec<i32> = (0..10).collect();
        MemoryArray::from_value(&values).unwrap()
    }

    #[test]
    fn construction_is_bounded_by_parent_extent() {
        let mut array = parent();
        assert!(DataView::new(&mut array, Shape::from([3]), Shape::from([7])).is_ok());
        assert!(matches!(
            DataView::new(&mut array, Shape::from([3]), Shape::from([8])),
            Err(ArrayError::OutOfBounds { .. })
        ));
        assert!(matches!(
            DataView::new(&mut array, Shape::from([3, 1]), Shape::from([0])),
            Err(ArrayError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn element_type_comes_from_parent() {
        let mut array = parent();
        let mut view = DataView::new(&mut array, Shape::from([2]), Shape::from([4])).unwrap();
        assert_eq!(view.data_type(), DataType::I32);
        assert!(matches!(
            view.write_from(&vec![1u8, 2]),
            Err(ArrayError::ImmutableExtent)
        ));
        assert!(matches!(
            view.write_from(&vec![String::new(); 2]),
            Err(ArrayError::DataTypeMismatch { .. })
        ));
    }

    #[test]
    fn extent_is_fixed() {
        let mut array = parent();
        let mut view = DataView::new(&mut array, Shape::from([3]), Shape::from([2])).unwrap();
        assert_eq!(view.extent().unwrap(), Shape::from([3]));
        assert!(matches!(
            view.set_extent(&Shape::from([99])),
            Err(ArrayError::ImmutableExtent)
        ));
        assert!(matches!(
            view.set_extent(&Shape::from([3])),
            Err(ArrayError::ImmutableExtent)
        ));
        assert_eq!(view.extent().unwrap(), Shape::from([3]));
    }

    #[test]
    fn count_larger_than_view_is_out_of_bounds() {
        let mut array = parent();
        let view = DataView::new(&mut array, Shape::from([3]), Shape::from([2])).unwrap();
        let mut out = [0i32; 5];
        let err = view
            .read(DataType::I32, i32::elements_mut(&mut out), Some(&Shape::from([5])), None)
            .unwrap_err();
        assert!(matches!(err, ArrayError::OutOfBounds { .. }));
    }

    #[test]
    fn offset_is_relative_to_view_origin() {
        let mut array = parent();
        let view = DataView::new(&mut array, Shape::from([3]), Shape::from([2])).unwrap();

        let mut out = [0i32; 2];
        view.read(
            DataType::I32,
            i32::elements_mut(&mut out),
            Some(&Shape::from([2])),
            Some(&Shape::from([1])),
        )
        .unwrap();
        assert_eq!(out, [3, 4]);

        let mut head = [0i32; 2];
        view.read(DataType::I32, i32::elements_mut(&mut head), Some(&Shape::from([2])), None)
            .unwrap();
        assert_eq!(head, [2, 3]);

        let err = view
            .read(
                DataType::I32,
                i32::elements_mut(&mut out),
                Some(&Shape::from([2])),
                Some(&Shape::from([2])),
            )
            .unwrap_err();
        assert!(matches!(err, ArrayError::OutOfBounds { .. }));
    }

    #[test]
    fn typed_operations_through_a_view() {
        let mut array = parent();
        {
            let mut view = DataView::new(&mut array, Shape::from([4]), Shape::from([3])).unwrap();
            let mut whole: Vec<i32> = Vec::new();
            view.read_into(&mut whole).unwrap();
            assert_eq!(whole, vec![3, 4, 5, 6]);

            view.write_at(&vec![-1, -2], &Shape::from([2])).unwrap();
            assert!(matches!(
                view.write_from(&vec![0i32; 4]),
                Err(ArrayError::ImmutableExtent)
            ));
        }
        let mut all: Vec<i32> = Vec::new();
        array.read_into(&mut all).unwrap();
        assert_eq!(all, vec![0, 1, 2, 3, 4, -1, -2, 7, 8, 9]);
    }

    #[test]
    fn views_nest() {
        let mut array = parent();
        let mut outer = DataView::new(&mut array, Shape::from([6]), Shape::from([2])).unwrap();
        let inner = DataView::new(&mut outer, Shape::from([2]), Shape::from([3])).unwrap();
        let mut out = vec![0i32; 0];
        inner.read_into(&mut out).unwrap();
        assert_eq!(out, vec![5, 6]);
    }
}
