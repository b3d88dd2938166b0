//! The windowed array contract and the typed algorithms built on it.
//!
//! A [`DataSet`] is any array-like object with an extent that can be read and written in
//! rectangular windows. Buffers are untyped at this level ([`Elements`] / [`ElementsMut`] plus
//! a [`DataType`] tag); [`DataSetExt`] layers the typed whole-object and windowed operations on
//! top, for any [`HostAdapter`] value.
//!
//! ## Windows
//! `count` and `offset` are optional. An absent offset means "the entire current extent from
//! the origin"; a present offset with an absent count means one element per dimension. A
//! rank-0 shape passed as `Some` is treated exactly like `None`.
//!
//! ```text
//! DataSetExt::read_into / write_from / read_window / read_at / write_at
//!                 │
//!                 ▼
//!   DataSet::read / write (dtype, buffer, count, offset)
//!         ├── MemoryArray     (in memory)
//!         ├── StoreArray      (object store directory)
//!         └── DataView        (fixed window over another DataSet)
//! ```
pub(crate) mod hyperslab;
pub mod memory;
pub(crate) mod storage;
pub mod view;

use ndarray::{ArrayD, IxDyn};

use self::storage::check_types;
use crate::{
    dtype::DataType,
    element::{Element, Elements, ElementsMut},
    error::ArrayError,
    host::HostAdapter,
    selection::Selection,
    shape::Shape,
};

/// Windowed, untyped access to an array-like object.
pub trait DataSet {
    /// Element kind held by the target.
    fn data_type(&self) -> DataType;

    /// Current extent.
    fn extent(&self) -> Result<Shape, ArrayError>;

    /// Grow or shrink the extent. Implementers may refuse.
    fn set_extent(&mut self, extent: &Shape) -> Result<(), ArrayError>;

    /// Read the window (`count`, `offset`) into `buffer`, row-major.
    fn read(
        &self,
        data_type: DataType,
        buffer: ElementsMut<'_>,
        count: Option<&Shape>,
        offset: Option<&Shape>,
    ) -> Result<(), ArrayError>;

    /// Write `buffer` into the window (`count`, `offset`), row-major.
    fn write(
        &mut self,
        data_type: DataType,
        buffer: Elements<'_>,
        count: Option<&Shape>,
        offset: Option<&Shape>,
    ) -> Result<(), ArrayError>;
}

/// `None` for an absent or rank-0 shape.
pub fn specified(shape: Option<&Shape>) -> Option<&Shape> {
    shape.filter(|s| !s.is_empty())
}

/// Typed operations over any [`DataSet`].
pub trait DataSetExt: DataSet {
    /// Resize `value` to the current extent and read everything into it.
    fn read_into<T: HostAdapter + ?Sized>(&self, value: &mut T) -> Result<(), ArrayError> {
        let extent = self.extent()?;
        value.resize(&extent)?;
        let data_type = value.element_type();
        let shape = value.shape();
        self.read(data_type, value.data_mut()?, Some(&shape), None)
    }

    /// Set the extent to the shape of `value` and write all of it.
    ///
    /// The value's storage and element kind are checked before the extent changes, so a
    /// rejected write leaves the target as it was.
    fn write_from<T: HostAdapter + ?Sized>(&mut self, value: &T) -> Result<(), ArrayError> {
        let shape = value.shape();
        let data_type = value.element_type();
        let data = value.data()?;
        check_types(self.data_type(), data_type, data.data_type())?;
        let expected = shape.checked_nelms()?;
        if data.len() != expected {
            return Err(ArrayError::WrongElementCount {
                expected,
                actual: data.len(),
            });
        }
        self.set_extent(&shape)?;
        self.write(data_type, data, Some(&shape), None)
    }

    /// Resize `value` to `count` and read the window at `offset` into it.
    fn read_window<T: HostAdapter + ?Sized>(
        &self,
        value: &mut T,
        count: &Shape,
        offset: &Shape,
    ) -> Result<(), ArrayError> {
        value.resize(count)?;
        let data_type = value.element_type();
        self.read(data_type, value.data_mut()?, Some(count), Some(offset))
    }

    /// Read a window at `offset` shaped like `value` (one element per dimension for scalars).
    fn read_at<T: HostAdapter + ?Sized>(&self, value: &mut T, offset: &Shape) -> Result<(), ArrayError> {
        let mut count = value.shape();
        if count.is_empty() {
            count = Shape::ones(offset.rank());
        }
        let data_type = value.element_type();
        self.read(data_type, value.data_mut()?, Some(&count), Some(offset))
    }

    /// Write `value` at `offset` without changing the extent.
    fn write_at<T: HostAdapter + ?Sized>(&mut self, value: &T, offset: &Shape) -> Result<(), ArrayError> {
        let shape = value.shape();
        self.write(value.element_type(), value.data()?, Some(&shape), Some(offset))
    }

    /// Gather every block of `selection` into one vector, block by block.
    fn read_selection<T: Element>(&self, selection: &Selection) -> Result<Vec<T>, ArrayError> {
        let mut out = Vec::with_capacity(selection.num_elements());
        for (count, start) in selection.hyperslabs()? {
            let mut block = ArrayD::<T>::default(IxDyn(count.as_slice()));
            self.read_at(&mut block, &start)?;
            out.extend(block.iter().cloned());
        }
        Ok(out)
    }
}

impl<D: DataSet + ?Sized> DataSetExt for D {}
