use crate::{
    dataset::{
        DataSet, DataSetExt,
        storage::{Storage, Window, check_types},
    },
    dtype::DataType,
    element::{Elements, ElementsMut},
    error::ArrayError,
    host::HostAdapter,
    shape::Shape,
};

/// A resizable array held in memory.
///
/// A rank-0 extent holds a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryArray {
    extent: Shape,
    storage: Storage,
}

impl MemoryArray {
    /// A default-initialised array (zeros, `false`, empty strings).
    pub fn new(data_type: DataType, extent: Shape) -> Result<Self, ArrayError> {
        let storage = Storage::new(data_type, extent.checked_nelms()?)?;
        Ok(Self { extent, storage })
    }

    /// An array holding a copy of `value`.
    pub fn from_value<T: HostAdapter + ?Sized>(value: &T) -> Result<Self, ArrayError> {
        let mut array = Self::new(value.element_type(), value.shape())?;
        array.write_from(value)?;
        Ok(array)
    }
}

impl DataSet for MemoryArray {
    fn data_type(&self) -> DataType {
        self.storage.data_type()
    }

    fn extent(&self) -> Result<Shape, ArrayError> {
        Ok(self.extent.clone())
    }

    /// Keeps the overlapping region when the rank is unchanged; a rank change resets every
    /// element to its default.
    fn set_extent(&mut self, extent: &Shape) -> Result<(), ArrayError> {
        if *extent == self.extent {
            return Ok(());
        }
        if extent.rank() != self.extent.rank() {
            log::warn!(
                "rank change {} -> {} resets memory array contents",
                self.extent,
                extent
            );
        }
        log::debug!("resizing memory array {} -> {}", self.extent, extent);
        self.storage = self.storage.resized(&self.extent, extent)?;
        self.extent = extent.clone();
        Ok(())
    }

    fn read(
        &self,
        data_type: DataType,
        buffer: ElementsMut<'_>,
        count: Option<&Shape>,
        offset: Option<&Shape>,
    ) -> Result<(), ArrayError> {
        check_types(self.data_type(), data_type, buffer.data_type())?;
        let window = Window::resolve(&self.extent, count, offset)?;
        log::debug!(
            "read {} elements at {} from memory array {}",
            window.nelms(),
            window.offset,
            self.extent
        );
        self.storage.read_window(&self.extent, &window, buffer)
    }

    fn write(
        &mut self,
        data_type: DataType,
        buffer: Elements<'_>,
        count: Option<&Shape>,
        offset: Option<&Shape>,
    ) -> Result<(), ArrayError> {
        check_types(self.data_type(), data_type, buffer.data_type())?;
        let window = Window::resolve(&self.extent, count, offset)?;
        log::debug!(
            "write {} elements at {} to memory array {}",
            window.nelms(),
            window.offset,
            self.extent
        );
        self.storage.write_window(&self.extent, &window, buffer)
    }
}
