//! Arrays persisted in an [`ObjectStore`] directory.
//!
//! Layout
//!
//! ```text
//! array_dir/
//!     array.json      ArrayMetadata (physical type, extent, chunk shape, format version)
//!     data.bin        element blob (see [`blob`])
//! ```
//!
//! [`StoreArray`] keeps the decoded elements in memory and writes both objects through on every
//! extent change or write. Its methods are synchronous: each call drives the async store to
//! completion on a current-thread runtime owned by the array, so it must not be used from
//! within another tokio runtime.
pub(crate) mod blob;
pub mod datatype;
pub mod error;
pub mod metadata;

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{ObjectStore, PutPayload, path::Path};
use tokio::runtime::Runtime;

pub use datatype::{PhysicalType, TypeClass};
pub use error::StoreError;
pub use metadata::{ArrayMetadata, FORMAT_VERSION};

use crate::{
    consts,
    dataset::{
        DataSet,
        storage::{Storage, Window, check_types},
    },
    dtype::DataType,
    element::{Elements, ElementsMut},
    error::ArrayError,
    shape::Shape,
};

async fn get_object(store: &dyn ObjectStore, location: &Path) -> Result<Option<Bytes>, StoreError> {
    match store.get(location).await {
        Ok(result) => Ok(Some(result.bytes().await?)),
        Err(object_store::Error::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read and decode the array stored under `dir`.
pub(crate) async fn load_array(
    store: &dyn ObjectStore,
    dir: &Path,
) -> Result<(ArrayMetadata, Storage), ArrayError> {
    let uninitialized = || ArrayError::UninitializedTarget {
        location: dir.to_string(),
    };

    let mut json = get_object(store, &dir.child(consts::ARRAY_METADATA_OBJECT))
        .await?
        .ok_or_else(uninitialized)?
        .to_vec();
    let metadata: ArrayMetadata = simd_json::from_slice(&mut json).map_err(StoreError::from)?;
    if metadata.format_version > FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            version: metadata.format_version,
        }
        .into());
    }
    let data_type = metadata.data_type.data_type()?;

    let data = get_object(store, &dir.child(consts::ARRAY_DATA_OBJECT))
        .await?
        .ok_or_else(uninitialized)?;
    let storage = blob::decode(data_type, metadata.extent.checked_nelms()?, &data)?;
    Ok((metadata, storage))
}

/// Write both objects of an array under `dir`.
pub(crate) async fn save_array(
    store: &dyn ObjectStore,
    dir: &Path,
    metadata: &ArrayMetadata,
    storage: &Storage,
) -> Result<(), ArrayError> {
    let json = simd_json::to_vec(metadata).map_err(StoreError::from)?;
    store
        .put(
            &dir.child(consts::ARRAY_METADATA_OBJECT),
            PutPayload::from_bytes(json.into()),
        )
        .await
        .map_err(StoreError::from)?;

    let data = blob::encode(storage)?;
    store
        .put(&dir.child(consts::ARRAY_DATA_OBJECT), PutPayload::from_bytes(data))
        .await
        .map_err(StoreError::from)?;
    Ok(())
}

/// Directories under `prefix` holding an array, sorted.
pub async fn discover_arrays(
    store: &dyn ObjectStore,
    prefix: Option<&Path>,
) -> Result<Vec<Path>, StoreError> {
    let mut objects = store.list(prefix);
    let mut dirs = Vec::new();
    while let Some(object) = objects.try_next().await? {
        if object.location.filename() != Some(consts::ARRAY_METADATA_OBJECT) {
            continue;
        }
        let parts: Vec<_> = object.location.parts().collect();
        dirs.push(parts[..parts.len() - 1].iter().cloned().collect::<Path>());
    }
    dirs.sort();
    Ok(dirs)
}

fn runtime() -> Result<Runtime, ArrayError> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(StoreError::from)?)
}

/// A persistent array in an object store directory.
///
/// Writes and extent changes are applied to a staged copy that is persisted before it replaces
/// the in-memory state, so a failed put leaves the handle at its last persisted state. The two
/// objects are put one after the other: if the data put fails after the metadata put succeeded,
/// the store holds the new metadata next to the old data until the next successful flush.
#[derive(Debug)]
pub struct StoreArray {
    runtime: Runtime,
    store: Arc<dyn ObjectStore>,
    dir: Path,
    metadata: ArrayMetadata,
    storage: Storage,
}

impl StoreArray {
    /// Create (or overwrite) a default-initialised array under `dir`.
    pub fn create(
        store: Arc<dyn ObjectStore>,
        dir: Path,
        data_type: DataType,
        extent: Shape,
    ) -> Result<Self, ArrayError> {
        let metadata = ArrayMetadata::new(data_type, extent)?;
        let storage = Storage::new(data_type, metadata.extent.checked_nelms()?)?;
        let array = Self {
            runtime: runtime()?,
            store,
            dir,
            metadata,
            storage,
        };
        log::debug!("creating array {} {} at {}", data_type, array.metadata.extent, array.dir);
        array.flush()?;
        Ok(array)
    }

    /// Open the array stored under `dir`.
    ///
    /// # Errors
    /// [`ArrayError::UninitializedTarget`] if `dir` has no metadata or data object.
    pub fn open(store: Arc<dyn ObjectStore>, dir: Path) -> Result<Self, ArrayError> {
        let runtime = runtime()?;
        let (metadata, storage) = runtime.block_on(load_array(store.as_ref(), &dir))?;
        log::debug!("opened array {} at {}", metadata.extent, dir);
        Ok(Self {
            runtime,
            store,
            dir,
            metadata,
            storage,
        })
    }

    pub fn metadata(&self) -> &ArrayMetadata {
        &self.metadata
    }

    pub fn location(&self) -> &Path {
        &self.dir
    }

    /// Write the current state to the store.
    pub fn flush(&self) -> Result<(), ArrayError> {
        self.persist(&self.metadata, &self.storage)
    }

    fn persist(&self, metadata: &ArrayMetadata, storage: &Storage) -> Result<(), ArrayError> {
        self.runtime
            .block_on(save_array(self.store.as_ref(), &self.dir, metadata, storage))
    }
}

impl DataSet for StoreArray {
    fn data_type(&self) -> DataType {
        self.storage.data_type()
    }

    fn extent(&self) -> Result<Shape, ArrayError> {
        Ok(self.metadata.extent.clone())
    }

    /// Keeps the overlapping region when the rank is unchanged; a rank change resets every
    /// element to its default.
    fn set_extent(&mut self, extent: &Shape) -> Result<(), ArrayError> {
        if *extent == self.metadata.extent {
            return Ok(());
        }
        if extent.rank() != self.metadata.extent.rank() {
            log::warn!(
                "rank change {} -> {} resets array contents at {}",
                self.metadata.extent,
                extent,
                self.dir
            );
        }
        log::debug!("resizing array at {}: {} -> {}", self.dir, self.metadata.extent, extent);
        let storage = self.storage.resized(&self.metadata.extent, extent)?;
        let mut metadata = self.metadata.clone();
        metadata.set_extent(extent.clone())?;
        self.persist(&metadata, &storage)?;
        self.storage = storage;
        self.metadata = metadata;
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
        let window = Window::resolve(&self.metadata.extent, count, offset)?;
        log::debug!(
            "read {} elements at {} from {}",
            window.nelms(),
            window.offset,
            self.dir
        );
        self.storage.read_window(&self.metadata.extent, &window, buffer)
    }

    fn write(
        &mut self,
        data_type: DataType,
        buffer: Elements<'_>,
        count: Option<&Shape>,
        offset: Option<&Shape>,
    ) -> Result<(), ArrayError> {
        check_types(self.data_type(), data_type, buffer.data_type())?;
        let window = Window::resolve(&self.metadata.extent, count, offset)?;
        log::debug!(
            "write {} elements at {} to {}",
            window.nelms(),
            window.offset,
            self.dir
        );
        let mut staged = self.storage.clone();
        staged.write_window(&self.metadata.extent, &window, buffer)?;
        self.persist(&self.metadata, &staged)?;
        self.storage = staged;
        Ok(())
    }
}
