//! Typed multi-dimensional array storage.
//!
//! Host values ([`HostAdapter`]) are moved in and out of array-like targets ([`DataSet`]) either
//! whole or in rectangular windows. Targets are an in-memory array ([`MemoryArray`]), an object
//! store directory ([`StoreArray`]), or a fixed window over another target ([`DataView`]).
//!
//! ```no_run
//! use ndstore::{DataSetExt, DataType, MemoryArray, Shape};
//!
//! let mut target = MemoryArray::new(DataType::F64, Shape::new())?;
//! target.write_from(&ndarray::array![[1.0, 2.0], [3.0, 4.0]])?;
//!
//! let mut row = vec![0.0f64; 2];
//! target.read_window(&mut row, &Shape::from([1, 2]), &Shape::from([1, 0]))?;
//! assert_eq!(row, vec![3.0, 4.0]);
//! # Ok::<(), ndstore::ArrayError>(())
//! ```
pub mod chunking;
pub mod consts;
pub mod dataset;
pub mod dense;
pub mod dtype;
pub mod element;
pub mod error;
pub mod host;
pub mod selection;
pub mod shape;
pub mod store;

pub use dataset::{DataSet, DataSetExt, memory::MemoryArray, view::DataView};
pub use dense::DenseBuffer;
pub use dtype::DataType;
pub use element::{Char, Element, Elements, ElementsMut, FixedWidth};
pub use error::ArrayError;
pub use host::HostAdapter;
pub use selection::{Mode, Preset, Selection};
pub use shape::Shape;
pub use store::{StoreArray, StoreError};
