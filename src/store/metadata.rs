use crate::{
    chunking::guess_chunking, dtype::DataType, error::ArrayError, shape::Shape,
    store::datatype::PhysicalType,
};

pub const FORMAT_VERSION: u32 = 1;

/// Contents of `array.json`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArrayMetadata {
    pub format_version: u32,
    pub data_type: PhysicalType,
    pub extent: Shape,
    /// Storage chunk hint; absent for scalars.
    pub chunk_shape: Option<Shape>,
}

impl ArrayMetadata {
    pub fn new(data_type: DataType, extent: Shape) -> Result<Self, ArrayError> {
        let mut metadata = Self {
            format_version: FORMAT_VERSION,
            data_type: data_type.into(),
            extent: Shape::new(),
            chunk_shape: None,
        };
        metadata.set_extent(extent)?;
        Ok(metadata)
    }

    /// Update the extent and re-guess the chunk shape.
    pub fn set_extent(&mut self, extent: Shape) -> Result<(), ArrayError> {
        self.chunk_shape = if extent.is_empty() {
            None
        } else {
            Some(guess_chunking(&extent, self.data_type.size.max(1))?)
        };
        self.extent = extent;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let metadata = ArrayMetadata::new(DataType::F64, Shape::from([100, 100])).unwrap();
        assert_eq!(metadata.chunk_shape, Some(Shape::from([25, 50])));

        let mut json = simd_json::to_vec(&metadata).unwrap();
        let decoded: ArrayMetadata = simd_json::from_slice(&mut json).unwrap();
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn scalars_have_no_chunks() {
        let metadata = ArrayMetadata::new(DataType::String, Shape::new()).unwrap();
        assert_eq!(metadata.chunk_shape, None);
        assert_eq!(metadata.data_type.data_type().unwrap(), DataType::String);
    }
}
