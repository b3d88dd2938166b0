//! Physical (on-disk) element types.
//!
//! Every [`DataType`] maps to a [`PhysicalType`]: a type class, a byte size and a signedness.
//! Numbers are stored little-endian; strings are variable-length UTF-8 (size 0). The inverse
//! mapping only accepts the combinations produced here.
use crate::{dtype::DataType, error::ArrayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeClass {
    Bitfield,
    Character,
    Integer,
    Float,
    String,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PhysicalType {
    pub class: TypeClass,
    pub size: usize,
    pub signed: bool,
}

impl PhysicalType {
    pub const fn new(class: TypeClass, size: usize, signed: bool) -> Self {
        Self {
            class,
            size,
            signed,
        }
    }

    pub const fn from_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Bool => Self::new(TypeClass::Bitfield, 1, false),
            DataType::Char => Self::new(TypeClass::Character, 1, false),
            DataType::F32 => Self::new(TypeClass::Float, 4, true),
            DataType::F64 => Self::new(TypeClass::Float, 8, true),
            DataType::I8 => Self::new(TypeClass::Integer, 1, true),
            DataType::I16 => Self::new(TypeClass::Integer, 2, true),
            DataType::I32 => Self::new(TypeClass::Integer, 4, true),
            DataType::I64 => Self::new(TypeClass::Integer, 8, true),
            DataType::U8 => Self::new(TypeClass::Integer, 1, false),
            DataType::U16 => Self::new(TypeClass::Integer, 2, false),
            DataType::U32 => Self::new(TypeClass::Integer, 4, false),
            DataType::U64 => Self::new(TypeClass::Integer, 8, false),
            DataType::String => Self::new(TypeClass::String, 0, false),
            DataType::Nothing => Self::new(TypeClass::Void, 0, false),
        }
    }

    /// The element type stored with this physical type.
    ///
    /// # Errors
    /// [`ArrayError::UnknownDataType`] for a class/size/sign combination with no element type.
    pub fn data_type(&self) -> Result<DataType, ArrayError> {
        let data_type = match (self.class, self.size, self.signed) {
            (TypeClass::Integer, 1, true) => DataType::I8,
            (TypeClass::Integer, 2, true) => DataType::I16,
            (TypeClass::Integer, 4, true) => DataType::I32,
            (TypeClass::Integer, 8, true) => DataType::I64,
            (TypeClass::Integer, 1, false) => DataType::U8,
            (TypeClass::Integer, 2, false) => DataType::U16,
            (TypeClass::Integer, 4, false) => DataType::U32,
            (TypeClass::Integer, 8, false) => DataType::U64,
            (TypeClass::Float, 4, _) => DataType::F32,
            (TypeClass::Float, 8, _) => DataType::F64,
            (TypeClass::Bitfield, 1, _) => DataType::Bool,
            (TypeClass::Character, 1, _) => DataType::Char,
            (TypeClass::String, _, _) => DataType::String,
            (TypeClass::Void, 0, _) => DataType::Nothing,
            _ => {
                return Err(ArrayError::UnknownDataType {
                    name: format!("{:?}/{}/{}", self.class, self.size, self.signed),
                });
            }
        };
        Ok(data_type)
    }
}

impl From<DataType> for PhysicalType {
    fn from(value: DataType) -> Self {
        Self::from_data_type(value)
    }
}
