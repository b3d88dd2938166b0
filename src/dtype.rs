use std::{fmt, str::FromStr};

use crate::error::ArrayError;

/// The closed set of scalar element kinds the engine can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    Bool,
    Char,
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    String,
    /// Placeholder for "no data"; zero width.
    Nothing,
}

impl DataType {
    pub const ALL: [DataType; 14] = [
        DataType::Bool,
        DataType::Char,
        DataType::F32,
        DataType::F64,
        DataType::I8,
        DataType::I16,
        DataType::I32,
        DataType::I64,
        DataType::U8,
        DataType::U16,
        DataType::U32,
        DataType::U64,
        DataType::String,
        DataType::Nothing,
    ];

    /// In-memory width of a single element in bytes.
    ///
    /// Strings are variable-length in storage; in memory each element is an owned `String`
    /// handle, so the width is the size of that handle.
    pub const fn width(&self) -> usize {
        match self {
            DataType::Bool | DataType::Char | DataType::I8 | DataType::U8 => 1,
            DataType::I16 | DataType::U16 => 2,
            DataType::I32 | DataType::U32 | DataType::F32 => 4,
            DataType::I64 | DataType::U64 | DataType::F64 => 8,
            DataType::String => std::mem::size_of::<String>(),
            DataType::Nothing => 0,
        }
    }

    /// Integer and floating point kinds, which convert into one another on transfer.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::F32
                | DataType::F64
                | DataType::I8
                | DataType::I16
                | DataType::I32
                | DataType::I64
                | DataType::U8
                | DataType::U16
                | DataType::U32
                | DataType::U64
        )
    }

    pub const fn is_variable_sized(&self) -> bool {
        matches!(self, DataType::String)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            DataType::Bool => "Bool",
            DataType::Char => "Char",
            DataType::F32 => "Float",
            DataType::F64 => "Double",
            DataType::I8 => "Int8",
            DataType::I16 => "Int16",
            DataType::I32 => "Int32",
            DataType::I64 => "Int64",
            DataType::U8 => "UInt8",
            DataType::U16 => "UInt16",
            DataType::U32 => "UInt32",
            DataType::U64 => "UInt64",
            DataType::String => "String",
            DataType::Nothing => "Nothing",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a type name case-insensitively (`"int32"`, `"INT32"` and `"Int32"` are all `I32`).
impl FromStr for DataType {
    type Err = ArrayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|dtype| dtype.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ArrayError::UnknownDataType {
                name: s.to_string(),
            })
    }
}
