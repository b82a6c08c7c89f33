//! Scalar and resource vocabulary used by type instructions.

use serde::{Deserialize, Serialize};

/// Scalar base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Half,
    Float,
    Double,
}

impl BaseType {
    pub const ALL: [BaseType; 13] = [
        BaseType::Void,
        BaseType::Bool,
        BaseType::Int8,
        BaseType::Int16,
        BaseType::Int32,
        BaseType::Int64,
        BaseType::UInt8,
        BaseType::UInt16,
        BaseType::UInt32,
        BaseType::UInt64,
        BaseType::Half,
        BaseType::Float,
        BaseType::Double,
    ];

    pub fn is_float(self) -> bool {
        matches!(self, BaseType::Half | BaseType::Float | BaseType::Double)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BaseType::Int8
                | BaseType::Int16
                | BaseType::Int32
                | BaseType::Int64
                | BaseType::UInt8
                | BaseType::UInt16
                | BaseType::UInt32
                | BaseType::UInt64
        )
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            BaseType::Int8 | BaseType::Int16 | BaseType::Int32 | BaseType::Int64
        ) || self.is_float()
    }

    /// `void` is a type but never a value; everything else can be a vector/matrix element.
    pub fn is_value(self) -> bool {
        self != BaseType::Void
    }
}

/// How a texture resource may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAccess {
    Read,
    ReadWrite,
    RasterOrdered,
    Append,
    Consume,
}
