//! Element storage types.
//!
//! A [`StorageType`] describes how a variable's payload is encoded in
//! memory, independently of its [`ClassTag`](crate::ClassTag): a `double`
//! array may hold `uint8` values, and a `char` array holds UTF code units.

use std::fmt;

use mat73_container::NativeType;

/// In-memory element encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// f64
    Double,
    /// f32
    Single,
    /// i8
    Int8,
    /// u8
    UInt8,
    /// i16
    Int16,
    /// u16
    UInt16,
    /// i32
    Int32,
    /// u32
    UInt32,
    /// i64
    Int64,
    /// u64
    UInt64,
    /// UTF-8 code units
    Utf8,
    /// UTF-16 code units
    Utf16,
    /// UTF-32 code units
    Utf32,
}

impl StorageType {
    /// Native scalar encoding used for raw element storage.
    ///
    /// Every storage type maps to exactly one native type; the UTF
    /// encodings map to unsigned integers of their code-unit width.
    pub const fn native_type(&self) -> NativeType {
        match self {
            StorageType::Double => NativeType::Float64,
            StorageType::Single => NativeType::Float32,
            StorageType::Int8 => NativeType::Int8,
            StorageType::UInt8 | StorageType::Utf8 => NativeType::UInt8,
            StorageType::Int16 => NativeType::Int16,
            StorageType::UInt16 | StorageType::Utf16 => NativeType::UInt16,
            StorageType::Int32 => NativeType::Int32,
            StorageType::UInt32 | StorageType::Utf32 => NativeType::UInt32,
            StorageType::Int64 => NativeType::Int64,
            StorageType::UInt64 => NativeType::UInt64,
        }
    }

    /// Storage type of a plain numeric native type.
    pub const fn from_native(native: NativeType) -> Self {
        match native {
            NativeType::Float64 => StorageType::Double,
            NativeType::Float32 => StorageType::Single,
            NativeType::Int8 => StorageType::Int8,
            NativeType::UInt8 => StorageType::UInt8,
            NativeType::Int16 => StorageType::Int16,
            NativeType::UInt16 => StorageType::UInt16,
            NativeType::Int32 => StorageType::Int32,
            NativeType::UInt32 => StorageType::UInt32,
            NativeType::Int64 => StorageType::Int64,
            NativeType::UInt64 => StorageType::UInt64,
        }
    }

    /// Native type of the dataset a `char` array with this storage is
    /// written to.
    ///
    /// 32-bit storage keeps 32-bit code units; 8- and 16-bit storage is
    /// written as 16-bit code units. Floating-point and 64-bit storage hold
    /// no code units and give `None`.
    pub const fn char_dataset_type(&self) -> Option<NativeType> {
        let native = self.native_type();
        if native.is_float() || native.size_bytes() > 4 {
            return None;
        }
        Some(if native.size_bytes() == 4 {
            NativeType::UInt32
        } else {
            NativeType::UInt16
        })
    }

    /// Check if this is a UTF code-unit encoding.
    pub const fn is_text(&self) -> bool {
        matches!(self, StorageType::Utf8 | StorageType::Utf16 | StorageType::Utf32)
    }

    /// Short lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            StorageType::Double => "double",
            StorageType::Single => "single",
            StorageType::Int8 => "int8",
            StorageType::UInt8 => "uint8",
            StorageType::Int16 => "int16",
            StorageType::UInt16 => "uint16",
            StorageType::Int32 => "int32",
            StorageType::UInt32 => "uint32",
            StorageType::Int64 => "int64",
            StorageType::UInt64 => "uint64",
            StorageType::Utf8 => "utf8",
            StorageType::Utf16 => "utf16",
            StorageType::Utf32 => "utf32",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
