//! MATLAB class taxonomy.
//!
//! Every array value belongs to one [`ClassTag`]. The tag's canonical name
//! is written verbatim as the `MATLAB_class` attribute and is the only
//! thing a reader uses to reconstruct the value's type.

use std::fmt;

use mat73_container::NativeType;

/// MATLAB array classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassTag {
    /// Cell array
    Cell,
    /// Struct or struct array
    Struct,
    /// Class object
    Object,
    /// Character array
    Char,
    /// Sparse matrix
    Sparse,
    /// Double-precision floating point
    Double,
    /// Single-precision floating point
    Single,
    /// 8-bit signed integer
    Int8,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit signed integer
    Int16,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit signed integer
    Int32,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit unsigned integer
    UInt64,
    /// Function handle
    Function,
}

impl ClassTag {
    /// Every class, in MATLAB's class-id order.
    pub const ALL: [ClassTag; 16] = [
        ClassTag::Cell,
        ClassTag::Struct,
        ClassTag::Object,
        ClassTag::Char,
        ClassTag::Sparse,
        ClassTag::Double,
        ClassTag::Single,
        ClassTag::Int8,
        ClassTag::UInt8,
        ClassTag::Int16,
        ClassTag::UInt16,
        ClassTag::Int32,
        ClassTag::UInt32,
        ClassTag::Int64,
        ClassTag::UInt64,
        ClassTag::Function,
    ];

    /// The canonical on-disk name of this class.
    pub const fn name(&self) -> &'static str {
        match self {
            ClassTag::Cell => "cell",
            ClassTag::Struct => "struct",
            ClassTag::Object => "object",
            ClassTag::Char => "char",
            ClassTag::Sparse => "sparse",
            ClassTag::Double => "double",
            ClassTag::Single => "single",
            ClassTag::Int8 => "int8",
            ClassTag::UInt8 => "uint8",
            ClassTag::Int16 => "int16",
            ClassTag::UInt16 => "uint16",
            ClassTag::Int32 => "int32",
            ClassTag::UInt32 => "uint32",
            ClassTag::Int64 => "int64",
            ClassTag::UInt64 => "uint64",
            ClassTag::Function => "function",
        }
    }

    /// Look a class up by its canonical name.
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// use mat73_rs::ClassTag;
    ///
    /// assert_eq!(ClassTag::from_name("uint16"), Some(ClassTag::UInt16));
    /// assert_eq!(ClassTag::from_name("Double"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Check if this is one of the numeric classes.
    pub const fn is_numeric(&self) -> bool {
        self.native_type().is_some()
    }

    /// Native element type used to store values of a numeric class.
    ///
    /// This is also the base type of the `real`/`imag` compound used for
    /// complex values. Non-numeric classes return `None`.
    pub const fn native_type(&self) -> Option<NativeType> {
        match self {
            ClassTag::Double => Some(NativeType::Float64),
            ClassTag::Single => Some(NativeType::Float32),
            ClassTag::Int8 => Some(NativeType::Int8),
            ClassTag::UInt8 => Some(NativeType::UInt8),
            ClassTag::Int16 => Some(NativeType::Int16),
            ClassTag::UInt16 => Some(NativeType::UInt16),
            ClassTag::Int32 => Some(NativeType::Int32),
            ClassTag::UInt32 => Some(NativeType::UInt32),
            ClassTag::Int64 => Some(NativeType::Int64),
            ClassTag::UInt64 => Some(NativeType::UInt64),
            ClassTag::Cell
            | ClassTag::Struct
            | ClassTag::Object
            | ClassTag::Char
            | ClassTag::Sparse
            | ClassTag::Function => None,
        }
    }

    /// The numeric class whose values are stored as `native`.
    pub const fn from_native(native: NativeType) -> Self {
        match native {
            NativeType::Float64 => ClassTag::Double,
            NativeType::Float32 => ClassTag::Single,
            NativeType::Int8 => ClassTag::Int8,
            NativeType::UInt8 => ClassTag::UInt8,
            NativeType::Int16 => ClassTag::Int16,
            NativeType::UInt16 => ClassTag::UInt16,
            NativeType::Int32 => ClassTag::Int32,
            NativeType::UInt32 => ClassTag::UInt32,
            NativeType::Int64 => ClassTag::Int64,
            NativeType::UInt64 => ClassTag::UInt64,
        }
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
