//! Typed element buffers.
//!
//! A [`Buffer`] is what flows through `write_dataset` and `read_dataset`:
//! a flat vector of one native element type, or of object references.
//! Writing a buffer into a dataset of a different native type converts
//! value by value, the same way a memory type differs from a file type.

use crate::types::{NativeType, ObjectRef};

/// A flat, typed run of dataset elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    /// i8 values
    Int8(Vec<i8>),
    /// u8 values
    UInt8(Vec<u8>),
    /// i16 values
    Int16(Vec<i16>),
    /// u16 values
    UInt16(Vec<u16>),
    /// i32 values
    Int32(Vec<i32>),
    /// u32 values
    UInt32(Vec<u32>),
    /// i64 values
    Int64(Vec<i64>),
    /// u64 values
    UInt64(Vec<u64>),
    /// f32 values
    Float32(Vec<f32>),
    /// f64 values
    Float64(Vec<f64>),
    /// object references
    Refs(Vec<ObjectRef>),
}

/// A Rust scalar that maps onto one [`NativeType`].
pub trait Element: Copy + Send + Sync + 'static {
    /// The native type of this scalar.
    const NATIVE: NativeType;

    /// Wrap a vector of this scalar into a buffer.
    fn wrap(values: Vec<Self>) -> Buffer;

    /// Borrow the buffer's values if it holds this scalar.
    fn view(buffer: &Buffer) -> Option<&[Self]>;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const NATIVE: NativeType = NativeType::$variant;

                fn wrap(values: Vec<Self>) -> Buffer {
                    Buffer::$variant(values)
                }

                fn view(buffer: &Buffer) -> Option<&[Self]> {
                    match buffer {
                        Buffer::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl From<Vec<$ty>> for Buffer {
                fn from(values: Vec<$ty>) -> Self {
                    Buffer::$variant(values)
                }
            }
        )*
    };
}

impl_element! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

impl From<Vec<ObjectRef>> for Buffer {
    fn from(values: Vec<ObjectRef>) -> Self {
        Buffer::Refs(values)
    }
}

// Casts every value of `$src` into the scalar named by `$target`.
macro_rules! cast_all {
    ($src:expr, $target:expr) => {
        match $target {
            NativeType::Int8 => Buffer::Int8($src.iter().map(|&x| x as i8).collect()),
            NativeType::UInt8 => Buffer::UInt8($src.iter().map(|&x| x as u8).collect()),
            NativeType::Int16 => Buffer::Int16($src.iter().map(|&x| x as i16).collect()),
            NativeType::UInt16 => Buffer::UInt16($src.iter().map(|&x| x as u16).collect()),
            NativeType::Int32 => Buffer::Int32($src.iter().map(|&x| x as i32).collect()),
            NativeType::UInt32 => Buffer::UInt32($src.iter().map(|&x| x as u32).collect()),
            NativeType::Int64 => Buffer::Int64($src.iter().map(|&x| x as i64).collect()),
            NativeType::UInt64 => Buffer::UInt64($src.iter().map(|&x| x as u64).collect()),
            NativeType::Float32 => Buffer::Float32($src.iter().map(|&x| x as f32).collect()),
            NativeType::Float64 => Buffer::Float64($src.iter().map(|&x| x as f64).collect()),
        }
    };
}

impl Buffer {
    /// Number of values in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Buffer::Int8(v) => v.len(),
            Buffer::UInt8(v) => v.len(),
            Buffer::Int16(v) => v.len(),
            Buffer::UInt16(v) => v.len(),
            Buffer::Int32(v) => v.len(),
            Buffer::UInt32(v) => v.len(),
            Buffer::Int64(v) => v.len(),
            Buffer::UInt64(v) => v.len(),
            Buffer::Float32(v) => v.len(),
            Buffer::Float64(v) => v.len(),
            Buffer::Refs(v) => v.len(),
        }
    }

    /// Check if the buffer holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The native type of the values, or `None` for object references.
    pub fn native_type(&self) -> Option<NativeType> {
        match self {
            Buffer::Int8(_) => Some(NativeType::Int8),
            Buffer::UInt8(_) => Some(NativeType::UInt8),
            Buffer::Int16(_) => Some(NativeType::Int16),
            Buffer::UInt16(_) => Some(NativeType::UInt16),
            Buffer::Int32(_) => Some(NativeType::Int32),
            Buffer::UInt32(_) => Some(NativeType::UInt32),
            Buffer::Int64(_) => Some(NativeType::Int64),
            Buffer::UInt64(_) => Some(NativeType::UInt64),
            Buffer::Float32(_) => Some(NativeType::Float32),
            Buffer::Float64(_) => Some(NativeType::Float64),
            Buffer::Refs(_) => None,
        }
    }

    /// Borrow the values as a slice of `T`, if the buffer holds `T`.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::view(self)
    }

    /// Borrow the object references, if this is a reference buffer.
    pub fn as_refs(&self) -> Option<&[ObjectRef]> {
        match self {
            Buffer::Refs(v) => Some(v),
            _ => None,
        }
    }

    /// Convert every value to `target`.
    ///
    /// Numeric conversion follows Rust `as` semantics (truncation for
    /// narrowing integers, saturation for float to integer). Returns `None`
    /// for reference buffers, which have no numeric representation.
    pub fn convert(&self, target: NativeType) -> Option<Buffer> {
        if self.native_type() == Some(target) {
            return Some(self.clone());
        }

        let converted = match self {
            Buffer::Int8(v) => cast_all!(v, target),
            Buffer::UInt8(v) => cast_all!(v, target),
            Buffer::Int16(v) => cast_all!(v, target),
            Buffer::UInt16(v) => cast_all!(v, target),
            Buffer::Int32(v) => cast_all!(v, target),
            Buffer::UInt32(v) => cast_all!(v, target),
            Buffer::Int64(v) => cast_all!(v, target),
            Buffer::UInt64(v) => cast_all!(v, target),
            Buffer::Float32(v) => cast_all!(v, target),
            Buffer::Float64(v) => cast_all!(v, target),
            Buffer::Refs(_) => return None,
        };
        Some(converted)
    }
}
