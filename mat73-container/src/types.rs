//! Element types, attribute values and object identities.
//!
//! These are the vocabulary of the [`Container`](crate::Container) trait:
//! what a dataset stores ([`ElementType`]), what an attribute holds
//! ([`AttrValue`]), and how objects are named ([`ObjectId`], [`ObjectRef`]).

use std::fmt;

/// Native scalar element encodings.
///
/// Every dataset element is ultimately stored as one of these, either
/// directly or as a member of a compound type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// 8-bit signed integer (i8)
    Int8,
    /// 8-bit unsigned integer (u8)
    UInt8,
    /// 16-bit signed integer (i16)
    Int16,
    /// 16-bit unsigned integer (u16)
    UInt16,
    /// 32-bit signed integer (i32)
    Int32,
    /// 32-bit unsigned integer (u32)
    UInt32,
    /// 64-bit signed integer (i64)
    Int64,
    /// 64-bit unsigned integer (u64)
    UInt64,
    /// 32-bit floating point (f32)
    Float32,
    /// 64-bit floating point (f64)
    Float64,
}

impl NativeType {
    /// Get the size in bytes of a single element of this type.
    pub const fn size_bytes(&self) -> usize {
        match self {
            NativeType::Int8 | NativeType::UInt8 => 1,
            NativeType::Int16 | NativeType::UInt16 => 2,
            NativeType::Int32 | NativeType::UInt32 | NativeType::Float32 => 4,
            NativeType::Int64 | NativeType::UInt64 | NativeType::Float64 => 8,
        }
    }

    /// Get the width in bits.
    pub const fn bits(&self) -> usize {
        self.size_bytes() * 8
    }

    /// Check if this type is a floating-point type.
    pub const fn is_float(&self) -> bool {
        matches!(self, NativeType::Float32 | NativeType::Float64)
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Int8 => write!(f, "int8"),
            NativeType::UInt8 => write!(f, "uint8"),
            NativeType::Int16 => write!(f, "int16"),
            NativeType::UInt16 => write!(f, "uint16"),
            NativeType::Int32 => write!(f, "int32"),
            NativeType::UInt32 => write!(f, "uint32"),
            NativeType::Int64 => write!(f, "int64"),
            NativeType::UInt64 => write!(f, "uint64"),
            NativeType::Float32 => write!(f, "float32"),
            NativeType::Float64 => write!(f, "float64"),
        }
    }
}

/// One member of a compound element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundField {
    /// Member name.
    pub name: String,
    /// Byte offset of the member within one element.
    pub offset: usize,
    /// Member encoding.
    pub native: NativeType,
}

/// The element type of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// A plain native scalar.
    Native(NativeType),

    /// A record of native members, laid out at the given offsets.
    Compound(Vec<CompoundField>),

    /// An object reference.
    ObjectRef,
}

impl ElementType {
    /// Build a compound type whose members all share one native type,
    /// packed back to back in the given order.
    pub fn packed(names: &[&str], native: NativeType) -> Self {
        let fields = names
            .iter()
            .enumerate()
            .map(|(i, name)| CompoundField {
                name: (*name).to_string(),
                offset: i * native.size_bytes(),
                native,
            })
            .collect();
        ElementType::Compound(fields)
    }

    /// Size in bytes of one element.
    pub fn size_bytes(&self) -> usize {
        match self {
            ElementType::Native(n) => n.size_bytes(),
            ElementType::Compound(fields) => fields
                .iter()
                .map(|f| f.offset + f.native.size_bytes())
                .max()
                .unwrap_or(0),
            ElementType::ObjectRef => 8,
        }
    }

    /// Number of scalar values that make up one element.
    ///
    /// Compound elements are flattened member by member, so a two-member
    /// compound contributes two values per element.
    pub fn values_per_element(&self) -> usize {
        match self {
            ElementType::Native(_) | ElementType::ObjectRef => 1,
            ElementType::Compound(fields) => fields.len(),
        }
    }

    /// The scalar type values are stored as, if every member agrees.
    pub fn base_native(&self) -> Option<NativeType> {
        match self {
            ElementType::Native(n) => Some(*n),
            ElementType::Compound(fields) => {
                let first = fields.first()?.native;
                fields.iter().all(|f| f.native == first).then_some(first)
            }
            ElementType::ObjectRef => None,
        }
    }

    /// Check whether this compound carries the given member names in order.
    pub fn has_members(&self, names: &[&str]) -> bool {
        match self {
            ElementType::Compound(fields) => {
                fields.len() == names.len()
                    && fields.iter().zip(names).all(|(f, n)| f.name == *n)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Native(n) => write!(f, "{}", n),
            ElementType::Compound(fields) => {
                write!(f, "compound{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.native)?;
                }
                write!(f, "}}")
            }
            ElementType::ObjectRef => write!(f, "object-ref"),
        }
    }
}

/// Value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Fixed-length string.
    Str(String),
    /// Scalar native integer.
    Int(i32),
    /// One-dimensional list of variable-length strings.
    StrList(Vec<String>),
}

impl AttrValue {
    /// Borrow the string, if this is a string attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer, if this is an integer attribute.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the list, if this is a string-list attribute.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttrValue::StrList(v) => Some(v),
            _ => None,
        }
    }
}

/// What kind of object sits at a child slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A dataset.
    Dataset,
    /// A group.
    Group,
    /// Anything else (named datatypes, soft links).
    Other,
}

/// An open handle to a group or dataset.
///
/// Handles are acquired by `create_*`/`open_*` calls and must be released
/// with [`Container::close`](crate::Container::close).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stored reference to an object, valid for the life of the container.
///
/// Unlike an [`ObjectId`] it holds no engine resource and can be written
/// into datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(pub u64);
