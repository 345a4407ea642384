//! The in-memory MATLAB array value.
//!
//! A [`Variable`] is the unit of encoding and decoding: a named array with
//! a class, a storage type, MATLAB-ordered dimensions and a payload.
//!
//! # Payload Layout
//!
//! Numeric and char payloads are flat buffers in column-major order, one
//! value per element. Complex payloads are two such buffers. Struct
//! payloads are a flat list of child variables, field-major within each
//! element and repeated per element, so element `e`'s field `f` sits at
//! `e * field_count + f`.
//!
//! # Example
//!
//! ```
//! use mat73_rs::{ClassTag, Variable};
//!
//! let x = Variable::numeric("x", ClassTag::Double, vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]);
//! let name = Variable::string("name", "probe");
//! let s = Variable::scalar_struct("cfg", vec![x, name]);
//!
//! assert_eq!(s.field_count(), Some(2));
//! assert!(s.validate().is_ok());
//! ```

use std::collections::HashSet;

use mat73_container::Buffer;

use crate::class::ClassTag;
use crate::dims::element_count;
use crate::error::{Error, Result};
use crate::storage::StorageType;

/// Values held by a [`Variable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No values; a decoded header.
    Empty,

    /// Real numeric or char values.
    Real(Buffer),

    /// Split real and imaginary parts.
    Complex {
        /// Real parts.
        re: Buffer,
        /// Imaginary parts.
        im: Buffer,
    },

    /// Struct fields, field-major within each element.
    Fields(Vec<Variable>),
}

/// A named MATLAB array value.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable or field name.
    name: String,

    /// MATLAB class; unset when a decoded class attribute was unreadable.
    class: Option<ClassTag>,

    /// Element encoding; `None` for structs.
    storage: Option<StorageType>,

    /// Dimensions in MATLAB order.
    dims: Vec<usize>,

    /// Whether values are complex.
    complex: bool,

    /// Whether the variable was saved as global.
    global: bool,

    /// The values.
    payload: Payload,
}

impl Variable {
    /// Create a real numeric variable.
    ///
    /// The storage type is taken from the buffer, so a `double` array may
    /// be built from `u8` values; they are widened when written.
    pub fn numeric(
        name: impl Into<String>,
        class: ClassTag,
        dims: Vec<usize>,
        data: impl Into<Buffer>,
    ) -> Self {
        let data = data.into();
        Variable {
            name: name.into(),
            class: Some(class),
            storage: data.native_type().map(StorageType::from_native),
            dims,
            complex: false,
            global: false,
            payload: Payload::Real(data),
        }
    }

    /// Create a complex numeric variable from split parts.
    pub fn complex(
        name: impl Into<String>,
        class: ClassTag,
        dims: Vec<usize>,
        re: impl Into<Buffer>,
        im: impl Into<Buffer>,
    ) -> Self {
        let re = re.into();
        Variable {
            name: name.into(),
            class: Some(class),
            storage: re.native_type().map(StorageType::from_native),
            dims,
            complex: true,
            global: false,
            payload: Payload::Complex { re, im: im.into() },
        }
    }

    /// Create a char array from code units in the given storage.
    pub fn chars(
        name: impl Into<String>,
        dims: Vec<usize>,
        storage: StorageType,
        units: impl Into<Buffer>,
    ) -> Self {
        Variable {
            name: name.into(),
            class: Some(ClassTag::Char),
            storage: Some(storage),
            dims,
            complex: false,
            global: false,
            payload: Payload::Real(units.into()),
        }
    }

    /// Create a `1 x n` char row vector holding `text` as UTF-16.
    pub fn string(name: impl Into<String>, text: &str) -> Self {
        let units: Vec<u16> = text.encode_utf16().collect();
        let dims = vec![1, units.len()];
        Self::chars(name, dims, StorageType::Utf16, units)
    }

    /// Create a struct array.
    ///
    /// `fields` is the flattened payload: for each element, one variable
    /// per field, in the same field order for every element.
    pub fn structure(name: impl Into<String>, dims: Vec<usize>, fields: Vec<Variable>) -> Self {
        Variable {
            name: name.into(),
            class: Some(ClassTag::Struct),
            storage: None,
            dims,
            complex: false,
            global: false,
            payload: Payload::Fields(fields),
        }
    }

    /// Create a `1 x 1` struct.
    pub fn scalar_struct(name: impl Into<String>, fields: Vec<Variable>) -> Self {
        Self::structure(name, vec![1, 1], fields)
    }

    /// Create a header-only variable, as produced by decoding.
    pub(crate) fn header(name: String, class: Option<ClassTag>, dims: Vec<usize>) -> Self {
        Variable {
            name,
            class,
            storage: None,
            dims,
            complex: false,
            global: false,
            payload: Payload::Empty,
        }
    }

    /// Mark the variable as global.
    pub fn with_global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// Override the storage type.
    pub fn with_storage(mut self, storage: StorageType) -> Self {
        self.storage = Some(storage);
        self
    }

    pub(crate) fn set_complex(&mut self, complex: bool) {
        self.complex = complex;
    }

    pub(crate) fn set_storage(&mut self, storage: Option<StorageType>) {
        self.storage = storage;
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MATLAB class, if known.
    pub fn class(&self) -> Option<ClassTag> {
        self.class
    }

    /// Element storage type, if any.
    pub fn storage_type(&self) -> Option<StorageType> {
        self.storage
    }

    /// Dimensions in MATLAB (column-major) order.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements (product of the dimensions).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the product overflows.
    pub fn element_count(&self) -> Result<usize> {
        element_count(&self.dims).ok_or_else(|| self.invalid_dims())
    }

    /// Whether the values are complex.
    pub fn is_complex(&self) -> bool {
        self.complex
    }

    /// Whether the variable was saved as global.
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// The payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Real (or char) values, if present.
    pub fn real_data(&self) -> Option<&Buffer> {
        match &self.payload {
            Payload::Real(b) => Some(b),
            Payload::Complex { re, .. } => Some(re),
            _ => None,
        }
    }

    /// Imaginary values, if complex.
    pub fn imag_data(&self) -> Option<&Buffer> {
        match &self.payload {
            Payload::Complex { im, .. } => Some(im),
            _ => None,
        }
    }

    /// The flattened struct payload, if this is a struct.
    pub fn fields(&self) -> Option<&[Variable]> {
        match &self.payload {
            Payload::Fields(f) => Some(f),
            _ => None,
        }
    }

    /// Number of fields per struct element.
    ///
    /// `None` if this is not a struct, has no elements, has more elements
    /// than a `usize` can count, or the payload does not split evenly.
    pub fn field_count(&self) -> Option<usize> {
        let fields = self.fields()?;
        let elements = self.element_count().ok()?;
        if elements == 0 || fields.len() % elements != 0 {
            return None;
        }
        Some(fields.len() / elements)
    }

    /// Field names in order, taken from the first element.
    pub fn field_names(&self) -> Vec<&str> {
        match (self.fields(), self.field_count()) {
            (Some(fields), Some(count)) => fields[..count].iter().map(|f| f.name()).collect(),
            _ => Vec::new(),
        }
    }

    /// The value of field `name` for element `element` (zero-based,
    /// column-major).
    pub fn field(&self, element: usize, name: &str) -> Option<&Variable> {
        let fields = self.fields()?;
        let count = self.field_count()?;
        let start = element.checked_mul(count)?;
        fields.get(start..start + count)?.iter().find(|f| f.name == name)
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Check that the variable, and every variable nested in it, can be
    /// encoded.
    ///
    /// # Errors
    ///
    /// Returns the first precondition violation found: an empty or invalid
    /// name, a missing or unsupported class, bad or overflowing dimensions,
    /// a char storage type without code units, a payload that does not fit
    /// the header, or a struct payload that does not split into whole
    /// elements with one consistent field layout.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;

        let class = self.class.ok_or_else(|| Error::MissingClass {
            name: self.name.clone(),
        })?;

        if self.dims.is_empty() || self.dims.contains(&0) {
            return Err(self.invalid_dims());
        }
        let count = self.element_count()?;

        match class {
            ClassTag::Struct => self.validate_struct(count),
            ClassTag::Char => self.validate_chars(count),
            c if c.is_numeric() => self.validate_numeric(count),
            c => Err(Error::unsupported_class(&self.name, c.name())),
        }
    }

    fn invalid_dims(&self) -> Error {
        Error::InvalidDimensions {
            name: self.name.clone(),
            dims: self.dims.clone(),
        }
    }

    fn validate_numeric(&self, count: usize) -> Result<()> {
        match (&self.payload, self.complex) {
            (Payload::Real(data), false) => self.check_buffer(data, count),
            (Payload::Complex { re, im }, true) => {
                self.check_buffer(re, count)?;
                self.check_buffer(im, count)?;
                if re.native_type() != im.native_type() {
                    return Err(Error::payload_mismatch(
                        &self.name,
                        "real and imaginary parts have different element types",
                    ));
                }
                Ok(())
            }
            (Payload::Complex { .. }, false) | (Payload::Real(_), true) => Err(
                Error::payload_mismatch(&self.name, "complex flag disagrees with payload"),
            ),
            _ => Err(Error::payload_mismatch(&self.name, "expected a numeric buffer")),
        }
    }

    fn validate_chars(&self, count: usize) -> Result<()> {
        if let Some(storage) = self.storage {
            if storage.char_dataset_type().is_none() {
                return Err(Error::UnsupportedStorage {
                    name: self.name.clone(),
                    storage: storage.to_string(),
                });
            }
        }
        match &self.payload {
            Payload::Real(units) if !self.complex => self.check_buffer(units, count),
            _ => Err(Error::payload_mismatch(&self.name, "expected a real code-unit buffer")),
        }
    }

    fn check_buffer(&self, data: &Buffer, count: usize) -> Result<()> {
        let storage = self.storage.ok_or_else(|| {
            Error::payload_mismatch(&self.name, "no storage type for array values")
        })?;
        let found = data.native_type().ok_or_else(|| {
            Error::payload_mismatch(&self.name, "object references are not array values")
        })?;
        if storage.native_type() != found {
            return Err(Error::StorageMismatch {
                name: self.name.clone(),
                declared: storage.to_string(),
                found: found.to_string(),
            });
        }
        if data.len() != count {
            return Err(Error::payload_mismatch(
                &self.name,
                format!("{} values for {} elements", data.len(), count),
            ));
        }
        Ok(())
    }

    fn validate_struct(&self, elements: usize) -> Result<()> {
        let fields = self
            .fields()
            .ok_or_else(|| Error::payload_mismatch(&self.name, "expected struct fields"))?;

        if fields.len() % elements != 0 {
            return Err(Error::FieldCountMismatch {
                name: self.name.clone(),
                fields: fields.len(),
                elements,
            });
        }
        let count = fields.len() / elements;
        if count == 0 {
            return Ok(());
        }

        let mut seen = HashSet::with_capacity(count);
        for field in &fields[..count] {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::DuplicateName {
                    name: field.name.clone(),
                    scope: self.name.clone(),
                });
            }
        }

        for element in 1..elements {
            let row = &fields[element * count..(element + 1) * count];
            for (expected, found) in fields[..count].iter().zip(row) {
                if expected.name != found.name {
                    return Err(Error::FieldLayoutMismatch {
                        name: self.name.clone(),
                        element,
                        expected: expected.name.clone(),
                        found: found.name.clone(),
                    });
                }
            }
        }

        fields.iter().try_for_each(Variable::validate)
    }
}

/// Check a variable or field name.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    if name.contains('/') || name.contains('\0') {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(feature = "ndarray")]
mod array {
    use mat73_container::Element;
    use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn, ShapeBuilder};

    use super::{Payload, Variable};
    use crate::class::ClassTag;
    use crate::error::{Error, Result};

    impl Variable {
        /// Build a real numeric variable from an n-dimensional array.
        ///
        /// The array's axes become MATLAB dimensions in the same order and
        /// the values are flattened column-major. Zero-dimensional arrays
        /// become `1 x 1`, one-dimensional arrays become `1 x n` rows.
        ///
        /// # Example
        ///
        /// ```
        /// use mat73_rs::{ClassTag, Variable};
        /// use ndarray::array;
        ///
        /// let v = Variable::from_array("m", &array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        /// assert_eq!(v.dims(), &[2, 3]);
        /// assert_eq!(v.class(), Some(ClassTag::Double));
        /// ```
        pub fn from_array<T, S, D>(name: impl Into<String>, array: &ArrayBase<S, D>) -> Self
        where
            T: Element,
            S: Data<Elem = T>,
            D: Dimension,
        {
            let dims = match array.shape() {
                [] => vec![1, 1],
                [n] => vec![1, *n],
                shape => shape.to_vec(),
            };
            let values: Vec<T> = array.t().iter().copied().collect();
            Variable::numeric(name, ClassTag::from_native(T::NATIVE), dims, T::wrap(values))
        }

        /// Rebuild the real values as an array with MATLAB's dimensions.
        ///
        /// # Errors
        ///
        /// Returns [`Error::PayloadMismatch`] if there is no real buffer, and
        /// [`Error::StorageMismatch`] if it does not hold `T`.
        pub fn to_array<T: Element>(&self) -> Result<ArrayD<T>> {
            let data = match self.payload() {
                Payload::Real(b) | Payload::Complex { re: b, .. } => b,
                _ => return Err(Error::payload_mismatch(self.name(), "no real values")),
            };
            let values = data.as_slice::<T>().ok_or_else(|| Error::StorageMismatch {
                name: self.name().to_string(),
                declared: T::NATIVE.to_string(),
                found: data
                    .native_type()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "object-ref".to_string()),
            })?;

            ArrayD::from_shape_vec(IxDyn(self.dims()).f(), values.to_vec())
                .map_err(|e| Error::payload_mismatch(self.name(), format!("Shape error: {}", e)))
        }
    }
}
