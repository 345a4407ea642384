//! Numeric and char array datasets.

use mat73_container::{AttrValue, Container, ElementType, ObjectId};

use super::{class_attrs, Encoder};
use crate::class::ClassTag;
use crate::complex::{complex_type, interleave_buffers};
use crate::dims::permute_dims;
use crate::error::{Error, Result};
use crate::metadata::{INT_DECODE_ATTR, INT_DECODE_CODE_UNITS};
use crate::variable::{Payload, Variable};

impl<'a, C: Container> Encoder<'a, C> {
    /// Write a numeric array as a dataset of its class's native type.
    ///
    /// Complex values become a `real`/`imag` compound at the same width.
    pub(super) fn write_numeric(
        &mut self,
        scope: ObjectId,
        scope_path: &str,
        name: &str,
        var: &Variable,
        class: ClassTag,
        global: bool,
    ) -> Result<()> {
        let native = class
            .native_type()
            .ok_or_else(|| Error::unsupported_class(var.name(), class.name()))?;
        let shape = permute_dims(var.dims());
        let attrs = class_attrs(class, global);

        match var.payload() {
            Payload::Complex { re, im } if var.is_complex() => {
                let packed = interleave_buffers(re, im).ok_or_else(|| {
                    Error::payload_mismatch(var.name(), "real and imaginary parts do not pair up")
                })?;
                let element_type = complex_type(native);
                self.write_dataset(scope, scope_path, name, &element_type, &shape, &packed, &attrs)
            }
            Payload::Real(data) if !var.is_complex() => {
                let element_type = ElementType::Native(native);
                self.write_dataset(scope, scope_path, name, &element_type, &shape, data, &attrs)
            }
            _ => Err(Error::payload_mismatch(
                var.name(),
                "complex flag disagrees with payload",
            )),
        }
    }

    /// Write a char array as 16- or 32-bit code units.
    pub(super) fn write_chars(
        &mut self,
        scope: ObjectId,
        scope_path: &str,
        name: &str,
        var: &Variable,
        global: bool,
    ) -> Result<()> {
        let storage = var
            .storage_type()
            .ok_or_else(|| Error::payload_mismatch(var.name(), "char array without storage type"))?;
        let Payload::Real(units) = var.payload() else {
            return Err(Error::payload_mismatch(var.name(), "expected a code-unit buffer"));
        };

        let native = storage
            .char_dataset_type()
            .ok_or_else(|| Error::UnsupportedStorage {
                name: var.name().to_string(),
                storage: storage.to_string(),
            })?;
        let element_type = ElementType::Native(native);
        let shape = permute_dims(var.dims());
        let mut attrs = class_attrs(ClassTag::Char, global);
        attrs.insert(1, (INT_DECODE_ATTR, AttrValue::Int(INT_DECODE_CODE_UNITS)));

        self.write_dataset(scope, scope_path, name, &element_type, &shape, units, &attrs)
    }
}

#[cfg(test)]
mod tests {
    use mat73_container::{Buffer, MemContainer, NativeType, Op};

    use super::*;
    use crate::metadata::CLASS_ATTR;
    use crate::pool::RefPool;
    use crate::storage::StorageType;

    fn encode(c: &mut MemContainer, var: &Variable) -> Result<()> {
        let mut pool = RefPool::new();
        let root = c.root();
        let result = Encoder::new(c, &mut pool).write_top(root, "/", var, false);
        pool.release(c)?;
        result
    }

    fn open(c: &mut MemContainer, path: &str) -> ObjectId {
        let root = c.root();
        c.open_dataset(root, path).unwrap()
    }

    #[test]
    fn test_real_dataset_shape_is_permuted() {
        let mut c = MemContainer::new();
        let v = Variable::numeric("a", ClassTag::Double, vec![2, 3, 4], vec![1.0f64; 24]);
        encode(&mut c, &v).unwrap();

        let ds = open(&mut c, "/a");
        assert_eq!(c.dataset_shape(ds).unwrap(), vec![4, 3, 2]);
        assert_eq!(c.dataset_type(ds).unwrap(), ElementType::Native(NativeType::Float64));
        assert_eq!(
            c.read_attribute(ds, CLASS_ATTR).unwrap(),
            Some(AttrValue::Str("double".into()))
        );
        assert_eq!(c.read_attribute(ds, INT_DECODE_ATTR).unwrap(), None);
        c.close(ds).unwrap();
        assert_eq!(c.open_handles(), 0);
    }

    #[test]
    fn test_real_payload_written_unmodified() {
        let mut c = MemContainer::new();
        let v = Variable::numeric("m", ClassTag::Int32, vec![2, 2], vec![1i32, 2, 3, 4]);
        encode(&mut c, &v).unwrap();

        let ds = open(&mut c, "m");
        assert_eq!(c.read_dataset(ds).unwrap(), Buffer::from(vec![1i32, 2, 3, 4]));
        c.close(ds).unwrap();
    }

    #[test]
    fn test_storage_widened_to_class_type() {
        let mut c = MemContainer::new();
        let v = Variable::numeric("w", ClassTag::Double, vec![1, 2], vec![7u8, 9]);
        encode(&mut c, &v).unwrap();

        let ds = open(&mut c, "w");
        assert_eq!(c.read_dataset(ds).unwrap(), Buffer::from(vec![7.0f64, 9.0]));
        c.close(ds).unwrap();
    }

    #[test]
    fn test_complex_is_interleaved_compound() {
        let mut c = MemContainer::new();
        let v = Variable::complex(
            "z",
            ClassTag::Single,
            vec![3, 1],
            vec![1.0f32, 2.0, 3.0],
            vec![-1.0f32, -2.0, -3.0],
        );
        encode(&mut c, &v).unwrap();

        let ds = open(&mut c, "z");
        assert_eq!(c.dataset_shape(ds).unwrap(), vec![1, 3]);
        assert_eq!(c.dataset_type(ds).unwrap(), complex_type(NativeType::Float32));
        assert_eq!(
            c.read_dataset(ds).unwrap(),
            Buffer::from(vec![1.0f32, -1.0, 2.0, -2.0, 3.0, -3.0])
        );
        c.close(ds).unwrap();
    }

    #[test]
    fn test_char_tags_and_width() {
        let mut c = MemContainer::new();
        let v = Variable::chars("s", vec![1, 2], StorageType::Utf8, vec![b'h', b'i']);
        encode(&mut c, &v).unwrap();

        let ds = open(&mut c, "s");
        assert_eq!(c.dataset_type(ds).unwrap(), ElementType::Native(NativeType::UInt16));
        assert_eq!(
            c.read_attribute(ds, CLASS_ATTR).unwrap(),
            Some(AttrValue::Str("char".into()))
        );
        assert_eq!(
            c.read_attribute(ds, INT_DECODE_ATTR).unwrap(),
            Some(AttrValue::Int(2))
        );
        assert_eq!(c.read_dataset(ds).unwrap(), Buffer::from(vec![104u16, 105]));
        c.close(ds).unwrap();
    }

    #[test]
    fn test_char_utf32_width() {
        let mut c = MemContainer::new();
        let v = Variable::chars("u", vec![1, 1], StorageType::Utf32, vec![0x1F600u32]);
        encode(&mut c, &v).unwrap();

        let ds = open(&mut c, "u");
        assert_eq!(c.dataset_type(ds).unwrap(), ElementType::Native(NativeType::UInt32));
        c.close(ds).unwrap();
    }

    #[test]
    fn test_char_wide_storage_writes_nothing() {
        let mut c = MemContainer::new();
        let v = Variable::chars("w", vec![1, 1], StorageType::UInt64, vec![0x1F600u64]);

        let err = encode(&mut c, &v).unwrap_err();
        assert!(matches!(err, Error::UnsupportedStorage { .. }));
        assert!(!c.exists("/w"));
        assert_eq!(c.open_handles(), 0);
    }

    #[test]
    fn test_failed_write_leaves_nothing() {
        let mut c = MemContainer::new();
        c.inject_fault(Op::WriteDataset, 0);
        let v = Variable::numeric("a", ClassTag::Double, vec![1, 1], vec![1.0f64]);

        let err = encode(&mut c, &v).unwrap_err();
        assert!(matches!(err, Error::Container { ref object, .. } if object == "/a"));
        assert!(!c.exists("/a"));
        assert_eq!(c.open_handles(), 0);
    }

    #[test]
    fn test_failed_second_attribute_leaves_nothing() {
        let mut c = MemContainer::new();
        c.inject_fault(Op::CreateAttribute, 1);
        let v = Variable::string("s", "x");

        let err = encode(&mut c, &v).unwrap_err();
        match err {
            Error::Container { object, .. } => assert_eq!(object, "/s@MATLAB_int_decode"),
            other => panic!("Expected Container, got {:?}", other),
        }
        assert!(!c.exists("/s"));
        assert_eq!(c.open_handles(), 0);
    }
}
