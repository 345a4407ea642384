//! Complex number packing.
//!
//! MATLAB keeps complex arrays as two split buffers, one real and one
//! imaginary. The container stores them as a two-member `real`/`imag`
//! compound, which flattens to alternating values.

use mat73_container::{Buffer, ElementType, NativeType};

/// Compound member names, in storage order.
pub const COMPLEX_MEMBERS: [&str; 2] = ["real", "imag"];

/// The `real`/`imag` compound element type at the given width.
pub fn complex_type(native: NativeType) -> ElementType {
    ElementType::packed(&COMPLEX_MEMBERS, native)
}

/// Interleave split parts into `re, im, re, im, ...`.
///
/// Both slices are expected to have the same length; extra values in the
/// longer one are ignored.
pub fn interleave<T: Copy>(re: &[T], im: &[T]) -> Vec<T> {
    let mut packed = Vec::with_capacity(re.len() * 2);
    for (&r, &i) in re.iter().zip(im) {
        packed.push(r);
        packed.push(i);
    }
    packed
}

/// Split alternating values back into real and imaginary parts.
///
/// A trailing unpaired value is dropped.
pub fn deinterleave<T: Copy>(packed: &[T]) -> (Vec<T>, Vec<T>) {
    let pairs = packed.chunks_exact(2);
    let mut re = Vec::with_capacity(pairs.len());
    let mut im = Vec::with_capacity(pairs.len());
    for pair in pairs {
        re.push(pair[0]);
        im.push(pair[1]);
    }
    (re, im)
}

/// Interleave two buffers of the same native type and length.
///
/// Returns `None` if the buffers disagree in type or length, or hold
/// object references.
pub fn interleave_buffers(re: &Buffer, im: &Buffer) -> Option<Buffer> {
    if re.len() != im.len() {
        return None;
    }
    let packed = match (re, im) {
        (Buffer::Int8(r), Buffer::Int8(i)) => Buffer::Int8(interleave(r, i)),
        (Buffer::UInt8(r), Buffer::UInt8(i)) => Buffer::UInt8(interleave(r, i)),
        (Buffer::Int16(r), Buffer::Int16(i)) => Buffer::Int16(interleave(r, i)),
        (Buffer::UInt16(r), Buffer::UInt16(i)) => Buffer::UInt16(interleave(r, i)),
        (Buffer::Int32(r), Buffer::Int32(i)) => Buffer::Int32(interleave(r, i)),
        (Buffer::UInt32(r), Buffer::UInt32(i)) => Buffer::UInt32(interleave(r, i)),
        (Buffer::Int64(r), Buffer::Int64(i)) => Buffer::Int64(interleave(r, i)),
        (Buffer::UInt64(r), Buffer::UInt64(i)) => Buffer::UInt64(interleave(r, i)),
        (Buffer::Float32(r), Buffer::Float32(i)) => Buffer::Float32(interleave(r, i)),
        (Buffer::Float64(r), Buffer::Float64(i)) => Buffer::Float64(interleave(r, i)),
        _ => return None,
    };
    Some(packed)
}

/// Split an interleaved buffer into real and imaginary buffers.
///
/// Returns `None` for reference buffers and odd-length buffers.
pub fn deinterleave_buffer(packed: &Buffer) -> Option<(Buffer, Buffer)> {
    if packed.len() % 2 != 0 {
        return None;
    }
    macro_rules! split {
        ($variant:ident, $values:expr) => {{
            let (re, im) = deinterleave($values);
            (Buffer::$variant(re), Buffer::$variant(im))
        }};
    }
    let parts = match packed {
        Buffer::Int8(v) => split!(Int8, v),
        Buffer::UInt8(v) => split!(UInt8, v),
        Buffer::Int16(v) => split!(Int16, v),
        Buffer::UInt16(v) => split!(UInt16, v),
        Buffer::Int32(v) => split!(Int32, v),
        Buffer::UInt32(v) => split!(UInt32, v),
        Buffer::Int64(v) => split!(Int64, v),
        Buffer::UInt64(v) => split!(UInt64, v),
        Buffer::Float32(v) => split!(Float32, v),
        Buffer::Float64(v) => split!(Float64, v),
        Buffer::Refs(_) => return None,
    };
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_interleave() {
        let packed = interleave(&[1.0, 2.0, 3.0], &[-1.0, -2.0, -3.0]);
        assert_eq!(packed, vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    }

    #[test]
    fn test_deinterleave() {
        let (re, im) = deinterleave(&[0.5f32, 1.5, 2.5, 3.5]);
        assert_relative_eq!(re[1], 2.5);
        assert_relative_eq!(im[0], 1.5);
    }

    #[test]
    fn test_complex_type_layout() {
        let ty = complex_type(NativeType::Int32);
        assert!(ty.has_members(&COMPLEX_MEMBERS));
        assert_eq!(ty.size_bytes(), 8);
    }

    #[test]
    fn test_interleave_buffers_rejects_mixed() {
        let re = Buffer::from(vec![1.0f64]);
        let im = Buffer::from(vec![1.0f32]);
        assert!(interleave_buffers(&re, &im).is_none());

        let short = Buffer::from(vec![1.0f64, 2.0]);
        assert!(interleave_buffers(&re, &short).is_none());
    }

    #[test]
    fn test_deinterleave_buffer_odd_length() {
        assert!(deinterleave_buffer(&Buffer::from(vec![1u8, 2, 3])).is_none());
    }

    proptest! {
        #[test]
        fn packing_roundtrip_f64(
            pairs in prop::collection::vec((any::<f64>(), any::<f64>()), 0..64)
        ) {
            let (re, im): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let packed =
                interleave_buffers(&Buffer::from(re.clone()), &Buffer::from(im.clone())).unwrap();
            prop_assert_eq!(packed.len(), re.len() * 2);
            let (r, i) = deinterleave_buffer(&packed).unwrap();
            // Compare bit patterns so NaN payloads count as equal.
            let bits = |b: &Buffer| {
                b.as_slice::<f64>().unwrap().iter().map(|x| x.to_bits()).collect::<Vec<_>>()
            };
            prop_assert_eq!(bits(&r), re.iter().map(|x| x.to_bits()).collect::<Vec<_>>());
            prop_assert_eq!(bits(&i), im.iter().map(|x| x.to_bits()).collect::<Vec<_>>());
        }

        #[test]
        fn packing_roundtrip_i16(
            pairs in prop::collection::vec((any::<i16>(), any::<i16>()), 0..64)
        ) {
            let (re, im): (Vec<i16>, Vec<i16>) = pairs.into_iter().unzip();
            let packed =
                interleave_buffers(&Buffer::from(re.clone()), &Buffer::from(im.clone())).unwrap();
            let (r, i) = deinterleave_buffer(&packed).unwrap();
            prop_assert_eq!(r, Buffer::from(re));
            prop_assert_eq!(i, Buffer::from(im));
        }

        #[test]
        fn packing_roundtrip_u64(
            pairs in prop::collection::vec((any::<u64>(), any::<u64>()), 0..64)
        ) {
            let (re, im): (Vec<u64>, Vec<u64>) = pairs.into_iter().unzip();
            let packed = interleave(&re, &im);
            let (r, i) = deinterleave(&packed);
            prop_assert_eq!(r, re);
            prop_assert_eq!(i, im);
        }

        #[test]
        fn packing_roundtrip_u8(pairs in prop::collection::vec((any::<u8>(), any::<u8>()), 0..64)) {
            let (re, im): (Vec<u8>, Vec<u8>) = pairs.into_iter().unzip();
            let (r, i) = deinterleave(&interleave(&re, &im));
            prop_assert_eq!(r, re);
            prop_assert_eq!(i, im);
        }
    }
}
