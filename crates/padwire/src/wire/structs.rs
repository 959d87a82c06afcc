// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-layout records ("structs").
//!
//! A struct has a fixed size, fixed field offsets and no vtable. It is
//! embedded directly in whatever references it: inline in a table slot, or
//! standalone behind one offset indirection.

use super::buffer::{scalar_align, BuildBuffer, ByteView, Scalar};
use crate::error::WireResult;

/// Fixed-layout record codec.
///
/// Implementors write every field at its declared offset in canonical order
/// and read them back from a [`StructView`] whose extent has already been
/// validated.
pub trait WireStruct: Copy {
    /// Total encoded size in bytes, padding included.
    const SIZE: usize;
    /// Alignment of the record: the width of its widest member.
    const ALIGN: usize;

    fn encode_fields(&self, slot: &mut StructSlot<'_>);

    fn decode_fields(view: &StructView<'_>) -> Self;
}

/// Write window over the `SIZE` bytes reserved for one struct.
pub struct StructSlot<'a> {
    bytes: &'a mut [u8],
    cursor: usize,
}

impl<'a> StructSlot<'a> {
    /// `bytes` must come zeroed from [`BuildBuffer::reserve`].
    fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Write `value` at the field offset `offset`.
    ///
    /// Fields must come in canonical order and sit on their natural alignment.
    #[inline]
    pub fn put<T: Scalar>(&mut self, offset: usize, value: T) {
        debug_assert!(offset >= self.cursor, "struct fields out of order");
        debug_assert_eq!(offset % scalar_align(T::WIDTH), 0, "misaligned struct field");
        value.write_le_slice(&mut self.bytes[offset..offset + T::WIDTH]);
        self.cursor = offset + T::WIDTH;
    }
}

/// Read window over one struct's bytes.
#[derive(Debug, Clone, Copy)]
pub struct StructView<'a> {
    bytes: &'a [u8],
}

impl<'a> StructView<'a> {
    /// Validate extent and alignment once; field reads then go straight to
    /// `base + fieldOffset`.
    pub fn new<S: WireStruct>(buf: ByteView<'a>, base: usize) -> WireResult<Self> {
        let bytes = buf.slice(base, S::SIZE)?;
        buf.check_aligned(base, S::ALIGN)?;
        Ok(Self { bytes })
    }

    #[inline]
    pub fn get<T: Scalar>(&self, offset: usize) -> T {
        T::from_le_slice(&self.bytes[offset..offset + T::WIDTH])
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Prepend `value` to the encoder region and return its position.
pub fn encode_struct<S: WireStruct>(buf: &mut BuildBuffer, value: &S) -> WireResult<usize> {
    let pos = buf.reserve(S::SIZE, S::ALIGN)?;
    let bytes = buf.bytes_at_mut(pos, S::SIZE)?;
    value.encode_fields(&mut StructSlot::new(bytes));
    Ok(pos)
}

/// Decode the struct starting at absolute offset `base`.
pub fn decode_struct<S: WireStruct>(buf: ByteView<'_>, base: usize) -> WireResult<S> {
    let view = StructView::new::<S>(buf, base)?;
    Ok(S::decode_fields(&view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WireError;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Sample {
        tag: u8,
        value: u32,
    }

    impl WireStruct for Sample {
        const SIZE: usize = 8;
        const ALIGN: usize = 4;

        fn encode_fields(&self, slot: &mut StructSlot<'_>) {
            slot.put(0, self.tag);
            slot.put(4, self.value);
        }

        fn decode_fields(view: &StructView<'_>) -> Self {
            Self {
                tag: view.get(0),
                value: view.get(4),
            }
        }
    }

    #[test]
    fn test_struct_layout_is_fixed() {
        let mut buf = BuildBuffer::new(16, 64);
        let sample = Sample {
            tag: 0x7F,
            value: 0xDEAD_BEEF,
        };
        let pos = encode_struct(&mut buf, &sample).unwrap();
        assert_eq!(pos, 8);
        assert_eq!(
            buf.as_slice(),
            &[0x7F, 0, 0, 0, 0xEF, 0xBE, 0xAD, 0xDE]
        );

        let decoded: Sample = decode_struct(ByteView::new(buf.as_slice()), 0).unwrap();
        assert_eq!(decoded, sample);
    }

    #[test]
    fn test_struct_padding_is_zeroed_on_reuse() {
        let mut buf = BuildBuffer::new(16, 64);
        buf.push(u64::MAX).unwrap();
        buf.clear();

        encode_struct(&mut buf, &Sample { tag: 1, value: 2 }).unwrap();
        assert_eq!(buf.as_slice(), &[1, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn test_struct_respects_alignment() {
        let mut buf = BuildBuffer::new(16, 64);
        buf.push(1u8).unwrap();
        let pos = encode_struct(
            &mut buf,
            &Sample {
                tag: 1,
                value: 2,
            },
        )
        .unwrap();
        assert_eq!(pos % 4, 0);
        assert_eq!(buf.used(), 12);
    }

    #[test]
    fn test_struct_decode_truncated() {
        let bytes = [0u8; 6];
        let err = decode_struct::<Sample>(ByteView::new(&bytes), 0).unwrap_err();
        assert_eq!(
            err,
            WireError::OutOfBounds {
                offset: 0,
                width: 8,
                len: 6
            }
        );
    }

    #[test]
    fn test_struct_decode_misaligned() {
        let bytes = [0u8; 16];
        let err = decode_struct::<Sample>(ByteView::new(&bytes), 2).unwrap_err();
        assert_eq!(err, WireError::Misaligned { offset: 2, align: 4 });
    }
}
