// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked byte regions for the wire codec.
//!
//! [`ByteView`] is the fixed, read-only region a decoder works on. Offsets are
//! absolute from the first byte of the buffer.
//!
//! [`BuildBuffer`] is the encoder region. It grows *downward*: every position
//! it hands out is measured from the end of the buffer, which stays fixed
//! while new data is prepended in front of it. A position `p` ends up at
//! absolute offset `len - p` once the buffer is finished.

use crate::error::{WireError, WireResult};

/// Largest buffer the format can address (offsets are stored as `u32`/`i32`).
pub const MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// Fixed-width little-endian scalar.
pub trait Scalar: Copy + PartialEq + core::fmt::Debug {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Decode from the first `WIDTH` bytes of `bytes`.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Encode into the first `WIDTH` bytes of `dst`.
    fn write_le_slice(self, dst: &mut [u8]);
}

/// Generate `Scalar` for primitive numeric types
///
/// Each generated impl copies exactly `size_of::<T>()` bytes through
/// `from_le_bytes()` / `to_le_bytes()`; callers bounds-check first.
macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; core::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::WIDTH]);
                    <$ty>::from_le_bytes(raw)
                }

                #[inline]
                fn write_le_slice(self, dst: &mut [u8]) {
                    dst[..Self::WIDTH].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Natural alignment of a scalar: its own width, capped at 8.
#[inline]
pub const fn scalar_align(width: usize) -> usize {
    if width == 0 {
        1
    } else if width > 8 {
        8
    } else {
        width
    }
}

/// Padding needed so that `len` becomes a multiple of `align` (power of two).
#[inline]
pub const fn padding_for(len: usize, align: usize) -> usize {
    (!len).wrapping_add(1) & (align - 1)
}

/// Read-only view over a finished buffer.
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteView<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Fail with `OutOfBounds` unless `offset..offset + width` lies in the buffer.
    #[inline]
    pub fn check(&self, offset: usize, width: usize) -> WireResult<()> {
        match offset.checked_add(width) {
            Some(end) if end <= self.bytes.len() => Ok(()),
            _ => Err(WireError::OutOfBounds {
                offset,
                width,
                len: self.bytes.len(),
            }),
        }
    }

    /// Fail with `Misaligned` unless `offset` is a multiple of `align`.
    #[inline]
    pub fn check_aligned(&self, offset: usize, align: usize) -> WireResult<()> {
        if align > 1 && offset % align != 0 {
            return Err(WireError::Misaligned { offset, align });
        }
        Ok(())
    }

    /// Read a naturally aligned little-endian scalar at `offset`.
    #[inline]
    pub fn read<T: Scalar>(&self, offset: usize) -> WireResult<T> {
        self.check(offset, T::WIDTH)?;
        self.check_aligned(offset, scalar_align(T::WIDTH))?;
        Ok(T::from_le_slice(&self.bytes[offset..offset + T::WIDTH]))
    }

    /// Borrow `len` bytes at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> WireResult<&'a [u8]> {
        self.check(offset, len)?;
        Ok(&self.bytes[offset..offset + len])
    }
}

/// Growable encoder region, written back to front.
#[derive(Debug, Clone)]
pub struct BuildBuffer {
    data: Vec<u8>,
    /// Index of the first written byte; everything in `data[head..]` is live.
    head: usize,
    /// Largest alignment requested so far.
    min_align: usize,
    limit: usize,
}

impl BuildBuffer {
    /// Create a buffer with `initial_capacity` bytes that may grow up to `limit`.
    pub fn new(initial_capacity: usize, limit: usize) -> Self {
        let limit = limit.min(MAX_BUFFER_SIZE);
        let capacity = initial_capacity.min(limit);
        Self {
            data: vec![0u8; capacity],
            head: capacity,
            min_align: 1,
            limit,
        }
    }

    /// Bytes written so far; also the current write position.
    #[inline]
    pub fn used(&self) -> usize {
        self.data.len() - self.head
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Largest alignment any reservation asked for.
    pub fn min_align(&self) -> usize {
        self.min_align
    }

    /// Drop all written data, keeping the allocation.
    pub fn clear(&mut self) {
        self.head = self.data.len();
        self.min_align = 1;
    }

    /// Written bytes, front to back.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.head..]
    }

    /// Grow the region by `size` bytes after padding for `align`.
    ///
    /// The padding goes between the existing content and the new bytes, so
    /// the returned position (measured from the end) is a multiple of
    /// `align`. Reserved bytes are zeroed.
    pub fn reserve(&mut self, size: usize, align: usize) -> WireResult<usize> {
        self.prep(align, size)?;
        self.ensure_space(size)?;
        self.head -= size;
        self.data[self.head..self.head + size].fill(0);
        Ok(self.used())
    }

    /// Zero-pad so that writing `additional` more bytes ends on `align`.
    pub fn prep(&mut self, align: usize, additional: usize) -> WireResult<()> {
        debug_assert!(align.is_power_of_two());
        if align > self.min_align {
            self.min_align = align;
        }
        let pad = padding_for(self.used().saturating_add(additional), align);
        if pad > 0 {
            self.ensure_space(pad)?;
            self.head -= pad;
            self.data[self.head..self.head + pad].fill(0);
        }
        Ok(())
    }

    /// Prepend a naturally aligned scalar and return its position.
    pub fn push<T: Scalar>(&mut self, value: T) -> WireResult<usize> {
        let pos = self.reserve(T::WIDTH, scalar_align(T::WIDTH))?;
        self.write_scalar(pos, value)?;
        Ok(pos)
    }

    /// Overwrite the scalar at position `pos`.
    pub fn write_scalar<T: Scalar>(&mut self, pos: usize, value: T) -> WireResult<()> {
        let idx = self.index_of(pos, T::WIDTH)?;
        value.write_le_slice(&mut self.data[idx..idx + T::WIDTH]);
        Ok(())
    }

    /// Read back the scalar at position `pos`.
    pub fn read_scalar<T: Scalar>(&self, pos: usize) -> WireResult<T> {
        let idx = self.index_of(pos, T::WIDTH)?;
        Ok(T::from_le_slice(&self.data[idx..idx + T::WIDTH]))
    }

    /// Borrow `len` written bytes starting at position `pos`.
    pub fn bytes_at(&self, pos: usize, len: usize) -> WireResult<&[u8]> {
        let idx = self.index_of(pos, len)?;
        Ok(&self.data[idx..idx + len])
    }

    /// Mutably borrow `len` written bytes starting at position `pos`.
    pub fn bytes_at_mut(&mut self, pos: usize, len: usize) -> WireResult<&mut [u8]> {
        let idx = self.index_of(pos, len)?;
        Ok(&mut self.data[idx..idx + len])
    }

    fn index_of(&self, pos: usize, width: usize) -> WireResult<usize> {
        if pos > self.used() || width > pos {
            return Err(WireError::OutOfBounds {
                offset: pos,
                width,
                len: self.used(),
            });
        }
        Ok(self.data.len() - pos)
    }

    fn ensure_space(&mut self, want: usize) -> WireResult<()> {
        if want <= self.head {
            return Ok(());
        }
        let used = self.used();
        let needed = match used.checked_add(want) {
            Some(n) if n <= self.limit => n,
            _ => {
                return Err(WireError::AllocationFailure {
                    requested: used.saturating_add(want),
                    limit: self.limit,
                })
            }
        };

        let mut new_len = self.data.len().max(1);
        while new_len < needed {
            new_len = new_len.saturating_mul(2);
        }
        let new_len = new_len.min(self.limit);

        let mut grown = Vec::new();
        grown
            .try_reserve_exact(new_len)
            .map_err(|_| WireError::AllocationFailure {
                requested: new_len,
                limit: self.limit,
            })?;
        grown.resize(new_len - used, 0);
        grown.extend_from_slice(&self.data[self.head..]);

        log::trace!(
            "[BuildBuffer] grown {} -> {} bytes ({} used)",
            self.data.len(),
            new_len,
            used
        );
        self.head = new_len - used;
        self.data = grown;
        Ok(())
    }
}
