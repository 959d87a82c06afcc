// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Table decoding: vtable lookup and field resolution.
//!
//! ```text
//! vtable:  | vtable_len:u16 | object_len:u16 | slot0:u16 | slot1:u16 | ...
//!                                                 |
//! table:   | soffset:i32 | ... field bytes at table + slotN ...
//!            vtable = table - soffset
//! ```
//!
//! A field whose id lies past the end of the vtable, or whose slot is 0, is
//! absent and reads as its default. This is how buffers from older
//! producers stay readable after fields are appended to the schema.

use super::buffer::{ByteView, Scalar};
use super::structs::{decode_struct, WireStruct};
use crate::error::{WireError, WireResult};

/// Size of the vtable header (`vtable_len` + `object_len`).
pub const VTABLE_HEADER_SIZE: usize = 4;
/// Size of the table's leading signed vtable offset.
pub const SOFFSET_SIZE: usize = 4;
/// Size of a stored `u32` forward offset.
pub const UOFFSET_SIZE: usize = 4;

/// Byte offset of field `id`'s slot inside a vtable.
#[inline]
pub const fn vtable_entry(id: u16) -> usize {
    VTABLE_HEADER_SIZE + 2 * id as usize
}

/// Decoded table handle. Cheap to copy; borrows the buffer.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    buf: ByteView<'a>,
    loc: usize,
    vtable: usize,
    vtable_len: u16,
    object_len: u16,
}

impl<'a> Table<'a> {
    /// Resolve the table starting at absolute offset `loc`.
    pub fn at(buf: ByteView<'a>, loc: usize) -> WireResult<Self> {
        let soffset: i32 = buf.read(loc)?;
        let vtable = (loc as i64) - i64::from(soffset);
        if vtable < 0 || vtable as u64 >= buf.len() as u64 {
            return Err(WireError::TruncatedBuffer {
                needed: vtable.unsigned_abs() as usize + VTABLE_HEADER_SIZE,
                len: buf.len(),
            });
        }
        let vtable = vtable as usize;

        let vtable_len: u16 = buf.read(vtable)?;
        if (vtable_len as usize) < VTABLE_HEADER_SIZE {
            return Err(WireError::InvalidVtable {
                offset: vtable,
                reason: "size smaller than header",
            });
        }
        if vtable_len % 2 != 0 {
            return Err(WireError::InvalidVtable {
                offset: vtable,
                reason: "odd size",
            });
        }
        let object_len: u16 = buf.read(vtable + 2)?;
        if (object_len as usize) < SOFFSET_SIZE {
            return Err(WireError::InvalidVtable {
                offset: vtable,
                reason: "object smaller than its vtable offset",
            });
        }

        let vtable_end = vtable + vtable_len as usize;
        if vtable_end > buf.len() {
            return Err(WireError::TruncatedBuffer {
                needed: vtable_end,
                len: buf.len(),
            });
        }
        let object_end = loc + object_len as usize;
        if object_end > buf.len() {
            return Err(WireError::TruncatedBuffer {
                needed: object_end,
                len: buf.len(),
            });
        }

        Ok(Self {
            buf,
            loc,
            vtable,
            vtable_len,
            object_len,
        })
    }

    /// Absolute offset of the table.
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Absolute offset of the (possibly shared) vtable.
    pub fn vtable_loc(&self) -> usize {
        self.vtable
    }

    pub fn vtable_len(&self) -> u16 {
        self.vtable_len
    }

    pub fn object_len(&self) -> u16 {
        self.object_len
    }

    /// Number of field slots the producer wrote.
    pub fn slot_count(&self) -> u16 {
        (self.vtable_len - VTABLE_HEADER_SIZE as u16) / 2
    }

    pub fn buffer(&self) -> ByteView<'a> {
        self.buf
    }

    /// Raw vtable slot for field `id`; 0 when absent or out of range.
    pub fn raw_slot(&self, id: u16) -> WireResult<u16> {
        let entry = vtable_entry(id);
        if entry >= self.vtable_len as usize {
            return Ok(0);
        }
        self.buf.read(self.vtable + entry)
    }

    /// Absolute offset of field `id`'s `width` bytes, or `None` when absent.
    ///
    /// A present field must lie inside the table object the vtable declares.
    pub fn field_loc(&self, id: u16, width: usize) -> WireResult<Option<usize>> {
        let slot = match self.raw_slot(id)? {
            0 => return Ok(None),
            slot => slot as usize,
        };
        if slot < SOFFSET_SIZE {
            return Err(WireError::InvalidVtable {
                offset: self.vtable,
                reason: "slot overlaps the vtable offset",
            });
        }
        if slot + width > self.object_len as usize {
            return Err(WireError::InvalidVtable {
                offset: self.vtable,
                reason: "field extends past the table object",
            });
        }
        Ok(Some(self.loc + slot))
    }

    pub fn is_present(&self, id: u16) -> WireResult<bool> {
        Ok(self.field_loc(id, 1)?.is_some())
    }

    /// Scalar field `id`, or `default` when absent.
    pub fn get<T: Scalar>(&self, id: u16, default: T) -> WireResult<T> {
        match self.field_loc(id, T::WIDTH)? {
            Some(at) => self.buf.read(at),
            None => Ok(default),
        }
    }

    /// Inline struct field `id`.
    pub fn get_struct<S: WireStruct>(&self, id: u16) -> WireResult<Option<S>> {
        self.field_loc(id, S::SIZE)?
            .map(|at| decode_struct(self.buf, at))
            .transpose()
    }

    /// Follow the `u32` forward offset stored in field `id`.
    pub fn get_indirect(&self, id: u16) -> WireResult<Option<usize>> {
        let Some(at) = self.field_loc(id, UOFFSET_SIZE)? else {
            return Ok(None);
        };
        resolve_uoffset(self.buf, at).map(Some)
    }

    /// Struct reached through field `id`'s offset.
    pub fn get_indirect_struct<S: WireStruct>(&self, id: u16) -> WireResult<Option<S>> {
        self.get_indirect(id)?
            .map(|target| decode_struct(self.buf, target))
            .transpose()
    }

    /// Nested table reached through field `id`'s offset.
    pub fn get_table(&self, id: u16) -> WireResult<Option<Table<'a>>> {
        self.get_indirect(id)?
            .map(|target| Table::at(self.buf, target))
            .transpose()
    }
}

/// Read the `u32` at `at` and add it to `at`.
pub fn resolve_uoffset(buf: ByteView<'_>, at: usize) -> WireResult<usize> {
    let rel: u32 = buf.read(at)?;
    let target = at + rel as usize;
    if target >= buf.len() {
        return Err(WireError::TruncatedBuffer {
            needed: target + 1,
            len: buf.len(),
        });
    }
    Ok(target)
}
