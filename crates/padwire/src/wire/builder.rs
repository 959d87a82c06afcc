// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Table encoding.
//!
//! A [`Builder`] is one encoding session. Data is prepended back to front, so
//! anything a table refers to (standalone structs, nested tables) must be
//! written *before* the table is opened. Tables are written with a
//! [`TableWriter`], which records where each field landed and turns that into
//! a vtable when the table is closed.
//!
//! Identical vtables are written once per session and shared: the first
//! table to use a shape owns the bytes, later tables store a negative
//! offset pointing back at them.

use super::buffer::{BuildBuffer, Scalar};
use super::structs::{encode_struct, WireStruct};
use super::table::{vtable_entry, SOFFSET_SIZE, UOFFSET_SIZE, VTABLE_HEADER_SIZE};
use crate::config::CodecConfig;
use crate::error::{WireError, WireResult};

/// Position of something already written, measured from the end of the
/// buffer. Stays valid for the lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireOffset(usize);

impl WireOffset {
    pub fn value(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldLoc {
    pos: usize,
    id: u16,
}

/// Encoding session.
#[derive(Debug)]
pub struct Builder {
    pub(crate) buf: BuildBuffer,
    field_locs: Vec<FieldLoc>,
    /// Positions of every vtable emitted this session.
    vtables: Vec<usize>,
    vtable_scratch: Vec<u8>,
    dedup_vtables: bool,
    force_defaults: bool,
    pub(crate) finished: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::from_config(&CodecConfig::default())
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            buf: BuildBuffer::new(config.initial_capacity, config.max_buffer_size),
            field_locs: Vec::with_capacity(16),
            vtables: Vec::new(),
            vtable_scratch: Vec::with_capacity(32),
            dedup_vtables: config.dedup_vtables,
            force_defaults: config.force_defaults,
            finished: false,
        }
    }

    /// Start a new session, keeping the allocation.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.field_locs.clear();
        self.vtables.clear();
        self.finished = false;
    }

    /// Bytes written so far.
    pub fn used(&self) -> usize {
        self.buf.used()
    }

    /// Number of distinct vtables written this session.
    pub fn vtable_count(&self) -> usize {
        self.vtables.len()
    }

    /// Write a standalone struct, to be referenced through an offset field.
    pub fn create_struct<S: WireStruct>(&mut self, value: &S) -> WireResult<WireOffset> {
        self.ensure_open()?;
        encode_struct(&mut self.buf, value).map(WireOffset)
    }

    /// Open a table. Its fields must be added before anything else is
    /// written to this builder.
    ///
    /// On a finished session every write through the returned writer fails
    /// with [`WireError::SessionFinished`].
    pub fn start_table(&mut self) -> TableWriter<'_> {
        self.field_locs.clear();
        let start = self.buf.used();
        TableWriter {
            builder: self,
            start,
        }
    }

    /// Absolute offset of `offset` in the finished buffer.
    pub fn finished_address(&self, offset: WireOffset) -> Option<usize> {
        if !self.finished || offset.0 > self.buf.used() {
            return None;
        }
        Some(self.buf.used() - offset.0)
    }

    /// The finished buffer; empty until [`Builder::finish`] has run.
    pub fn finished_data(&self) -> &[u8] {
        if self.finished {
            self.buf.as_slice()
        } else {
            &[]
        }
    }

    pub(crate) fn ensure_open(&self) -> WireResult<()> {
        if self.finished {
            return Err(WireError::SessionFinished);
        }
        Ok(())
    }

    /// Prepend a `u32` forward offset to `target`; returns its position.
    pub(crate) fn push_uoffset(&mut self, target: WireOffset) -> WireResult<usize> {
        let pos = self.buf.reserve(UOFFSET_SIZE, UOFFSET_SIZE)?;
        let rel = pos
            .checked_sub(target.0)
            .filter(|rel| *rel >= UOFFSET_SIZE)
            .ok_or(WireError::OutOfBounds {
                offset: target.0,
                width: UOFFSET_SIZE,
                len: pos,
            })?;
        self.buf.write_scalar(pos, rel as u32)?;
        Ok(pos)
    }

    fn end_table(&mut self, start: usize) -> WireResult<WireOffset> {
        self.ensure_open()?;
        let object_pos = self.buf.push(0i32)?;
        let object_len = object_pos - start;
        let object_len = u16::try_from(object_len).map_err(|_| WireError::AllocationFailure {
            requested: object_len,
            limit: u16::MAX as usize,
        })?;

        let slot_count = self
            .field_locs
            .iter()
            .map(|loc| loc.id as usize + 1)
            .max()
            .unwrap_or(0);
        let vtable_len = VTABLE_HEADER_SIZE + 2 * slot_count;
        let vtable_len_u16 =
            u16::try_from(vtable_len).map_err(|_| WireError::AllocationFailure {
                requested: vtable_len,
                limit: u16::MAX as usize,
            })?;

        self.vtable_scratch.clear();
        self.vtable_scratch.resize(vtable_len, 0);
        self.vtable_scratch[0..2].copy_from_slice(&vtable_len_u16.to_le_bytes());
        self.vtable_scratch[2..4].copy_from_slice(&object_len.to_le_bytes());
        for loc in &self.field_locs {
            // Field bytes sit at table + (object_pos - pos).
            let slot = (object_pos - loc.pos) as u16;
            let entry = vtable_entry(loc.id);
            self.vtable_scratch[entry..entry + 2].copy_from_slice(&slot.to_le_bytes());
        }
        self.field_locs.clear();

        let vtable_pos = match self.find_vtable()? {
            Some(existing) => {
                log::trace!(
                    "[Builder] vtable cache hit ({} bytes, shared @{})",
                    vtable_len,
                    existing
                );
                existing
            }
            None => {
                let pos = self.buf.reserve(vtable_len, 2)?;
                self.buf
                    .bytes_at_mut(pos, vtable_len)?
                    .copy_from_slice(&self.vtable_scratch);
                self.vtables.push(pos);
                log::trace!("[Builder] vtable written ({} bytes @{})", vtable_len, pos);
                pos
            }
        };

        // table - vtable, in absolute terms: positive when the vtable was
        // written right below the table, negative when shared from earlier.
        let soffset = vtable_pos as i64 - object_pos as i64;
        let soffset = i32::try_from(soffset).map_err(|_| WireError::OutOfBounds {
            offset: vtable_pos,
            width: SOFFSET_SIZE,
            len: self.buf.used(),
        })?;
        self.buf.write_scalar(object_pos, soffset)?;
        Ok(WireOffset(object_pos))
    }

    fn find_vtable(&self) -> WireResult<Option<usize>> {
        if !self.dedup_vtables {
            return Ok(None);
        }
        let candidate = &self.vtable_scratch;
        for &pos in self.vtables.iter().rev() {
            let len: u16 = self.buf.read_scalar(pos)?;
            if len as usize != candidate.len() {
                continue;
            }
            if self.buf.bytes_at(pos, candidate.len())? == candidate.as_slice() {
                return Ok(Some(pos));
            }
        }
        Ok(None)
    }
}

/// Open table. Dropping it without calling [`TableWriter::finish`] leaves
/// the field bytes in the buffer with no table around them.
#[must_use = "a table must be finished to be referenced"]
pub struct TableWriter<'b> {
    builder: &'b mut Builder,
    start: usize,
}

impl TableWriter<'_> {
    /// Write scalar field `id` unless it equals `default` (and defaults are
    /// not forced).
    pub fn add_scalar<T: Scalar>(&mut self, id: u16, value: T, default: T) -> WireResult<()> {
        if value == default && !self.builder.force_defaults {
            return Ok(());
        }
        self.add_scalar_always(id, value)
    }

    /// Write scalar field `id` regardless of its value.
    pub fn add_scalar_always<T: Scalar>(&mut self, id: u16, value: T) -> WireResult<()> {
        self.builder.ensure_open()?;
        let pos = self.builder.buf.push(value)?;
        self.track(id, pos);
        Ok(())
    }

    /// Write struct field `id` inline.
    pub fn add_struct<S: WireStruct>(&mut self, id: u16, value: &S) -> WireResult<()> {
        self.builder.ensure_open()?;
        let pos = encode_struct(&mut self.builder.buf, value)?;
        self.track(id, pos);
        Ok(())
    }

    /// Write field `id` as an offset to something written earlier.
    pub fn add_offset(&mut self, id: u16, target: WireOffset) -> WireResult<()> {
        self.builder.ensure_open()?;
        let pos = self.builder.push_uoffset(target)?;
        self.track(id, pos);
        Ok(())
    }

    /// Close the table: write its vtable (or reuse one) and the leading
    /// vtable offset.
    pub fn finish(self) -> WireResult<WireOffset> {
        self.builder.end_table(self.start)
    }

    fn track(&mut self, id: u16, pos: usize) {
        self.builder.field_locs.retain(|loc| loc.id != id);
        self.builder.field_locs.push(FieldLoc { pos, id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::buffer::ByteView;
    use crate::wire::table::Table;

    fn finish(builder: &mut Builder, root: WireOffset) -> Vec<u8> {
        builder.finish(root).unwrap().to_vec()
    }

    #[test]
    fn test_empty_table() {
        let mut builder = Builder::new();
        let root = builder.start_table().finish().unwrap();
        let bytes = finish(&mut builder, root);

        let root_loc = crate::wire::envelope::get_root(&bytes).unwrap();
        let table = Table::at(ByteView::new(&bytes), root_loc).unwrap();
        assert_eq!(table.vtable_len(), 4);
        assert_eq!(table.object_len(), 4);
        assert_eq!(table.slot_count(), 0);
        assert_eq!(table.get::<u64>(0, 5).unwrap(), 5);
    }

    #[test]
    fn test_vtable_layout_matches_fields() {
        let mut builder = Builder::new();
        let mut table = builder.start_table();
        table.add_scalar(0, 0xAABBu16, 0).unwrap();
        table.add_scalar(2, 9u8, 0).unwrap();
        let root = table.finish().unwrap();
        let bytes = finish(&mut builder, root);

        let loc = crate::wire::envelope::get_root(&bytes).unwrap();
        let table = Table::at(ByteView::new(&bytes), loc).unwrap();
        assert_eq!(table.slot_count(), 3);
        assert_ne!(table.raw_slot(0).unwrap(), 0);
        assert_eq!(table.raw_slot(1).unwrap(), 0);
        assert_ne!(table.raw_slot(2).unwrap(), 0);
        assert_eq!(table.get::<u16>(0, 0).unwrap(), 0xAABB);
        assert_eq!(table.get::<u8>(2, 0).unwrap(), 9);
        // vtable written immediately below the table
        assert_eq!(table.vtable_loc() + table.vtable_len() as usize, table.loc());
    }

    #[test]
    fn test_default_values_are_omitted() {
        let mut builder = Builder::new();
        let mut table = builder.start_table();
        table.add_scalar(0, 0u32, 0).unwrap();
        table.add_scalar(1, 3u32, 0).unwrap();
        let root = table.finish().unwrap();
        let bytes = finish(&mut builder, root);

        let loc = crate::wire::envelope::get_root(&bytes).unwrap();
        let table = Table::at(ByteView::new(&bytes), loc).unwrap();
        assert_eq!(table.raw_slot(0).unwrap(), 0);
        assert_eq!(table.get::<u32>(0, 0).unwrap(), 0);
        assert_eq!(table.get::<u32>(1, 0).unwrap(), 3);
    }

    #[test]
    fn test_force_defaults_writes_them() {
        let config = CodecConfig {
            force_defaults: true,
            ..CodecConfig::default()
        };
        let mut builder = Builder::from_config(&config);
        let mut table = builder.start_table();
        table.add_scalar(0, 0u32, 0).unwrap();
        let root = table.finish().unwrap();
        let bytes = finish(&mut builder, root);

        let loc = crate::wire::envelope::get_root(&bytes).unwrap();
        let table = Table::at(ByteView::new(&bytes), loc).unwrap();
        assert_ne!(table.raw_slot(0).unwrap(), 0);
        assert_eq!(table.get::<u32>(0, 1).unwrap(), 0);
    }

    #[test]
    fn test_identical_vtables_are_shared() {
        let mut builder = Builder::new();

        let mut first = builder.start_table();
        first.add_scalar(0, 1u32, 0).unwrap();
        first.add_scalar(1, 2u8, 0).unwrap();
        let first = first.finish().unwrap();

        let mut second = builder.start_table();
        second.add_scalar(0, 10u32, 0).unwrap();
        second.add_scalar(1, 20u8, 0).unwrap();
        let second = second.finish().unwrap();

        assert_eq!(builder.vtable_count(), 1);
        let bytes = finish(&mut builder, second);
        let first_loc = builder.finished_address(first).unwrap();
        let second_loc = builder.finished_address(second).unwrap();

        let view = ByteView::new(&bytes);
        let a = Table::at(view, first_loc).unwrap();
        let b = Table::at(view, second_loc).unwrap();
        assert_eq!(a.vtable_loc(), b.vtable_loc());
        // the shared vtable lies after the second table: negative soffset
        assert!(view.read::<i32>(second_loc).unwrap() < 0);

        assert_eq!(a.get::<u32>(0, 0).unwrap(), 1);
        assert_eq!(a.get::<u8>(1, 0).unwrap(), 2);
        assert_eq!(b.get::<u32>(0, 0).unwrap(), 10);
        assert_eq!(b.get::<u8>(1, 0).unwrap(), 20);
    }

    #[test]
    fn test_dedup_disabled_writes_each_vtable() {
        let config = CodecConfig {
            dedup_vtables: false,
            ..CodecConfig::default()
        };
        let mut builder = Builder::from_config(&config);
        let mut first = builder.start_table();
        first.add_scalar(0, 1u32, 0).unwrap();
        let first = first.finish().unwrap();
        let mut second = builder.start_table();
        second.add_scalar(0, 2u32, 0).unwrap();
        let second = second.finish().unwrap();
        assert_eq!(builder.vtable_count(), 2);

        let bytes = finish(&mut builder, second);
        let view = ByteView::new(&bytes);
        let a = Table::at(view, builder.finished_address(first).unwrap()).unwrap();
        let b = Table::at(view, builder.finished_address(second).unwrap()).unwrap();
        assert_ne!(a.vtable_loc(), b.vtable_loc());
        assert_eq!(a.get::<u32>(0, 0).unwrap(), 1);
        assert_eq!(b.get::<u32>(0, 0).unwrap(), 2);
    }

    #[test]
    fn test_different_shapes_are_not_shared() {
        let mut builder = Builder::new();
        let mut first = builder.start_table();
        first.add_scalar(0, 1u32, 0).unwrap();
        first.finish().unwrap();
        let mut second = builder.start_table();
        second.add_scalar(1, 1u32, 0).unwrap();
        second.finish().unwrap();
        assert_eq!(builder.vtable_count(), 2);
    }

    #[test]
    fn test_nested_table_through_offset() {
        let mut builder = Builder::new();
        let mut inner = builder.start_table();
        inner.add_scalar(0, -7i16, 0).unwrap();
        let inner = inner.finish().unwrap();

        let mut outer = builder.start_table();
        outer.add_scalar(0, 1u8, 0).unwrap();
        outer.add_offset(1, inner).unwrap();
        let outer = outer.finish().unwrap();
        let bytes = finish(&mut builder, outer);

        let loc = crate::wire::envelope::get_root(&bytes).unwrap();
        let outer = Table::at(ByteView::new(&bytes), loc).unwrap();
        let inner = outer.get_table(1).unwrap().expect("nested table present");
        assert_eq!(inner.get::<i16>(0, 0).unwrap(), -7);
        assert!(outer.get_table(2).unwrap().is_none());
    }

    #[test]
    fn test_repeated_field_keeps_last_value() {
        let mut builder = Builder::new();
        let mut table = builder.start_table();
        table.add_scalar(0, 1u8, 0).unwrap();
        table.add_scalar(0, 2u8, 0).unwrap();
        let root = table.finish().unwrap();
        let bytes = finish(&mut builder, root);

        let loc = crate::wire::envelope::get_root(&bytes).unwrap();
        let table = Table::at(ByteView::new(&bytes), loc).unwrap();
        assert_eq!(table.get::<u8>(0, 0).unwrap(), 2);
    }

    #[test]
    fn test_allocation_failure_is_reported() {
        let config = CodecConfig {
            initial_capacity: 8,
            max_buffer_size: 16,
            ..CodecConfig::default()
        };
        let mut builder = Builder::from_config(&config);
        let mut table = builder.start_table();
        table.add_scalar(0, 1u64, 0).unwrap();
        table.add_scalar(1, 1u64, 0).unwrap();
        let err = table.add_scalar(2, 1u64, 0).unwrap_err();
        assert!(matches!(err, WireError::AllocationFailure { limit: 16, .. }));
    }

    #[test]
    fn test_finished_session_rejects_writes() {
        let mut builder = Builder::new();
        let mut table = builder.start_table();
        table.add_scalar(0, 3u16, 0).unwrap();
        let root = table.finish().unwrap();
        let bytes = finish(&mut builder, root);

        assert_eq!(
            builder.create_struct(&crate::schema::Buttons::START),
            Err(WireError::SessionFinished)
        );
        let mut table = builder.start_table();
        assert_eq!(table.add_scalar(1, 9u8, 0), Err(WireError::SessionFinished));
        assert_eq!(table.finish(), Err(WireError::SessionFinished));
        assert_eq!(builder.finish(root).unwrap_err(), WireError::SessionFinished);

        // The finished buffer is untouched.
        assert_eq!(builder.finished_data(), bytes.as_slice());
        let table = crate::wire::envelope::root_table(builder.finished_data()).unwrap();
        assert_eq!(table.get::<u16>(0, 0).unwrap(), 3);

        builder.reset();
        assert!(builder.create_struct(&crate::schema::Buttons::START).is_ok());
    }
}
