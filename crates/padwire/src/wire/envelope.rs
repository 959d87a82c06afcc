// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Root envelope.
//!
//! ```text
//! plain:          | root:u32 | ... body ... |
//! size-prefixed:  | size:u32 | root:u32 | ... body ... |
//! ```
//!
//! `root` is the offset of the root table from the root field's own
//! position, which for a plain buffer is the buffer start. `size` counts the
//! bytes after the prefix.

use super::buffer::ByteView;
use super::builder::{Builder, WireOffset};
use super::table::{resolve_uoffset, Table, UOFFSET_SIZE};
use crate::error::{WireError, WireResult};

/// Size of the leading root offset.
pub const ROOT_OFFSET_SIZE: usize = UOFFSET_SIZE;
/// Size of the optional length prefix.
pub const SIZE_PREFIX_SIZE: usize = 4;

impl Builder {
    /// Finish the session with `root` as the root table.
    pub fn finish(&mut self, root: WireOffset) -> WireResult<&[u8]> {
        self.finish_with(root, false)
    }

    /// Finish the session with a leading `u32` length ahead of the root offset.
    pub fn finish_size_prefixed(&mut self, root: WireOffset) -> WireResult<&[u8]> {
        self.finish_with(root, true)
    }

    fn finish_with(&mut self, root: WireOffset, size_prefixed: bool) -> WireResult<&[u8]> {
        self.ensure_open()?;
        let header = if size_prefixed {
            ROOT_OFFSET_SIZE + SIZE_PREFIX_SIZE
        } else {
            ROOT_OFFSET_SIZE
        };
        // Pad the front so the total length is a multiple of the largest
        // alignment used: offsets from the start then keep their alignment.
        let align = self.buf.min_align().max(UOFFSET_SIZE);
        self.buf.prep(align, header)?;
        self.push_uoffset(root)?;
        if size_prefixed {
            let body = self.buf.used() as u32;
            self.buf.push(body)?;
        }
        self.finished = true;

        log::debug!(
            "[Builder] finished {} bytes (align {}, {} vtables, size_prefixed={})",
            self.buf.used(),
            self.buf.min_align(),
            self.vtable_count(),
            size_prefixed
        );
        Ok(self.buf.as_slice())
    }
}

/// Absolute offset of the root table of a plain buffer.
pub fn get_root(buf: &[u8]) -> WireResult<usize> {
    if buf.len() < ROOT_OFFSET_SIZE {
        return Err(WireError::TruncatedBuffer {
            needed: ROOT_OFFSET_SIZE,
            len: buf.len(),
        });
    }
    resolve_uoffset(ByteView::new(buf), 0)
}

/// Root table of a plain buffer.
pub fn root_table(buf: &[u8]) -> WireResult<Table<'_>> {
    let loc = get_root(buf)?;
    Table::at(ByteView::new(buf), loc)
}

/// Declared length of a size-prefixed buffer, prefix included.
///
/// Trailing bytes past the declared length are allowed and ignored.
pub fn size_prefixed_len(buf: &[u8]) -> WireResult<usize> {
    if buf.len() < SIZE_PREFIX_SIZE {
        return Err(WireError::TruncatedBuffer {
            needed: SIZE_PREFIX_SIZE,
            len: buf.len(),
        });
    }
    let body: u32 = ByteView::new(buf).read(0)?;
    let total = SIZE_PREFIX_SIZE + body as usize;
    if total > buf.len() {
        return Err(WireError::TruncatedBuffer {
            needed: total,
            len: buf.len(),
        });
    }
    Ok(total)
}

/// Absolute offset of the root table of a size-prefixed buffer.
pub fn size_prefixed_root(buf: &[u8]) -> WireResult<usize> {
    let total = size_prefixed_len(buf)?;
    let header = SIZE_PREFIX_SIZE + ROOT_OFFSET_SIZE;
    if total < header {
        return Err(WireError::TruncatedBuffer {
            needed: header,
            len: total,
        });
    }
    resolve_uoffset(ByteView::new(&buf[..total]), SIZE_PREFIX_SIZE)
}

/// Root table of a size-prefixed buffer, bounded by its declared length.
pub fn size_prefixed_root_table(buf: &[u8]) -> WireResult<Table<'_>> {
    let loc = size_prefixed_root(buf)?;
    let total = size_prefixed_len(buf)?;
    Table::at(ByteView::new(&buf[..total]), loc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_field_table(builder: &mut Builder) -> WireOffset {
        let mut table = builder.start_table();
        table.add_scalar(0, 0x0102_0304_0506_0708u64, 0).unwrap();
        table.finish().unwrap()
    }

    #[test]
    fn test_get_root_points_at_table() {
        let mut builder = Builder::new();
        let root = one_field_table(&mut builder);
        let bytes = builder.finish(root).unwrap().to_vec();

        let loc = get_root(&bytes).unwrap();
        assert_eq!(Some(loc), builder.finished_address(root));
        let table = root_table(&bytes).unwrap();
        assert_eq!(table.get::<u64>(0, 0).unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn test_finished_length_is_aligned() {
        let mut builder = Builder::new();
        let root = one_field_table(&mut builder);
        let bytes = builder.finish(root).unwrap();
        assert_eq!(bytes.len() % 8, 0);
    }

    #[test]
    fn test_short_buffer_is_truncated() {
        for len in 0..4 {
            let bytes = vec![0u8; len];
            assert_eq!(
                get_root(&bytes),
                Err(WireError::TruncatedBuffer { needed: 4, len })
            );
        }
    }

    #[test]
    fn test_get_root_past_end() {
        let bytes = 64u32.to_le_bytes();
        assert!(matches!(
            get_root(&bytes),
            Err(WireError::TruncatedBuffer { .. })
        ));
    }

    #[test]
    fn test_size_prefixed_roundtrip() {
        let mut builder = Builder::new();
        let root = one_field_table(&mut builder);
        let bytes = builder.finish_size_prefixed(root).unwrap().to_vec();

        let declared = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert_eq!(declared + SIZE_PREFIX_SIZE, bytes.len());
        assert_eq!(size_prefixed_len(&bytes).unwrap(), bytes.len());
        assert_eq!(bytes.len() % 8, 0);

        let table = size_prefixed_root_table(&bytes).unwrap();
        assert_eq!(table.get::<u64>(0, 0).unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn test_size_prefix_shorter_than_header() {
        // Declared body of 0 bytes leaves no room for the root offset.
        let bytes = [0u8, 0, 0, 0, 8, 0, 0, 0];
        assert_eq!(size_prefixed_len(&bytes).unwrap(), 4);
        assert_eq!(
            size_prefixed_root(&bytes),
            Err(WireError::TruncatedBuffer { needed: 8, len: 4 })
        );
        assert!(size_prefixed_root_table(&bytes).is_err());
    }

    #[test]
    fn test_size_prefix_larger_than_buffer() {
        let mut builder = Builder::new();
        let root = one_field_table(&mut builder);
        let bytes = builder.finish_size_prefixed(root).unwrap().to_vec();

        let cut = &bytes[..bytes.len() - 1];
        assert_eq!(
            size_prefixed_root_table(cut).unwrap_err(),
            WireError::TruncatedBuffer {
                needed: bytes.len(),
                len: bytes.len() - 1
            }
        );
    }
}
