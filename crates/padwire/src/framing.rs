// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream framing for size-prefixed packets.
//!
//! A byte stream carries packets back to back, each finished with a leading
//! `u32` length. [`PacketFramer`] accumulates whatever the transport hands
//! it and cuts complete frames off the front. Frames keep their prefix so
//! that every offset inside them stays aligned to the frame start.

use crate::config::CodecConfig;
use crate::error::WireError;
use crate::schema::{Packet, PacketView};
use crate::wire::{size_prefixed_root_table, SIZE_PREFIX_SIZE};
use bytes::{Buf, Bytes, BytesMut};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Wire(#[from] WireError),

    #[error("frame of {len} bytes exceeds limit of {max}")]
    Oversized { len: usize, max: usize },
}

/// One complete size-prefixed packet buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Prefix included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn view(&self) -> Result<PacketView<'_>, WireError> {
        PacketView::from_size_prefixed(&self.bytes)
    }

    pub fn packet(&self) -> Result<Packet, WireError> {
        self.view()?.to_packet()
    }
}

/// Incremental splitter for a stream of size-prefixed packets.
#[derive(Debug)]
pub struct PacketFramer {
    buf: BytesMut,
    max_frame: usize,
}

impl Default for PacketFramer {
    fn default() -> Self {
        Self::from_config(&CodecConfig::default())
    }
}

impl PacketFramer {
    /// `max_frame` bounds a frame's total size, prefix included.
    pub fn new(max_frame: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max_frame.min(4096)),
            max_frame,
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(config.max_frame_size)
    }

    /// Append bytes received from the transport.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes held that do not yet form a complete frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Cut the next complete frame, if one is buffered.
    ///
    /// A frame whose root table cannot be resolved is consumed and reported
    /// as [`FrameError::Wire`]; the stream stays usable. An oversized length
    /// leaves no way to resynchronise, so the buffered bytes are discarded.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        if self.buf.len() < SIZE_PREFIX_SIZE {
            return Ok(None);
        }
        let mut prefix = [0u8; SIZE_PREFIX_SIZE];
        prefix.copy_from_slice(&self.buf[..SIZE_PREFIX_SIZE]);
        let total = SIZE_PREFIX_SIZE + u32::from_le_bytes(prefix) as usize;

        if total > self.max_frame {
            log::debug!(
                "[PacketFramer] dropping {} buffered bytes: frame of {} exceeds {}",
                self.buf.len(),
                total,
                self.max_frame
            );
            self.buf.clear();
            return Err(FrameError::Oversized {
                len: total,
                max: self.max_frame,
            });
        }
        if self.buf.len() < total {
            self.buf.reserve(total - self.buf.len());
            return Ok(None);
        }

        let bytes = self.buf.split_to(total).freeze();
        if let Err(err) = size_prefixed_root_table(&bytes) {
            log::debug!("[PacketFramer] rejected {}-byte frame: {}", total, err);
            return Err(err.into());
        }
        log::trace!("[PacketFramer] frame of {} bytes, {} left", total, self.buf.remaining());
        Ok(Some(Frame { bytes }))
    }
}
