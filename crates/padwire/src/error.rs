// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the padwire codec.

use thiserror::Error;

/// Result type for wire encode/decode operations.
pub type WireResult<T> = core::result::Result<T, WireError>;

/// Wire-level failure.
///
/// Every variant is local and synchronous: the codec never retries and never
/// substitutes a default for a malformed buffer. An absent field is not an
/// error and never produces one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    /// Read or write of `width` bytes at `offset` runs past the buffer.
    #[error("out of bounds: {width} bytes at offset {offset} (buffer is {len} bytes)")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// Scalar access at an offset that is not a multiple of its alignment.
    #[error("misaligned access: offset {offset} is not aligned to {align}")]
    Misaligned { offset: usize, align: usize },

    /// Buffer shorter than its header, or an offset resolving past the end.
    #[error("truncated buffer: need {needed} bytes, have {len}")]
    TruncatedBuffer { needed: usize, len: usize },

    /// Vtable header is malformed.
    #[error("invalid vtable at offset {offset}: {reason}")]
    InvalidVtable { offset: usize, reason: &'static str },

    /// Encoder buffer could not grow to the requested size.
    #[error("allocation failure: cannot grow encoder buffer to {requested} bytes (limit {limit})")]
    AllocationFailure { requested: usize, limit: usize },

    /// Write to a session whose buffer has already been finished.
    #[error("encoder session already finished; reset it before writing")]
    SessionFinished,
}
