// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire core: byte regions, structs, tables, and the root envelope.

pub mod buffer;
pub mod builder;
pub mod envelope;
pub mod structs;
pub mod table;

pub use buffer::{BuildBuffer, ByteView, Scalar, MAX_BUFFER_SIZE};
pub use builder::{Builder, TableWriter, WireOffset};
pub use envelope::{
    get_root, root_table, size_prefixed_len, size_prefixed_root,
    size_prefixed_root_table, ROOT_OFFSET_SIZE, SIZE_PREFIX_SIZE,
};
pub use structs::{decode_struct, encode_struct, StructSlot, StructView, WireStruct};
pub use table::Table;
