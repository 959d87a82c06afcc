// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Controller input packet (the root table).
//!
//! | id | field | storage |
//! |----|-------|---------|
//! | 0 | buttons | inline [`Buttons`] |
//! | 1..=4 | left/right stick x/y | `u8` |
//! | 5 | front touch | offset to [`TouchPoint`] |
//! | 6 | back touch | offset to [`TouchPoint`] |
//! | 7 | motion | inline [`Motion`] |
//! | 8 | timestamp (µs) | `u64` |

use super::{Buttons, Motion, TouchPoint};
use crate::config::CodecConfig;
use crate::error::WireResult;
use crate::wire::{root_table, size_prefixed_root_table, Builder, Table, WireOffset};
use serde::{Deserialize, Serialize};

/// Field ids of the packet table.
pub mod field {
    pub const BUTTONS: u16 = 0;
    pub const LEFT_STICK_X: u16 = 1;
    pub const LEFT_STICK_Y: u16 = 2;
    pub const RIGHT_STICK_X: u16 = 3;
    pub const RIGHT_STICK_Y: u16 = 4;
    pub const FRONT_TOUCH: u16 = 5;
    pub const BACK_TOUCH: u16 = 6;
    pub const MOTION: u16 = 7;
    pub const TIMESTAMP_MICROS: u16 = 8;

    /// Number of fields the current schema defines.
    pub const COUNT: u16 = 9;

    pub const NAMES: [&str; COUNT as usize] = [
        "buttons",
        "left_stick_x",
        "left_stick_y",
        "right_stick_x",
        "right_stick_y",
        "front_touch",
        "back_touch",
        "motion",
        "timestamp_micros",
    ];
}

/// Owned packet contents.
///
/// `None` means the field is absent on the wire. Numeric fields have no
/// separate absent state: absent decodes as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Packet {
    pub buttons: Option<Buttons>,
    pub left_stick_x: u8,
    pub left_stick_y: u8,
    pub right_stick_x: u8,
    pub right_stick_y: u8,
    pub front_touch: Option<TouchPoint>,
    pub back_touch: Option<TouchPoint>,
    pub motion: Option<Motion>,
    pub timestamp_micros: u64,
}

impl Packet {
    /// Encode into a fresh buffer with the default configuration.
    pub fn encode(&self) -> WireResult<Vec<u8>> {
        let mut encoder = PacketEncoder::new();
        let bytes = encoder.encode(self)?;
        Ok(bytes.to_vec())
    }

    /// Decode a plain (not size-prefixed) buffer.
    pub fn decode(buf: &[u8]) -> WireResult<Self> {
        PacketView::from_bytes(buf)?.to_packet()
    }

    /// Decode a size-prefixed buffer.
    pub fn decode_size_prefixed(buf: &[u8]) -> WireResult<Self> {
        PacketView::from_size_prefixed(buf)?.to_packet()
    }

    /// Write this packet as a table into an open session and return the
    /// table's offset. The builder is left unfinished.
    pub fn write_into(&self, builder: &mut Builder) -> WireResult<WireOffset> {
        // Indirect records first: the table may only point backwards.
        let front = self
            .front_touch
            .as_ref()
            .map(|touch| builder.create_struct(touch))
            .transpose()?;
        let back = self
            .back_touch
            .as_ref()
            .map(|touch| builder.create_struct(touch))
            .transpose()?;

        // Widest first keeps inter-field padding down.
        let mut table = builder.start_table();
        table.add_scalar(field::TIMESTAMP_MICROS, self.timestamp_micros, 0)?;
        if let Some(back) = back {
            table.add_offset(field::BACK_TOUCH, back)?;
        }
        if let Some(front) = front {
            table.add_offset(field::FRONT_TOUCH, front)?;
        }
        if let Some(motion) = &self.motion {
            table.add_struct(field::MOTION, motion)?;
        }
        if let Some(buttons) = &self.buttons {
            table.add_struct(field::BUTTONS, buttons)?;
        }
        table.add_scalar(field::RIGHT_STICK_Y, self.right_stick_y, 0)?;
        table.add_scalar(field::RIGHT_STICK_X, self.right_stick_x, 0)?;
        table.add_scalar(field::LEFT_STICK_Y, self.left_stick_y, 0)?;
        table.add_scalar(field::LEFT_STICK_X, self.left_stick_x, 0)?;
        table.finish()
    }
}

/// Reusable encoding session for a stream of packets.
///
/// Each call to [`PacketEncoder::encode`] starts a new buffer in the same
/// allocation; the returned slice is valid until the next call.
#[derive(Debug, Default)]
pub struct PacketEncoder {
    builder: Builder,
    size_prefixed: bool,
}

impl PacketEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            builder: Builder::from_config(config),
            size_prefixed: false,
        }
    }

    /// Emit a leading `u32` length on every buffer.
    pub fn size_prefixed(mut self, enabled: bool) -> Self {
        self.size_prefixed = enabled;
        self
    }

    pub fn encode(&mut self, packet: &Packet) -> WireResult<&[u8]> {
        self.builder.reset();
        let root = packet.write_into(&mut self.builder)?;
        if self.size_prefixed {
            self.builder.finish_size_prefixed(root)
        } else {
            self.builder.finish(root)
        }
    }
}

/// Zero-copy accessor over an encoded packet.
///
/// Accessors read straight from the buffer. Absent fields return their
/// default; a malformed buffer is an error, never a default.
#[derive(Debug, Clone, Copy)]
pub struct PacketView<'a> {
    table: Table<'a>,
}

impl<'a> PacketView<'a> {
    pub fn from_bytes(buf: &'a [u8]) -> WireResult<Self> {
        root_table(buf).map(Self::from_table)
    }

    pub fn from_size_prefixed(buf: &'a [u8]) -> WireResult<Self> {
        size_prefixed_root_table(buf).map(Self::from_table)
    }

    /// Treat an already-resolved table as a packet.
    pub fn from_table(table: Table<'a>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> Table<'a> {
        self.table
    }

    pub fn buttons(&self) -> WireResult<Option<Buttons>> {
        self.table.get_struct(field::BUTTONS)
    }

    pub fn left_stick_x(&self) -> WireResult<u8> {
        self.table.get(field::LEFT_STICK_X, 0)
    }

    pub fn left_stick_y(&self) -> WireResult<u8> {
        self.table.get(field::LEFT_STICK_Y, 0)
    }

    pub fn right_stick_x(&self) -> WireResult<u8> {
        self.table.get(field::RIGHT_STICK_X, 0)
    }

    pub fn right_stick_y(&self) -> WireResult<u8> {
        self.table.get(field::RIGHT_STICK_Y, 0)
    }

    pub fn front_touch(&self) -> WireResult<Option<TouchPoint>> {
        self.table.get_indirect_struct(field::FRONT_TOUCH)
    }

    pub fn back_touch(&self) -> WireResult<Option<TouchPoint>> {
        self.table.get_indirect_struct(field::BACK_TOUCH)
    }

    pub fn motion(&self) -> WireResult<Option<Motion>> {
        self.table.get_struct(field::MOTION)
    }

    pub fn timestamp_micros(&self) -> WireResult<u64> {
        self.table.get(field::TIMESTAMP_MICROS, 0)
    }

    /// Whether field `id` is physically present in the buffer.
    pub fn is_present(&self, id: u16) -> WireResult<bool> {
        self.table.is_present(id)
    }

    /// Decode every field into an owned [`Packet`].
    pub fn to_packet(&self) -> WireResult<Packet> {
        Ok(Packet {
            buttons: self.buttons()?,
            left_stick_x: self.left_stick_x()?,
            left_stick_y: self.left_stick_y()?,
            right_stick_x: self.right_stick_x()?,
            right_stick_y: self.right_stick_y()?,
            front_touch: self.front_touch()?,
            back_touch: self.back_touch()?,
            motion: self.motion()?,
            timestamp_micros: self.timestamp_micros()?,
        })
    }

    pub fn layout(&self) -> WireResult<TableLayout> {
        let slots = (0..self.table.slot_count())
            .map(|id| self.table.raw_slot(id))
            .collect::<WireResult<Vec<_>>>()?;
        Ok(TableLayout {
            root: self.table.loc(),
            vtable: self.table.vtable_loc(),
            vtable_len: self.table.vtable_len(),
            object_len: self.table.object_len(),
            slots,
        })
    }
}

/// Physical layout of a decoded table, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLayout {
    /// Absolute offset of the table.
    pub root: usize,
    /// Absolute offset of its vtable.
    pub vtable: usize,
    pub vtable_len: u16,
    pub object_len: u16,
    /// Raw slot per field id the vtable covers; 0 is absent.
    pub slots: Vec<u16>,
}
