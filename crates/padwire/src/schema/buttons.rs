// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pad button bitmask.

use crate::wire::{StructSlot, StructView, WireStruct};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Pad buttons, in device order.
    ///
    /// Bits the current schema does not name are kept as-is when decoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[repr(transparent)]
    pub struct Buttons: u16 {
        const SELECT = 1 << 0;
        const START = 1 << 1;
        const UP = 1 << 2;
        const RIGHT = 1 << 3;
        const DOWN = 1 << 4;
        const LEFT = 1 << 5;
        const L_TRIGGER = 1 << 6;
        const R_TRIGGER = 1 << 7;
        const TRIANGLE = 1 << 8;
        const CIRCLE = 1 << 9;
        const CROSS = 1 << 10;
        const SQUARE = 1 << 11;
    }
}

impl Buttons {
    /// Any of the four d-pad directions.
    pub const DPAD: Self = Self::UP
        .union(Self::RIGHT)
        .union(Self::DOWN)
        .union(Self::LEFT);

    /// Triangle, circle, cross and square.
    pub const FACE: Self = Self::TRIANGLE
        .union(Self::CIRCLE)
        .union(Self::CROSS)
        .union(Self::SQUARE);
}

impl WireStruct for Buttons {
    const SIZE: usize = 2;
    const ALIGN: usize = 2;

    fn encode_fields(&self, slot: &mut StructSlot<'_>) {
        slot.put(0, self.bits());
    }

    fn decode_fields(view: &StructView<'_>) -> Self {
        Self::from_bits_retain(view.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{decode_struct, encode_struct, BuildBuffer, ByteView};

    #[test]
    fn test_device_bit_order() {
        let pressed = Buttons::from_bits_retain(0b0000_0101);
        assert_eq!(pressed, Buttons::SELECT | Buttons::UP);
        assert!(Buttons::DPAD.contains(Buttons::LEFT));
        assert!(!Buttons::FACE.intersects(Buttons::DPAD));
    }

    #[test]
    fn test_wire_bytes() {
        let mut buf = BuildBuffer::new(8, 64);
        encode_struct(&mut buf, &(Buttons::SQUARE | Buttons::SELECT)).unwrap();
        assert_eq!(buf.as_slice(), &[0x01, 0x08]);
    }

    #[test]
    fn test_unknown_bits_survive() {
        let bytes = [0x00, 0xF0];
        let decoded: Buttons = decode_struct(ByteView::new(&bytes), 0).unwrap();
        assert_eq!(decoded.bits(), 0xF000);
        assert!(decoded.iter_names().next().is_none());
    }
}
