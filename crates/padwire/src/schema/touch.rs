// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Touch report.

use crate::wire::{StructSlot, StructView, WireStruct};
use serde::{Deserialize, Serialize};

/// One contact on a touch surface.
///
/// Layout (6 bytes, align 2): pressure @0, id @1, x @2, y @4. Reached from
/// the packet through an offset rather than inlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TouchPoint {
    pub pressure: u8,
    pub id: u8,
    pub x: i16,
    pub y: i16,
}

impl TouchPoint {
    pub const fn new(pressure: u8, id: u8, x: i16, y: i16) -> Self {
        Self { pressure, id, x, y }
    }
}

impl WireStruct for TouchPoint {
    const SIZE: usize = 6;
    const ALIGN: usize = 2;

    fn encode_fields(&self, slot: &mut StructSlot<'_>) {
        slot.put(0, self.pressure);
        slot.put(1, self.id);
        slot.put(2, self.x);
        slot.put(4, self.y);
    }

    fn decode_fields(view: &StructView<'_>) -> Self {
        Self {
            pressure: view.get(0),
            id: view.get(1),
            x: view.get(2),
            y: view.get(4),
        }
    }
}
