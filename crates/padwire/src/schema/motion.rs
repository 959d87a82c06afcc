// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! 6-axis motion record.

use crate::wire::{StructSlot, StructView, WireStruct};
use serde::{Deserialize, Serialize};

/// Three signed 16-bit axis samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Vector3 {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// Accelerometer and gyroscope sample.
///
/// Layout (12 bytes, align 2): accel x/y/z at 0/2/4, gyro x/y/z at 6/8/10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Motion {
    pub accel: Vector3,
    pub gyro: Vector3,
}

impl Motion {
    pub const fn new(ax: i16, ay: i16, az: i16, gx: i16, gy: i16, gz: i16) -> Self {
        Self {
            accel: Vector3::new(ax, ay, az),
            gyro: Vector3::new(gx, gy, gz),
        }
    }
}

impl WireStruct for Motion {
    const SIZE: usize = 12;
    const ALIGN: usize = 2;

    fn encode_fields(&self, slot: &mut StructSlot<'_>) {
        slot.put(0, self.accel.x);
        slot.put(2, self.accel.y);
        slot.put(4, self.accel.z);
        slot.put(6, self.gyro.x);
        slot.put(8, self.gyro.y);
        slot.put(10, self.gyro.z);
    }

    fn decode_fields(view: &StructView<'_>) -> Self {
        Self::new(
            view.get(0),
            view.get(2),
            view.get(4),
            view.get(6),
            view.get(8),
            view.get(10),
        )
    }
}
