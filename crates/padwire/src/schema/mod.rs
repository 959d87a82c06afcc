// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packet schema: the records carried by one controller input packet.

pub mod buttons;
pub mod motion;
pub mod packet;
pub mod touch;

pub use buttons::Buttons;
pub use motion::{Motion, Vector3};
pub use packet::{field, Packet, PacketEncoder, PacketView, TableLayout};
pub use touch::TouchPoint;
