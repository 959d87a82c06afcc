// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # padwire - controller input packet codec
//!
//! Compact, zero-copy binary encoding for game-pad input packets: buttons,
//! analog sticks, two touch surfaces, 6-axis motion and a timestamp.
//!
//! ## Quick Start
//!
//! ```rust
//! use padwire::{Buttons, Packet, PacketView, TouchPoint};
//!
//! # fn main() -> padwire::WireResult<()> {
//! let packet = Packet {
//!     buttons: Some(Buttons::SELECT | Buttons::UP),
//!     left_stick_x: 128,
//!     front_touch: Some(TouchPoint::new(200, 1, -120, 340)),
//!     timestamp_micros: 1_700_000_000_000,
//!     ..Packet::default()
//! };
//! let bytes = packet.encode()?;
//!
//! let view = PacketView::from_bytes(&bytes)?;
//! assert_eq!(view.left_stick_x()?, 128);
//! assert_eq!(view.back_touch()?, None);
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! ```text
//! +--------------------------------------------------------------+
//! |  framing   PacketFramer: size-prefixed frames from a stream  |
//! +--------------------------------------------------------------+
//! |  schema    Packet / PacketView / PacketEncoder               |
//! |            Buttons, Motion, TouchPoint                       |
//! +--------------------------------------------------------------+
//! |  wire      envelope -> table (vtables, dedup) -> structs     |
//! |            -> buffer (LE scalars, alignment, bounds)         |
//! +--------------------------------------------------------------+
//! ```
//!
//! Buffers are built back to front in one owned region and read in place.
//! Fields can be appended to the schema without breaking older readers or
//! writers: ids a buffer does not carry decode as their default.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod framing;
pub mod schema;
pub mod wire;

pub use config::{CodecConfig, ConfigError};
pub use error::{WireError, WireResult};
pub use framing::{Frame, FrameError, PacketFramer};
pub use schema::{
    field, Buttons, Motion, Packet, PacketEncoder, PacketView, TableLayout, TouchPoint, Vector3,
};
pub use wire::{Builder, Table, WireOffset};
