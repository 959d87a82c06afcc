// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use padwire::{Packet, PacketView};

fuzz_target!(|data: &[u8]| {
    // Plain envelope
    if let Ok(view) = PacketView::from_bytes(data) {
        let _ = view.layout();
        if let Ok(packet) = view.to_packet() {
            // Whatever decodes must re-encode to the same values.
            let bytes = packet.encode().expect("re-encode decoded packet");
            assert_eq!(Packet::decode(&bytes).ok(), Some(packet));
        }
    }

    // Size-prefixed envelope
    let _ = Packet::decode_size_prefixed(data);
});
