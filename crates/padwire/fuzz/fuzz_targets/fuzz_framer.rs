// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use padwire::PacketFramer;

fuzz_target!(|data: &[u8]| {
    let Some((&chunk, data)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).max(1);

    let mut framer = PacketFramer::new(4096);
    for piece in data.chunks(chunk) {
        framer.extend(piece);
        loop {
            match framer.next_frame() {
                Ok(Some(frame)) => {
                    let _ = frame.packet();
                }
                Ok(None) => break,
                Err(_) => continue,
            }
        }
    }
});
