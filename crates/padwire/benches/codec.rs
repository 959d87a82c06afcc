// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::missing_panics_doc)] // Benches panic on failure
#![allow(clippy::semicolon_if_nothing_returned)] // Benchmark code formatting

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use padwire::{Buttons, Motion, Packet, PacketEncoder, PacketFramer, PacketView, TouchPoint};

fn full_packet() -> Packet {
    Packet {
        buttons: Some(Buttons::SELECT | Buttons::UP),
        left_stick_x: 128,
        left_stick_y: 128,
        right_stick_x: 3,
        right_stick_y: 255,
        front_touch: Some(TouchPoint::new(200, 1, -120, 340)),
        back_touch: Some(TouchPoint::new(90, 2, 512, -512)),
        motion: Some(Motion::new(1, -1, 16384, 7, -7, 70)),
        timestamp_micros: 1_700_000_000_000,
    }
}

// ============================================================================
// Encode
// ============================================================================

/// Benchmark: PacketEncoder::encode, buffer reused across iterations
fn bench_encode(c: &mut Criterion) {
    let packet = full_packet();
    let mut encoder = PacketEncoder::new();
    c.bench_function("encode_full_packet", |b| {
        b.iter(|| {
            let bytes = encoder.encode(black_box(&packet)).unwrap();
            black_box(bytes.len());
        })
    });

    let sparse = Packet {
        left_stick_x: 1,
        ..Packet::default()
    };
    c.bench_function("encode_sparse_packet", |b| {
        b.iter(|| {
            let bytes = encoder.encode(black_box(&sparse)).unwrap();
            black_box(bytes.len());
        })
    });
}

// ============================================================================
// Decode
// ============================================================================

/// Benchmark: single field access through the view vs full decode
fn bench_decode(c: &mut Criterion) {
    let bytes = full_packet().encode().unwrap();

    c.bench_function("view_single_field", |b| {
        b.iter(|| {
            let view = PacketView::from_bytes(black_box(&bytes)).unwrap();
            black_box(view.timestamp_micros().unwrap());
        })
    });

    c.bench_function("decode_full_packet", |b| {
        b.iter(|| black_box(Packet::decode(black_box(&bytes)).unwrap()))
    });
}

// ============================================================================
// Framing
// ============================================================================

fn bench_framer(c: &mut Criterion) {
    let mut encoder = PacketEncoder::new().size_prefixed(true);
    let mut stream = Vec::new();
    for i in 0..64u64 {
        let mut packet = full_packet();
        packet.timestamp_micros += i;
        stream.extend_from_slice(encoder.encode(&packet).unwrap());
    }

    let mut group = c.benchmark_group("framer");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("split_64_frames", |b| {
        b.iter_batched(
            PacketFramer::default,
            |mut framer| {
                framer.extend(&stream);
                let mut count = 0;
                while let Some(frame) = framer.next_frame().unwrap() {
                    black_box(frame.len());
                    count += 1;
                }
                assert_eq!(count, 64);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_framer);
criterion_main!(benches);
