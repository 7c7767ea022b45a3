//! # Frame Store Benchmark
//!
//! The tick budget is 5 ms. Publishing a frame must cost nanoseconds,
//! not microseconds, regardless of frame size.
//!
//! This benchmark measures:
//! 1. Swap alone (index flip)
//! 2. Full write cycle: begin_write + clear + fill one layer + publish
//! 3. Edge detection + queue push for a busy controller

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pov_core::{ButtonMask, EdgeDetector, EventQueue, FrameStore, Geometry, Pixel};

fn bench_swap(c: &mut Criterion) {
    let store = FrameStore::new(Geometry::POV);
    c.bench_function("frame_store_swap", |b| {
        b.iter(|| {
            store.swap();
            black_box(store.frame_count());
        });
    });
}

fn bench_write_cycle(c: &mut Criterion) {
    let store = FrameStore::new(Geometry::POV);
    let geometry = store.geometry();
    let columns = i32::try_from(geometry.columns).unwrap_or(i32::MAX);
    let rows = i32::try_from(geometry.rows).unwrap_or(i32::MAX);

    c.bench_function("frame_store_write_cycle", |b| {
        b.iter(|| {
            if let Some(mut frame) = store.begin_write() {
                frame.clear();
                for col in 0..columns {
                    for row in 0..rows {
                        frame.set_pixel(col, row, 3, Pixel::GREEN);
                    }
                }
                frame.publish();
            }
        });
    });
}

fn bench_edge_to_queue(c: &mut Criterion) {
    let mut detector = EdgeDetector::new(16);
    let mut queue = EventQueue::new(32);
    let masks = [0x0000u32, 0xFFFF, 0x5555, 0xAAAA, 0x0F0F, 0xF0F0];
    let mut i = 0usize;

    c.bench_function("edge_detect_and_queue", |b| {
        b.iter(|| {
            queue.push_all(detector.sample(ButtonMask::new(masks[i % masks.len()])));
            i += 1;
            black_box(queue.drain().count());
        });
    });
}

criterion_group!(benches, bench_swap, bench_write_cycle, bench_edge_to_queue);
criterion_main!(benches);
