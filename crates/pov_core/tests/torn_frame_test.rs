//! Concurrency test for the frame store: no torn frames under any
//! interleaving of a hammering producer and several readers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pov_core::{FrameStore, Geometry, Pixel};

fn generation_pixel(generation: u32) -> Pixel {
    let [a, b, c, _] = generation.to_le_bytes();
    // Never black, so an untouched frame is distinguishable.
    Pixel::new(a, b, c | 1)
}

#[test]
fn test_no_torn_frames_under_contention() {
    let store = Arc::new(FrameStore::new(Geometry::new(48, 8, 4)));
    let stop = Arc::new(AtomicBool::new(false));

    let producer = {
        let store = Arc::clone(&store);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut generation = 0u32;
            let mut published = 0u64;
            while !stop.load(Ordering::Relaxed) {
                if let Some(mut frame) = store.begin_write() {
                    generation = generation.wrapping_add(1);
                    let color = generation_pixel(generation);
                    // Pixel by pixel on purpose: a reader must never see a mix.
                    let geometry = frame.geometry();
                    for col in 0..geometry.columns as i32 {
                        for layer in 0..geometry.layers as i32 {
                            for row in 0..geometry.rows as i32 {
                                frame.set_pixel(col, row, layer, color);
                            }
                        }
                    }
                    frame.publish();
                    published += 1;
                }
            }
            published
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = Arc::clone(&store);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut reads = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    let frame = store.read();
                    let first = frame.pixels()[0];
                    // Hold the frame a little so swaps land mid-read.
                    for pixel in frame.pixels() {
                        assert_eq!(*pixel, first, "torn frame observed");
                    }
                    thread::yield_now();
                    for pixel in frame.pixels() {
                        assert_eq!(*pixel, first, "frame changed while held");
                    }
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    let deadline = Instant::now() + Duration::from_millis(300);
    while Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    stop.store(true, Ordering::Relaxed);

    let published = producer.join().unwrap();
    let reads: u64 = readers.into_iter().map(|r| r.join().unwrap()).sum();

    assert!(published > 0);
    assert!(reads > 0);
    assert_eq!(store.frame_count(), published);
    assert_eq!(store.read_handle_count(), 0);
}

#[test]
fn test_reader_after_swap_sees_new_frame() {
    let store = FrameStore::new(Geometry::new(4, 4, 1));

    for generation in 1..=10u32 {
        let mut frame = store.begin_write().unwrap();
        frame.fill(generation_pixel(generation));
        frame.publish();

        let read = store.read();
        assert!(read.pixels().iter().all(|p| *p == generation_pixel(generation)));
    }
}
