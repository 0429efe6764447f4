use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lz_ring::{Match, MatchOptions, MatchableRingBuffer, RingBuffer};

const INPUT_LEN: usize = 256 * 1024;
const WINDOW: usize = 64 * 1024;
const LOOKAHEAD: usize = 273;

/// Text-like input with plenty of repetition at varying distances.
fn input() -> Vec<u8> {
    const WORDS: &[&str] = &[
        "ring", "buffer", "seekback", "window", "match", "distance", "length", "copy", "the",
        "of", "and", "history", "lookahead", "chunk", "hash", "chain",
    ];

    let mut state = 0x2545_F491_u32;
    let mut data = Vec::with_capacity(INPUT_LEN);
    while data.len() < INPUT_LEN {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        data.extend_from_slice(WORDS[state as usize % WORDS.len()].as_bytes());
        data.push(if state % 7 == 0 { b'\n' } else { b' ' });
    }
    data.truncate(INPUT_LEN);
    data
}

fn bench_write_read(c: &mut Criterion) {
    let data = input();
    let mut group = c.benchmark_group("ring_buffer_write_read");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for chunk_size in [64, 4096] {
        group.bench_with_input(
            BenchmarkId::new("chunk", chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                let mut out = vec![0; chunk_size];
                b.iter(|| {
                    let mut ring = RingBuffer::create_empty(WINDOW).unwrap();
                    for chunk in data.chunks(chunk_size) {
                        ring.write(black_box(chunk));
                        black_box(ring.read(&mut out));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_copy_from_seekback(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer_copy_from_seekback");
    group.throughput(Throughput::Bytes(WINDOW as u64));

    for distance in [1, 7, 4096] {
        group.bench_with_input(
            BenchmarkId::new("distance", distance),
            &distance,
            |b, &distance| {
                let seed = input();
                b.iter(|| {
                    let mut ring = RingBuffer::create_empty(2 * WINDOW).unwrap();
                    ring.write(&seed[..distance]);
                    let copied = ring
                        .copy_from_seekback(black_box(distance), WINDOW)
                        .unwrap();
                    black_box(copied)
                });
            },
        );
    }

    group.finish();
}

/// Greedy parse of the input, as an encoder would drive the buffer.
fn bench_find_copy_in_seekback(c: &mut Criterion) {
    let data = input();
    let mut group = c.benchmark_group("matchable_find_copy_in_seekback");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for preset in [0, 6, 9] {
        group.bench_with_input(BenchmarkId::new("preset", preset), &preset, |b, &preset| {
            let options = MatchOptions::with_preset(preset);
            b.iter(|| {
                let mut window = MatchableRingBuffer::with_options(WINDOW, options).unwrap();
                let mut pending = data.as_slice();
                let mut literal = [0];
                let mut matches = 0;

                while !pending.is_empty() || !window.is_empty() {
                    let room = LOOKAHEAD.saturating_sub(window.used_space());
                    let written = window.write(&pending[..room.min(pending.len())]);
                    pending = &pending[written..];

                    match window.find_copy_in_seekback(LOOKAHEAD, 3) {
                        Some(Match { length, .. }) => {
                            window.discard(length).unwrap();
                            matches += 1;
                        }
                        None => {
                            window.read(&mut literal);
                        }
                    }
                }
                black_box(matches)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_write_read,
    bench_copy_from_seekback,
    bench_find_copy_in_seekback
);
criterion_main!(benches);
