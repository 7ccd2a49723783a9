//! Benchmarks for the `svngate` crate.
//!
//! Run with:
//! - `cargo bench`

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use svngate::{Decoder, ProxyGate, SvnItem, serialize};

/// A batch of plausible client traffic: read commands with nested report
/// framing and a couple of string-heavy write attempts.
fn sample_stream(messages: usize) -> Vec<u8> {
    let mut wire = Vec::new();
    for i in 0..messages {
        let tree = match i % 4 {
            0 => SvnItem::List(vec![
                SvnItem::Word("get-file".to_string()),
                SvnItem::List(vec![
                    SvnItem::String(format!("trunk/src/file-{i}.rs").into_bytes()),
                    SvnItem::List(vec![SvnItem::Number(i as i64)]),
                ]),
            ]),
            1 => SvnItem::List(vec![
                SvnItem::Word("set-path".to_string()),
                SvnItem::List(vec![
                    SvnItem::String(b"".to_vec()),
                    SvnItem::Number(i as i64),
                    SvnItem::Word("false".to_string()),
                ]),
            ]),
            2 => SvnItem::List(vec![
                SvnItem::Word("commit".to_string()),
                SvnItem::List(vec![SvnItem::String(vec![b'x'; 512])]),
            ]),
            _ => SvnItem::List(vec![
                SvnItem::Word("status".to_string()),
                SvnItem::List(vec![
                    SvnItem::String(b"trunk".to_vec()),
                    SvnItem::List(vec![SvnItem::Number(i as i64)]),
                ]),
            ]),
        };
        wire.extend_from_slice(&serialize(std::slice::from_ref(&tree)));
    }
    wire
}

fn bench_decoder(c: &mut Criterion) {
    let wire = sample_stream(256);

    let mut group = c.benchmark_group("decoder");
    group.throughput(Throughput::Bytes(wire.len() as u64));

    group.bench_function("feed_whole_buffer", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new();
            let messages = decoder.feed(black_box(&wire)).unwrap();
            black_box(messages)
        })
    });

    for chunk in [7usize, 64, 1024] {
        group.bench_with_input(
            BenchmarkId::new("feed_chunked", chunk),
            &chunk,
            |b, &chunk| {
                b.iter(|| {
                    let mut decoder = Decoder::new();
                    let mut count = 0usize;
                    for piece in wire.chunks(chunk) {
                        count += decoder.feed(black_box(piece)).unwrap().len();
                    }
                    black_box(count)
                })
            },
        );
    }
    group.finish();
}

fn bench_gate(c: &mut Criterion) {
    let wire = sample_stream(256);

    let mut group = c.benchmark_group("gate");
    group.throughput(Throughput::Bytes(wire.len() as u64));
    group.bench_function("classify_and_route", |b| {
        b.iter(|| {
            let mut gate = ProxyGate::new(false);
            let actions = gate.feed(black_box(&wire)).unwrap();
            black_box(actions)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_decoder, bench_gate);
criterion_main!(benches);
