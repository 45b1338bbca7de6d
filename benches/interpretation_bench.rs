use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use monster_rift_interp::buffer::ByteBuffer;
use monster_rift_interp::config::InterpretationConfig;
use monster_rift_interp::encoding::Utf8;
use monster_rift_interp::interpretation::Interpretation;

fn large_text() -> Vec<u8> {
    let line = "This is a line of text for testing interpretation speeds. é€\r\n";
    line.repeat(10_000).into_bytes()
}

fn interpretation_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpretation_build");
    let text = large_text();
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("decode_full", |b| {
        let buffer = ByteBuffer::from_bytes(text.clone());
        b.iter(|| {
            let interp =
                Interpretation::new(&buffer, Box::new(Utf8), InterpretationConfig::default())
                    .unwrap();
            black_box(interp.line_count());
        })
    });

    group.finish();
}

fn interpretation_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpretation_edit");

    let setup = || {
        let mut buffer = ByteBuffer::from_bytes(large_text());
        let interp =
            Interpretation::attach(&mut buffer, Box::new(Utf8), InterpretationConfig::default())
                .unwrap();
        (buffer, interp)
    };

    // Single byte insertion in the middle of a large buffer
    group.bench_function("insert_middle", |b| {
        b.iter_batched(
            setup,
            |(mut buffer, interp)| {
                let mid = buffer.len() / 2;
                for i in 0..100 {
                    buffer.insert(black_box(mid + i), b"x").unwrap();
                }
                black_box(interp.borrow().codepoint_count());
            },
            criterion::BatchSize::LargeInput,
        )
    });

    // Many small edits in one batch
    group.bench_function("batch_scattered", |b| {
        b.iter_batched(
            setup,
            |(mut buffer, interp)| {
                let step = buffer.len() / 100;
                {
                    let mut modifier = buffer.modify();
                    for i in 0..100 {
                        modifier.replace(i * step, 1, b"\n").unwrap();
                    }
                    modifier.commit();
                }
                black_box(interp.borrow().line_count());
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

fn interpretation_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpretation_convert");
    let buffer = ByteBuffer::from_bytes(large_text());
    let interp =
        Interpretation::new(&buffer, Box::new(Utf8), InterpretationConfig::default()).unwrap();
    let total = interp.character_count();

    group.bench_function("character_to_byte_sequential", |b| {
        b.iter(|| {
            let mut conv = interp.character_byte_converter(&buffer);
            for c in (0..total).step_by(97) {
                black_box(conv.character_to_byte(c));
            }
        })
    });

    group.bench_function("character_to_byte_random", |b| {
        let mut i = 0;
        b.iter(|| {
            // Pseudo-random access
            i = (i + 7919) % total;
            let mut conv = interp.character_byte_converter(&buffer);
            black_box(conv.character_to_byte(i));
        })
    });

    group.bench_function("iter_characters", |b| {
        b.iter(|| {
            for c in interp.character_iterator_at(&buffer, 0) {
                black_box(c);
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    interpretation_build,
    interpretation_edit,
    interpretation_convert
);
criterion_main!(benches);
