use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use huff::{Backpatch, Encoder, EncoderConfig, FrequencyTable, HuffmanTree};

fn sample_text(len: usize) -> Vec<u8> {
    // Skewed distribution so codes have a range of lengths
    let words = ["the ", "of ", "huffman ", "and ", "a ", "to ", "prefix ", "code "];
    words.iter().cycle().flat_map(|w| w.bytes()).take(len).collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let input = sample_text(64 * 1024);
    group.throughput(Throughput::Bytes(input.len() as u64));

    for mode in [Backpatch::Seek, Backpatch::Buffer] {
        let encoder = Encoder::with_config(EncoderConfig::default().with_backpatch(mode)).unwrap();
        group.bench_function(mode.to_string(), |b| {
            b.iter(|| {
                let mut out = Cursor::new(Vec::with_capacity(input.len()));
                encoder.encode(&mut Cursor::new(&input[..]), &mut out).unwrap();
                out.into_inner()
            })
        });
    }

    group.bench_function("build_tree", |b| {
        let table = FrequencyTable::from_bytes(&input);
        b.iter(|| HuffmanTree::build(&table))
    });
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let input = sample_text(64 * 1024);
    group.throughput(Throughput::Bytes(input.len() as u64));
    let packed = huff::encode(&input[..]).unwrap();

    group.bench_function("walk", |b| b.iter(|| huff::decode(&packed[..]).unwrap()));
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
