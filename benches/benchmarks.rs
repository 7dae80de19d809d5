use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use utf8stream::{codepoints, report, BufferedStream, ByteBuffer, Direction};

const INPUT_SIZE: usize = 1024 * 1024;

/// Repeats `unit` until at least `size` bytes.
fn corpus(unit: &str, size: usize) -> Vec<u8> {
    unit.as_bytes().iter().copied().cycle().take(size.next_multiple_of(unit.len())).collect()
}

fn inputs() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("ascii", corpus("The quick brown fox jumps over the lazy dog.\n", INPUT_SIZE)),
        ("latin1", corpus("Grüße aus Zürich, ça va?\r\n", INPUT_SIZE)),
        ("cjk", corpus("한국어 텍스트와 中文文本\n", INPUT_SIZE)),
        ("emoji", corpus("😀🎉🚀🌍\n", INPUT_SIZE)),
    ]
}

fn benchmark_getc(c: &mut Criterion) {
    let data = corpus("x", INPUT_SIZE);
    let mut group = c.benchmark_group("getc");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("memory", |b| {
        b.iter(|| {
            let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(&data), Direction::In, "bench");
            let mut sum = 0u64;
            while let Some(byte) = s.getc().unwrap() {
                sum += u64::from(byte);
            }
            black_box(sum)
        });
    });
    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for (name, data) in inputs() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(data), Direction::In, "bench");
                let mut count = 0usize;
                codepoints(&mut s)
                    .process_all(|cp| {
                        count += 1;
                        black_box(cp);
                        Ok(())
                    })
                    .unwrap();
                black_box(count)
            });
        });
    }
    group.finish();
}

fn benchmark_std_baseline(c: &mut Criterion) {
    // Reference point: std validation plus char iteration over the same data.
    let mut group = c.benchmark_group("std_from_utf8");
    for (name, data) in inputs() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| black_box(std::str::from_utf8(data).unwrap().chars().count()));
        });
    }
    group.finish();
}

fn benchmark_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");
    for (name, data) in inputs() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(data), Direction::In, "bench");
                black_box(report(&mut s))
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_getc,
    benchmark_decode,
    benchmark_std_baseline,
    benchmark_report
);
criterion_main!(benches);
