use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use reg_pol::{decode, encode, PolicyRecord, RegistryValueKind, ValueData};

fn sample_records(count: usize) -> Vec<PolicyRecord> {
    (0..count)
        .map(|i| {
            let key = format!(r"Software\Policies\Vendor\Product\Section{}", i % 16);
            let (kind, data) = match i % 4 {
                0 => (RegistryValueKind::Dword, ValueData::Dword(i as i32)),
                1 => (
                    RegistryValueKind::String,
                    ValueData::String(format!("value number {}", i)),
                ),
                2 => (
                    RegistryValueKind::MultiString,
                    ValueData::MultiString(vec!["alpha".into(), "beta".into(), "gamma".into()]),
                ),
                _ => (RegistryValueKind::Binary, ValueData::Binary(vec![0xA5; 32])),
            };
            PolicyRecord::new(key, format!("Setting{}", i), kind, data).unwrap()
        })
        .collect()
}

fn bench_codec(c: &mut Criterion) {
    let records = sample_records(1_000);
    let bytes = encode(&records).unwrap();

    let mut group = c.benchmark_group("policy_file");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("decode_1000", |b| b.iter(|| decode(black_box(&bytes)).unwrap()));
    group.bench_function("encode_1000", |b| b.iter(|| encode(black_box(&records)).unwrap()));
    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
