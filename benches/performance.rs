use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use recsort_core::config::SortColumns;
use recsort_core::types::{Record, Value};
use recsort_sort::codec::{decode, encode};
use recsort_sort::key::{mangle, KeyEncoder};

fn make_records(rows: usize) -> Vec<Record> {
    let t0 = Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap();
    (0..rows)
        .map(|i| {
            Record::new()
                .with("timestamp", t0 + chrono::Duration::seconds((i * 37 % 86_400) as i64))
                .with("mmsi", 200_000_000 + (i % 500) as i64)
                .with("lat", (i % 180) as f64 - 90.0 + 0.125)
                .with("lon", (i % 360) as f64 - 180.0 + 0.5)
                .with("name", format!("vessel-{}\n*", i % 64))
        })
        .collect()
}

fn bench_mangle(c: &mut Criterion) {
    let values = [
        Value::Integer(-1_234_567),
        Value::Float(-12.75),
        Value::timestamp(Utc.with_ymd_and_hms(2014, 6, 1, 8, 0, 0).unwrap()),
        Value::Text("a * b\nc".into()),
    ];
    let mut group = c.benchmark_group("mangle");
    for v in &values {
        group.bench_function(format!("{:?}", v.data_type()), |b| {
            b.iter(|| mangle(black_box(Some(v))).unwrap())
        });
    }
    group.finish();
}

fn bench_sort_key(c: &mut Criterion) {
    let records = make_records(1024);
    let encoder = KeyEncoder::new(SortColumns::parse("timestamp,lat,name").unwrap());
    let mut group = c.benchmark_group("sort_key");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("three_columns", |b| {
        let mut buf = Vec::with_capacity(128);
        b.iter(|| {
            for r in &records {
                buf.clear();
                encoder.key_into(black_box(r), &mut buf).unwrap();
            }
        })
    });
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let records = make_records(1024);
    let encoded: Vec<Vec<u8>> = records.iter().map(|r| encode(r).unwrap()).collect();
    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("encode", |b| {
        b.iter(|| {
            for r in &records {
                black_box(encode(r).unwrap());
            }
        })
    });
    group.bench_function("decode", |b| {
        b.iter(|| {
            for e in &encoded {
                black_box(decode(e).unwrap());
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_mangle, bench_sort_key, bench_codec);
criterion_main!(benches);
