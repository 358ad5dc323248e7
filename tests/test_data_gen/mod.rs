//! Deterministic record generators for integration tests.

#![allow(dead_code)]

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use recsort_core::types::{Record, Value};
use recsort_io::RecordWriter;

/// Small linear congruential generator so runs are reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    pub fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Uniform in `[lo, hi)`.
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() as f64) / ((1u64 << 53) as f64);
        lo + unit * (hi - lo)
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap()
}

/// Vessel position reports with random timestamps in 2014, positions, and
/// a unique `id` in input order.
pub fn generate_positions(count: usize, seed: u64) -> Vec<Record> {
    let mut rng = Lcg::new(seed);
    (0..count)
        .map(|i| {
            let offset_us = rng.below(365 * 24 * 3600 * 1_000_000) as i64;
            let ts = base_time() + chrono::Duration::microseconds(offset_us);
            Record::new()
                .with("timestamp", Value::timestamp(ts))
                .with("mmsi", 200_000_000 + rng.below(1000) as i64)
                .with("lat", rng.range_f64(-90.0, 90.0))
                .with("lon", rng.range_f64(-180.0, 180.0))
                .with("id", i as i64)
        })
        .collect()
}

/// Records whose text and opaque fields contain line and key separators.
pub fn generate_awkward(count: usize, seed: u64) -> Vec<Record> {
    let mut rng = Lcg::new(seed);
    let names = ["plain", "two\nlines", "star * here", "*", "\u{7f}del", "ünï", "star"];
    (0..count)
        .map(|i| {
            let name = names[rng.below(names.len() as u64) as usize];
            Record::new()
                .with("name", name)
                .with("n", rng.below(2000) as i64 - 1000)
                .with("x", rng.range_f64(-1e6, 1e6))
                .with("meta", Value::Opaque(serde_json::json!({ "k": name, "i": i })))
                .with("id", i as i64)
        })
        .collect()
}

pub fn write_records(path: &Path, records: &[Record]) {
    let mut w = RecordWriter::create(path, None, None).expect("Failed to create input");
    for r in records {
        w.append(r).expect("Failed to write record");
    }
    w.finish().expect("Failed to finish input");
}

pub fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .map(|r| r.get("id").and_then(Value::as_i64).expect("record without id"))
        .collect()
}
