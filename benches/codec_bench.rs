//! Benchmarks for the fluxline codecs
//!
//! Run with: cargo bench

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fluxline::codec::{LineProtocolEncoder, ResponseDecoder};
use fluxline::domain::Point;

fn create_test_points(count: usize, hosts: usize) -> Vec<Point> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            Point::builder()
                .timestamp(start + chrono::Duration::seconds(i as i64))
                .tag("host", format!("web-{}", i % hosts))
                .tag("region", "eu west")
                .field("usage", i as f64 / count as f64)
                .field("requests", i as i64)
                .build()
        })
        .collect()
}

fn create_response(rows: usize) -> String {
    let values: Vec<String> = (0..rows)
        .map(|i| format!("[\"2024-01-01T00:00:{:02}Z\",\"web-{}\",{},{}]", i % 60, i % 8, i, i as f64 / 2.0))
        .collect();
    format!(
        "{{\"results\":[{{\"statement_id\":0,\"series\":[{{\"name\":\"cpu\",\"columns\":[\"time\",\"host\",\"requests\",\"usage\"],\"values\":[{}]}}]}}]}}\n",
        values.join(",")
    )
}

fn bench_line_protocol(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_protocol");
    let encoder = LineProtocolEncoder::new();

    for size in [100, 1000, 10000] {
        let points = create_test_points(size, 16);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("encode_{}", size), |b| {
            b.iter(|| encoder.encode(black_box("cpu"), black_box(&points)).unwrap())
        });
    }

    group.finish();
}

fn bench_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("response");
    let decoder = ResponseDecoder::new();

    for rows in [100, 1000, 10000] {
        let body = create_response(rows);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_function(format!("decode_{}", rows), |b| {
            b.iter(|| decoder.decode(black_box(&body)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_line_protocol, bench_response);
criterion_main!(benches);
