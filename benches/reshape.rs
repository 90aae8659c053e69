//! 时间序列宽表转长表基准测试

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use covidmap::ingestion::report::FileReport;
use covidmap::ingestion::{SeriesKind, SeriesMap, read_time_series};

/// 生成 `rows` 行、`days` 个日期列的全球时间序列 CSV
fn wide_csv(rows: usize, days: usize) -> String {
    let start = chrono::NaiveDate::from_ymd_opt(2020, 1, 22).unwrap();
    let mut out = String::from("Province/State,Country/Region,Lat,Long");
    for i in 0..days {
        let date = start + chrono::Days::new(i as u64);
        out.push_str(&date.format(",%-m/%-d/%y").to_string());
    }
    out.push('\n');

    for r in 0..rows {
        out.push_str(&format!("Province {},Country {},{}.5,{}.25", r, r % 50, r % 90, r % 180));
        for i in 0..days {
            out.push_str(&format!(",{}", r * 10 + i));
        }
        out.push('\n');
    }
    out
}

fn bench_read_time_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("reshape/read_time_series");

    for (rows, days) in [(100, 100), (280, 760)] {
        let csv = wide_csv(rows, days);
        group.throughput(Throughput::Elements((rows * days) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", rows, days)),
            &csv,
            |b, csv| {
                b.iter(|| {
                    let mut data = SeriesMap::new();
                    let mut report = FileReport::new("bench.csv", SeriesKind::Confirmed.as_ref());
                    read_time_series(csv.as_bytes(), SeriesKind::Confirmed, &mut data, &mut report)
                        .unwrap();
                    data
                });
            },
        );
    }
    group.finish();
}

fn bench_merge_three_series(c: &mut Criterion) {
    let csv = wide_csv(280, 760);

    c.bench_function("reshape/merge_three_series", |b| {
        b.iter(|| {
            let mut data = SeriesMap::new();
            for kind in [SeriesKind::Confirmed, SeriesKind::Deaths, SeriesKind::Recovered] {
                let mut report = FileReport::new("bench.csv", kind.as_ref());
                read_time_series(csv.as_bytes(), kind, &mut data, &mut report).unwrap();
            }
            data
        });
    });
}

criterion_group!(benches, bench_read_time_series, bench_merge_three_series);
criterion_main!(benches);
