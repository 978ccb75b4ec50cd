//! Conversion throughput over a synthetic filter list.
//!
//! Run with: `cargo bench -p cbc-compiler`

use cbc_compiler::{convert_array, parse_rules};
use cbc_core::{ConversionConfig, NoopLogger};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn synthetic_list(rule_count: usize) -> Vec<String> {
    (0..rule_count)
        .map(|i| match i % 6 {
            0 => format!("||ads{i}.example.com^"),
            1 => format!("||tracker{}.net^$script,third-party", i % 97),
            2 => format!("site{}.com##.banner-{}", i % 211, i % 13),
            3 => format!("@@||cdn{i}.example.org^$image"),
            4 => format!("/pixel{i}/*/track^$image,domain=news{}.com", i % 31),
            _ => format!("site{}.com##+js(set-constant, ads{i}, false)", i % 53),
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let lines = synthetic_list(10_000);
    c.bench_function("parse_10k", |b| {
        b.iter(|| parse_rules(black_box(&lines)))
    });
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    for rule_count in [1_000, 10_000] {
        let lines = synthetic_list(rule_count);
        for optimize in [false, true] {
            let config = ConversionConfig {
                optimize,
                advanced_blocking: true,
                ..ConversionConfig::default()
            };
            let id = format!("{rule_count}/optimize={optimize}");
            group.bench_with_input(BenchmarkId::from_parameter(id), &lines, |b, lines| {
                b.iter(|| convert_array(black_box(lines), config.clone(), &NoopLogger))
            });
        }
    }
    group.finish();
}

fn bench_budget(c: &mut Criterion) {
    let lines = synthetic_list(10_000);
    let config = ConversionConfig {
        max_json_size_bytes: Some(256 * 1024),
        ..ConversionConfig::default()
    };
    c.bench_function("convert_10k_budget_256k", |b| {
        b.iter(|| convert_array(black_box(&lines), config.clone(), &NoopLogger))
    });
}

criterion_group!(benches, bench_parse, bench_convert, bench_budget);
criterion_main!(benches);
