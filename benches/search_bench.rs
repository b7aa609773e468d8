use criterion::{black_box, criterion_group, criterion_main, Criterion};
use textedit::search::{find_matches, replace_in_text, search_in_text, SearchOptions};

fn sample_text() -> String {
    (0..2000)
        .map(|i| format!("line {} with some words, a needle and more words\n", i))
        .collect()
}

fn benchmark_literal_find(c: &mut Criterion) {
    let text = sample_text();
    let options = SearchOptions::default();
    c.bench_function("literal_find_matches", |b| {
        b.iter(|| find_matches(black_box(&text), black_box("needle"), &options).unwrap());
    });
}

fn benchmark_regex_find(c: &mut Criterion) {
    let text = sample_text();
    let options = SearchOptions {
        regex: true,
        ..SearchOptions::default()
    };
    c.bench_function("regex_find_matches", |b| {
        b.iter(|| find_matches(black_box(&text), black_box(r"line \d+"), &options).unwrap());
    });
}

fn benchmark_line_search_and_replace(c: &mut Criterion) {
    let text = sample_text();
    let options = SearchOptions::default();
    let hits: Vec<(usize, usize, usize)> = search_in_text(&text, "needle", &options)
        .unwrap()
        .into_iter()
        .map(|hit| (hit.line_number, hit.match_start, hit.match_end))
        .collect();

    c.bench_function("search_in_text", |b| {
        b.iter(|| search_in_text(black_box(&text), "needle", &options).unwrap());
    });
    c.bench_function("replace_in_text", |b| {
        b.iter(|| replace_in_text(black_box(&text), &hits, "needle", "pin", &options).unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_literal_find,
    benchmark_regex_find,
    benchmark_line_search_and_replace
);
criterion_main!(benches);
