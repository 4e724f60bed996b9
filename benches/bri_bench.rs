use br_index::BrIndex;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_text(size: usize) -> Vec<u8> {
    let words = [
        "the ", "quick ", "brown ", "fox ", "jumps ", "over ", "lazy ", "dog ",
        "alice ", "bob ", "server ", "request ", "response ", "error ", "data ",
        "cache ", "index ", "search ", "query ", "result ",
    ];
    let mut text = Vec::with_capacity(size);
    let mut i = 0;
    while text.len() < size {
        let word = words[i % words.len()].as_bytes();
        text.extend_from_slice(word);
        // Occasional edit so the text is repetitive but not periodic.
        if i % 97 == 0 {
            text.push(b'#');
        }
        i += 1;
    }
    text.truncate(size);
    text
}

fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");

    for size in [1_000, 10_000, 50_000] {
        let text = generate_text(size);
        group.bench_with_input(BenchmarkId::new("bytes", size), &text, |b, text| {
            b.iter(|| BrIndex::<br_index::EliasFano, br_index::RleString>::build(black_box(text)))
        });
    }
    group.finish();
}

fn bench_count(c: &mut Criterion) {
    let text = generate_text(100_000);
    let index: BrIndex = BrIndex::build(&text).unwrap();

    let mut group = c.benchmark_group("count");

    for pattern in ["fox", "the quick", "server request response"] {
        group.bench_with_input(BenchmarkId::new("pattern", pattern), pattern.as_bytes(), |b, pat| {
            b.iter(|| index.count_pattern(black_box(pat)))
        });
    }
    group.finish();
}

fn bench_extension(c: &mut Criterion) {
    let text = generate_text(100_000);
    let index: BrIndex = BrIndex::build(&text).unwrap();

    c.bench_function("extend_left", |b| {
        b.iter(|| {
            let mut search = index.search();
            for &ch in b"request".iter().rev() {
                search.left_extension(black_box(ch));
            }
            black_box(search.count())
        })
    });

    c.bench_function("extend_from_middle", |b| {
        b.iter(|| {
            let mut search = index.search();
            search.left_extension(b'q');
            for &ch in b"uest" {
                search.right_extension(black_box(ch));
            }
            for &ch in b"re".iter().rev() {
                search.left_extension(black_box(ch));
            }
            black_box(search.count())
        })
    });
}

fn bench_locate(c: &mut Criterion) {
    let text = generate_text(100_000);
    let index: BrIndex = BrIndex::build(&text).unwrap();

    c.bench_function("locate_all_fox", |b| {
        b.iter(|| {
            let positions = index.locate_pattern(black_box(b"fox"));
            black_box(positions.len())
        })
    });

    c.bench_function("locate_iter_first_10", |b| {
        let mut search = index.search();
        for &ch in b"the" {
            search.right_extension(ch);
        }
        b.iter(|| {
            let positions: Vec<_> = search.occurrences().take(10).collect();
            black_box(positions)
        })
    });
}

criterion_group!(benches, bench_build_index, bench_count, bench_extension, bench_locate);
criterion_main!(benches);
