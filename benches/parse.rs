use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_document() -> String {
    let mut text = String::new();
    for group in 0..50 {
        text.push_str(&format!("group{group} {{\n"));
        for key in 0..8 {
            text.push_str(&format!("\tkey{key} = \"value-{group}-{key}\";\n"));
        }
        text.push_str("}\n");
    }
    text
}

fn parse_benchmark(c: &mut Criterion) {
    let source = sample_document();

    c.bench_function("parse", |b| {
        b.iter_batched(
            || source.clone(),
            |mut text| {
                let arena = skc::parse(black_box(&mut text)).unwrap();
                black_box(arena);
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn prefix_iter_benchmark(c: &mut Criterion) {
    let mut text = sample_document();
    let arena = skc::parse(&mut text).unwrap();

    c.bench_function("prefix_iter", |b| {
        b.iter(|| {
            let mut it = skc::PrefixIter::start(&arena, "group10");
            let mut count = 0usize;
            while it.next().is_some() {
                count += 1;
            }
            black_box(count);
        });
    });
}

criterion_group!(benches, parse_benchmark, prefix_iter_benchmark);
criterion_main!(benches);
