use coral::{compile, parser::parse_program, util::intern::Interner};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

static INPUT: &str = include_str!("../../demos/big.coral");

fn parser(input: &str, idents: &mut Interner) {
    let program = parse_program(input, idents).unwrap();
    _ = black_box(program);
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut idents = Interner::with_capacity(256);

    c.bench_function("parser", |b| {
        b.iter(|| parser(black_box(INPUT), &mut idents));
    });
    c.bench_function("compile", |b| {
        b.iter(|| black_box(compile(black_box(INPUT), "big").unwrap()));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
