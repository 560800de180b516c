use coral::lexer::{self, Lexer, TokenSource};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

static INPUT: &str = include_str!("../../demos/big.coral");

fn lexer_incremental(input: &str) {
    let mut lexer = Lexer::new(input);
    let mut i = 0;
    loop {
        let token = lexer.next_token();
        if token.is_eof() {
            break;
        }
        if token.kind.is_trivia() || token.kind.is_error() {
            continue;
        }
        i += 1;
    }
    black_box(i);
}

fn lexer_eager(input: &str) {
    let tokens = lexer::lex_in_new(input);
    black_box(tokens.len());
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("incremental", |b| {
        b.iter(|| lexer_incremental(black_box(INPUT)));
    });
    c.bench_function("eager", |b| b.iter(|| lexer_eager(black_box(INPUT))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
