use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mova::{parse_str, run, tokenize};

// A reasonably varied expression, repeated to give the lexer some work
const BENCH_UNIT: &str = r#"
// Precedence, grouping and unary chains
(1 + 2.5 * 3 - 4 / 2) * -(7 - 10) >= 12.75 ==
  !(ніщо == хиба) != (("при" + "віт") == "привіт")
"#;

fn bench_input(copies: usize) -> String {
    // Joined with `==` so the whole text stays one valid expression
    vec![BENCH_UNIT.trim(); copies].join("\n== ")
}

fn bench_pipeline(c: &mut Criterion) {
    let input = bench_input(8);

    // Create a benchmark group
    let mut group = c.benchmark_group("Pipeline");

    group.bench_with_input(
        BenchmarkId::new("tokenize", "repeated_unit"),
        &input,
        |b, input| b.iter(|| tokenize(black_box(input))),
    );
    group.bench_with_input(
        BenchmarkId::new("parse_str", "repeated_unit"),
        &input,
        |b, input| b.iter(|| parse_str(black_box(input))),
    );
    group.bench_with_input(
        BenchmarkId::new("run", "repeated_unit"),
        &input,
        |b, input| b.iter(|| run(black_box(input))),
    );

    group.finish(); // Finish the group
}

// Register the benchmark group with Criterion
criterion_group!(benches, bench_pipeline);
// Generate the main function necessary for the benchmark executable
criterion_main!(benches);
