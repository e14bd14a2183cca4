//! Benchmark harness for the rename pipeline.
//!
//! Run with: cargo bench -p jsnorm_compiler

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jsnorm_compiler::Program;
use jsnorm_options::CompilerOptions;

/// Small source for micro-benchmarks.
const SMALL_SOURCE: &str = r#"
var a = 1;
function foo(a) {
    var b = a + 1;
    return b;
}
function boo(a) {
    var b = a - 1;
    return b;
}
"#;

/// A more realistic module with nested scopes and collisions.
const MEDIUM_SOURCE: &str = r#"
var state = {count: 0};
function makeCounter(start) {
    var count = start;
    return function inc(step) {
        count = count + step;
        return count;
    };
}
function drain(items) {
    for (let i = 0; i < items.length; i++) {
        try {
            items[i]();
        } catch (e) {
            report(e);
        }
    }
    for (let i = 0; i < 10; i++) {
        let pending = items.slice(i);
        if (pending.length) {
            let pending2 = pending.map((x) => x + 1);
            use(pending2);
        }
    }
}
class Queue {
    constructor(limit) {
        this.limit = limit;
    }
    push(item) {
        var limit = this.limit;
        return item < limit;
    }
}
"#;

fn compile(source: &str, options: CompilerOptions) -> String {
    let mut program = Program::new(options);
    program.add_source("bench.js", source);
    let result = program.compile().expect("compiles");
    result.outputs.into_iter().next().expect("one output").text
}

fn bench_contextual(c: &mut Criterion) {
    c.bench_function("contextual_small", |b| {
        b.iter(|| compile(black_box(SMALL_SOURCE), CompilerOptions::default()))
    });
    c.bench_function("contextual_medium", |b| {
        b.iter(|| compile(black_box(MEDIUM_SOURCE), CompilerOptions::default()))
    });
}

fn bench_inline(c: &mut Criterion) {
    let options = CompilerOptions {
        use_default_renamer: false,
        local_name_prefix: "unique_".to_string(),
        ..CompilerOptions::default()
    };
    c.bench_function("inline_medium", |b| {
        b.iter(|| compile(black_box(MEDIUM_SOURCE), options.clone()))
    });
}

fn bench_invert(c: &mut Criterion) {
    // Forward output feeds the inverter.
    let forward = compile(MEDIUM_SOURCE, CompilerOptions::default());
    let options = CompilerOptions {
        invert: true,
        ..CompilerOptions::default()
    };
    c.bench_function("invert_medium", |b| {
        b.iter(|| compile(black_box(forward.as_str()), options.clone()))
    });
}

criterion_group!(benches, bench_contextual, bench_inline, bench_invert);
criterion_main!(benches);
