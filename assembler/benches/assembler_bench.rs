//! Assembler benchmarks
//!
//! Measures the hot paths of the two-pass translation:
//! - PHF code lookups
//! - A-instruction encoding
//! - Symbol table operations
//! - Full assembly pipeline
//!
//! Run with:
//! ```bash
//! cargo bench
//! cargo bench --bench assembler_bench -- --save-baseline master
//! ```

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use assembler::{SymbolTable, assemble, code};

/// Benchmark: PHF-based code lookups (O(1) compile-time perfect hash)
fn bench_code_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_lookups");
    group.throughput(Throughput::Elements(4));

    group.bench_function("dest_lookup_hot", |b| {
        b.iter(|| {
            black_box(code::dest("AMD")).ok();
            black_box(code::dest("D")).ok();
            black_box(code::dest("M")).ok();
            black_box(code::dest("")).ok();
        });
    });

    group.bench_function("comp_lookup_hot", |b| {
        b.iter(|| {
            black_box(code::comp("D+1")).ok();
            black_box(code::comp("D&M")).ok();
            black_box(code::comp("M-D")).ok();
            black_box(code::comp("0")).ok();
        });
    });

    group.bench_function("encode_c_instruction_hot", |b| {
        b.iter(|| {
            black_box(code::encode_c_instruction("D", "D+1", "JMP")).ok();
        });
    });

    group.finish();
}

/// Benchmark: A-instruction encoding (binary conversion)
fn bench_a_instruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("a_instruction");

    group.bench_function("encode_small_address", |b| {
        b.iter(|| black_box(code::encode_a_instruction(100)));
    });

    group.bench_function("encode_max_address", |b| {
        b.iter(|| black_box(code::encode_a_instruction(32767)));
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("encode_batch_100", |b| {
        b.iter(|| {
            for i in 0..100 {
                black_box(code::encode_a_instruction(i));
            }
        });
    });

    group.finish();
}

/// Benchmark: Symbol table operations
fn bench_symbol_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("symbol_table");

    group.bench_function("initialization", |b| {
        b.iter(|| black_box(SymbolTable::new()));
    });

    group.throughput(Throughput::Elements(3));
    group.bench_function("lookup_predefined_hot", |b| {
        let table = SymbolTable::new();
        b.iter(|| {
            black_box(table.get_address("SP"));
            black_box(table.get_address("R15"));
            black_box(table.get_address("SCREEN"));
        });
    });

    // HOT PATH: get_or_insert (most common operation in pass 2)
    group.bench_function("get_or_insert_existing", |b| {
        let mut table = SymbolTable::new();
        let mut ram_address = 16;
        table.get_or_insert("counter", &mut ram_address);
        b.iter(|| {
            black_box(table.get_or_insert("counter", &mut ram_address));
        });
    });

    group.finish();
}

/// Benchmark: Full two-pass assembly of a small looping program
fn bench_full_pipeline(c: &mut Criterion) {
    let source = "\
// Sums 1..100 into R1
@i
M=1
@sum
M=0
(LOOP)
@i
D=M
@100
D=D-A
@STOP
D;JGT
@i
D=M
@sum
M=D+M
@i
M=M+1
@LOOP
0;JMP
(STOP)
@sum
D=M
@R1
M=D
(END)
@END
0;JMP
";

    let mut group = c.benchmark_group("full_pipeline");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("assemble_sum_loop", |b| {
        b.iter(|| black_box(assemble(source)).ok());
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_code_lookups,
    bench_a_instruction,
    bench_symbol_table,
    bench_full_pipeline
);
criterion_main!(benches);
