// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pipeline throughput benchmarks across unroll depths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashSet;
use veribound::optimizations::OptimizationKind;
use veribound::{verify, Config};

fn bounded_sum_program() -> String {
    "var x:=10; var y:=0; var z:=0; while(y<20){ z:=z+x; y:=y+1; } assert z>=0;".to_string()
}

fn bench_verify_at_depth(c: &mut Criterion, depth: u32) {
    let source = bounded_sum_program();
    let cfg = Config { unroll_depth: depth, ..Config::default() };

    c.bench_function(&format!("verify_depth_{}", depth), |b| {
        b.iter(|| {
            let _ = verify(black_box(&source), black_box(&cfg));
        });
    });
}

fn bench_shallow_unroll(c: &mut Criterion) {
    bench_verify_at_depth(c, 2);
}

fn bench_medium_unroll(c: &mut Criterion) {
    bench_verify_at_depth(c, 5);
}

fn bench_deep_unroll(c: &mut Criterion) {
    bench_verify_at_depth(c, 10);
}

fn bench_with_optimizations(c: &mut Criterion) {
    let source = bounded_sum_program();
    let cfg = Config {
        unroll_depth: 5,
        optimizations: HashSet::from([
            OptimizationKind::ConstantPropagation,
            OptimizationKind::DeadCodeElimination,
            OptimizationKind::CommonSubexpressionElimination,
        ]),
        ..Config::default()
    };

    c.bench_function("verify_depth_5_all_optimizations", |b| {
        b.iter(|| {
            let _ = verify(black_box(&source), black_box(&cfg));
        });
    });
}

criterion_group!(
    benches,
    bench_shallow_unroll,
    bench_medium_unroll,
    bench_deep_unroll,
    bench_with_optimizations,
);
criterion_main!(benches);
