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

//! Integration tests for optimization passes, exercised through the
//! public pipeline rather than against the SSA builder directly.

use std::collections::HashSet;
use veribound::optimizations::OptimizationKind;
use veribound::{verify, Config};

fn verify_with(src: &str, kinds: &[OptimizationKind]) -> veribound::VerificationResult {
    let cfg = Config { optimizations: kinds.iter().copied().collect::<HashSet<_>>(), ..Config::default() };
    verify(src, &cfg).expect("pipeline should succeed")
}

#[test]
fn constant_propagation_folds_a_dead_branch_without_changing_the_verdict() {
    let src = "var x:=1; if(1==1){ x:=x+1; } else { x:=x-1; } assert x==2;";
    let plain = verify_with(src, &[]);
    let folded = verify_with(src, &[OptimizationKind::ConstantPropagation]);
    assert_eq!(plain.ok, folded.ok);
    assert!(folded.ok);
}

#[test]
fn dead_code_elimination_does_not_change_the_verdict() {
    let src = "var x:=1; var unused:=x+100; var y:=x+1; assert y==2;";
    let plain = verify_with(src, &[]);
    let eliminated = verify_with(src, &[OptimizationKind::DeadCodeElimination]);
    assert_eq!(plain.ok, eliminated.ok);
}

#[test]
fn common_subexpression_elimination_does_not_change_the_verdict() {
    let src = "var a:=2; var b:=3; var x:=a+b; var y:=a+b; assert x==y;";
    let plain = verify_with(src, &[]);
    let cse = verify_with(src, &[OptimizationKind::CommonSubexpressionElimination]);
    assert_eq!(plain.ok, cse.ok);
    assert!(cse.ok);
}

#[test]
fn all_optimizations_together_still_catch_a_real_failure() {
    let src = "var x:=10; var y:=5; var z:=0; while(y>0){ z:=z+x; y:=y-1; } assert z==51;";
    let all = [
        OptimizationKind::ConstantPropagation,
        OptimizationKind::DeadCodeElimination,
        OptimizationKind::CommonSubexpressionElimination,
    ];
    let result = verify_with(src, &all);
    assert!(!result.ok);
    assert_eq!(result.counterexamples[0].get("z"), Some(&50));
}

#[test]
fn optimizations_agree_with_plain_pass_across_a_range_of_programs() {
    let programs = [
        "var x:=1; assert x==1;",
        "var x:=3; if(x<5){ var y:=x+1; } else { var y:=x-1; } assert y>0;",
        "var x:=0; while(x<4){ x:=x+1; } assert x==4;",
    ];
    let all = [
        OptimizationKind::ConstantPropagation,
        OptimizationKind::DeadCodeElimination,
        OptimizationKind::CommonSubexpressionElimination,
    ];
    for src in programs {
        let plain = verify_with(src, &[]);
        let optimized = verify_with(src, &all);
        assert_eq!(plain.ok, optimized.ok, "verdict diverged for: {}", src);
    }
}
