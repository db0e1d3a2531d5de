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

use veribound::{equiv, verify, Config};

fn cfg(depth: u32) -> Config {
    Config { unroll_depth: depth, ..Config::default() }
}

#[test]
fn s1_bounded_sum_verifies_with_example() {
    let src = "var x:=10; var y:=5; var z:=0; while(y>0){ z:=z+x; y:=y-1; } assert z==50;";
    let result = verify(src, &cfg(5)).expect("pipeline should succeed");
    assert!(result.ok);
    assert_eq!(result.examples[0].get("z"), Some(&50));
}

#[test]
fn s2_wrong_assertion_fails_with_counterexample() {
    let src = "var x:=10; var y:=5; var z:=0; while(y>0){ z:=z+x; y:=y-1; } assert z==51;";
    let result = verify(src, &cfg(5)).expect("pipeline should succeed");
    assert!(!result.ok);
    assert_eq!(result.counterexamples[0].get("z"), Some(&50));
}

#[test]
fn s3_if_else_merge_verifies() {
    let src = "var x:=3; if(x<5){ var y:=x+1; } else { var y:=x-1; } assert y>0;";
    let result = verify(src, &cfg(5)).expect("pipeline should succeed");
    assert!(result.ok);
}

#[test]
fn s4_gauss_sum_equivalent_to_closed_form() {
    let a = "var n:=5; var s:=0; var i:=1; while(i<=n){ s:=s+i; i:=i+1; }";
    let b = "var n:=5; var s:=n*(n+1)/2;";
    let result = equiv(a, b, &cfg(5)).expect("pipeline should succeed");
    assert!(result.ok);
    let example = &result.examples[0];
    assert_eq!(example.get("n"), Some(&5));
    assert_eq!(example.get("s"), Some(&15));
}

#[test]
fn s5_unrolled_factorial_equivalent_to_product_literal() {
    let a = "var n:=5; var factorial:=1; var i:=1; while(i<=n){ factorial:=factorial*i; i:=i+1; }";
    let b = "var factorial:=1*2*3*4*5;";
    let result = equiv(a, b, &cfg(5)).expect("pipeline should succeed");
    assert!(result.ok);
    assert_eq!(result.examples[0].get("factorial"), Some(&120));
}

#[test]
fn s6_bound_too_small_exposes_counterexample() {
    let src = "var x:=0; while(x<4){ x:=x+1; } assert x==4;";
    let result = verify(src, &cfg(3)).expect("pipeline should succeed");
    assert!(!result.ok);
    assert_eq!(result.counterexamples[0].get("x"), Some(&3));
}

#[test]
fn equivalence_reflexive_for_well_formed_program() {
    let src = "var x:=2; var y:=x*x+1;";
    let result = equiv(src, src, &cfg(5)).expect("pipeline should succeed");
    assert!(result.ok);
}

#[test]
fn determinism_of_repeated_calls() {
    let src = "var x:=1; var y:=x+1; assert y==2;";
    let first = verify(src, &cfg(5)).unwrap();
    let second = verify(src, &cfg(5)).unwrap();
    assert_eq!(first.ssa_text, second.ssa_text);
    assert_eq!(first.ok, second.ok);
}
