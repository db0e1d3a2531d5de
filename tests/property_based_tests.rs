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

//! Property-based tests for the conservativity and reflexivity laws.

use proptest::prelude::*;
use std::collections::HashSet;
use veribound::optimizations::OptimizationKind;
use veribound::{equiv, verify, Config};

fn bounded_sum_program(x: i64, y: i64) -> String {
    format!(
        "var x:={}; var y:={}; var z:=0; while(y>0){{ z:=z+x; y:=y-1; }} assert z>=0;",
        x, y
    )
}

proptest! {
    /// Turning optimizations on or off must never change the verdict.
    #[test]
    fn optimizer_conservativity(x in 0i64..50, y in 0i64..8) {
        let src = bounded_sum_program(x, y);
        let plain = verify(&src, &Config::default()).expect("pipeline should succeed");

        let all = Config {
            optimizations: HashSet::from([
                OptimizationKind::ConstantPropagation,
                OptimizationKind::DeadCodeElimination,
                OptimizationKind::CommonSubexpressionElimination,
            ]),
            ..Config::default()
        };
        let optimized = verify(&src, &all).expect("pipeline should succeed");

        prop_assert_eq!(plain.ok, optimized.ok);
    }

    /// A program is always equivalent to itself.
    #[test]
    fn equivalence_is_reflexive(x in 0i64..50, y in 0i64..8) {
        let src = bounded_sum_program(x, y);
        let result = equiv(&src, &src, &Config::default()).expect("pipeline should succeed");
        prop_assert!(result.ok);
    }

    /// Repeated calls with identical inputs are byte-identical.
    #[test]
    fn verification_is_deterministic(x in 0i64..50, y in 0i64..8) {
        let src = bounded_sum_program(x, y);
        let first = verify(&src, &Config::default()).expect("pipeline should succeed");
        let second = verify(&src, &Config::default()).expect("pipeline should succeed");
        prop_assert_eq!(first.ssa_text, second.ssa_text);
        prop_assert_eq!(first.ok, second.ok);
    }
}
