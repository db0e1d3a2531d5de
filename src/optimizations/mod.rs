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

//! SSA-level optimization passes.
//!
//! Three passes, independently selectable, applied at most once each in
//! a fixed order: constant propagation, then dead-code elimination, then
//! common-subexpression elimination. There is no fixed-point iteration —
//! the verifier takes a single SMT shot and does not need one.

pub mod common_subexpression;
pub mod constant_propagation;
pub mod dead_code_elimination;

use crate::ssa::SsaProgram;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizationKind {
    ConstantPropagation,
    DeadCodeElimination,
    CommonSubexpressionElimination,
}

/// Run the selected optimizations over `program` in the fixed pipeline
/// order, regardless of the order they appear in `kinds`.
pub fn apply(mut program: SsaProgram, kinds: &HashSet<OptimizationKind>) -> SsaProgram {
    if kinds.contains(&OptimizationKind::ConstantPropagation) {
        program = constant_propagation::run(program);
    }
    if kinds.contains(&OptimizationKind::DeadCodeElimination) {
        program = dead_code_elimination::run(program);
    }
    if kinds.contains(&OptimizationKind::CommonSubexpressionElimination) {
        program = common_subexpression::run(program);
    }
    program
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::ssa::builder::build_ssa;
    use crate::ssa::unroll::unroll_program;

    fn build(src: &str, depth: u32) -> SsaProgram {
        let program = parse_source(src, "t.vb").unwrap();
        let unrolled = unroll_program(program.statements, depth);
        build_ssa(&unrolled).unwrap()
    }

    #[test]
    fn test_no_optimizations_is_identity_on_shape() {
        let program = build("var x := 1; assert x == 1;", 3);
        let kinds = HashSet::new();
        let optimized = apply(program.clone(), &kinds);
        assert_eq!(program.statements.len(), optimized.statements.len());
    }

    #[test]
    fn test_all_optimizations_run_in_fixed_order() {
        let program = build("var x := 1; var y := 1 + 1; var z := 1 + 1; assert z == y;", 3);
        let kinds = HashSet::from([
            OptimizationKind::ConstantPropagation,
            OptimizationKind::DeadCodeElimination,
            OptimizationKind::CommonSubexpressionElimination,
        ]);
        // should not panic and should still contain the assert
        let optimized = apply(program, &kinds);
        assert!(optimized.statements.iter().any(|s| matches!(s, crate::ssa::SsaStmt::Assert { .. })));
    }
}
