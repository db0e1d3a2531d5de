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

//! End-to-end verification pipeline.
//!
//! Wires together every phase from source text to a verification or
//! equivalence result: parse, bound the loops, build SSA, optimize,
//! encode, and discharge the resulting obligations against the solver.

use crate::error::VerifierError;
use crate::optimizations::{self, OptimizationKind};
use crate::parser::parse_source;
use crate::ssa::builder::build_ssa;
use crate::ssa::unroll::unroll_program;
use crate::verification::{self, EquivalenceResult, VerificationResult};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Verification,
    Equivalence,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub unroll_depth: u32,
    pub optimizations: HashSet<OptimizationKind>,
    pub mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self { unroll_depth: 3, optimizations: HashSet::new(), mode: Mode::Verification }
    }
}

/// Small fluent builder over `Config`, in the spirit of a compiler driver
/// that exposes one setter per knob instead of forcing callers to build
/// the record field-by-field.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: Config,
}

impl Verifier {
    pub fn new() -> Self {
        Self { config: Config::default() }
    }

    pub fn unroll_depth(mut self, depth: u32) -> Self {
        self.config.unroll_depth = depth;
        self
    }

    pub fn optimizations(mut self, kinds: impl IntoIterator<Item = OptimizationKind>) -> Self {
        self.config.optimizations = kinds.into_iter().collect();
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn verify(&self, text: &str) -> Result<VerificationResult, VerifierError> {
        verify(text, &self.config)
    }

    pub fn equiv(&self, text1: &str, text2: &str) -> Result<EquivalenceResult, VerifierError> {
        equiv(text1, text2, &self.config)
    }
}

fn build_program(text: &str, cfg: &Config, file_name: &str) -> Result<crate::ssa::SsaProgram, VerifierError> {
    if !(1..=10).contains(&cfg.unroll_depth) {
        return Err(VerifierError::Semantic { source: crate::error::SemanticError::InvalidUnrollDepth { depth: cfg.unroll_depth } });
    }
    let parsed = parse_source(text, file_name)?;
    let unrolled = unroll_program(parsed.statements, cfg.unroll_depth);
    let ssa = build_ssa(&unrolled)?;
    Ok(optimizations::apply(ssa, &cfg.optimizations))
}

/// Verify that every assertion in `text` holds on every execution bounded
/// by `cfg.unroll_depth`.
pub fn verify(text: &str, cfg: &Config) -> Result<VerificationResult, VerifierError> {
    let program = build_program(text, cfg, "program.vb")?;
    Ok(verification::check_program(&program)?)
}

/// Check that `text1` and `text2` agree on every common output variable
/// under the same bound.
pub fn equiv(text1: &str, text2: &str, cfg: &Config) -> Result<EquivalenceResult, VerifierError> {
    let program1 = build_program(text1, cfg, "program1.vb")?;
    let program2 = build_program(text2, cfg, "program2.vb")?;
    Ok(verification::check_equivalence(&program1, &program2)?)
}
