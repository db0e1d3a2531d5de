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

//! A bounded verifier for a small imperative language.
//!
//! Given one program, checks whether every `assert` holds on every
//! execution bounded by a chosen loop-unrolling depth. Given two
//! programs, checks whether they agree on the final value of every
//! variable they both declare, under the same bound. Both checks are
//! discharged against an SMT solver over linear integer arithmetic;
//! a failing check comes back with a concrete counterexample.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod optimizations;
pub mod parser;
pub mod pipeline;
pub mod ssa;
pub mod verification;

pub use pipeline::{equiv, verify, Config, Mode, Verifier};
pub use verification::{EquivalenceResult, VarMap, VarPairMap, VerificationResult};
