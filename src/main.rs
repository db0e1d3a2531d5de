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

//! Command-line front end for the verifier.

use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process;
use veribound::error::{DetailedErrorReporter, ErrorReporter, VerifierError};
use veribound::optimizations::OptimizationKind;
use veribound::{Config, EquivalenceResult, Mode, VerificationResult};

#[derive(Parser)]
#[command(name = "veribound")]
#[command(about = "Bounded SMT-backed verifier for a small imperative language", long_about = None)]
#[command(version)]
struct Cli {
    /// Print intermediate SSA and SMT text alongside the result
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit the result as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every assertion holds on every bounded execution
    Verify {
        /// Source file to verify
        input: PathBuf,

        /// Loop unrolling bound (1-10)
        #[arg(short = 'k', long, default_value = "3")]
        unroll_depth: u32,

        /// Optimization passes to apply before encoding
        #[arg(short = 'O', long = "opt", value_enum)]
        optimizations: Vec<OptLevel>,
    },

    /// Check that two programs agree on every common output variable
    Equiv {
        /// First source file
        input1: PathBuf,

        /// Second source file
        input2: PathBuf,

        /// Loop unrolling bound (1-10)
        #[arg(short = 'k', long, default_value = "3")]
        unroll_depth: u32,

        /// Optimization passes to apply before encoding
        #[arg(short = 'O', long = "opt", value_enum)]
        optimizations: Vec<OptLevel>,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OptLevel {
    ConstProp,
    DeadCode,
    Cse,
}

fn optimization_set(levels: &[OptLevel]) -> HashSet<OptimizationKind> {
    levels
        .iter()
        .map(|level| match level {
            OptLevel::ConstProp => OptimizationKind::ConstantPropagation,
            OptLevel::DeadCode => OptimizationKind::DeadCodeElimination,
            OptLevel::Cse => OptimizationKind::CommonSubexpressionElimination,
        })
        .collect()
}

fn read_source(path: &PathBuf) -> Result<String, VerifierError> {
    Ok(std::fs::read_to_string(path)?)
}

fn print_verification_result(result: &VerificationResult, verbose: bool, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(result).unwrap());
        return;
    }

    if result.ok {
        println!("VERIFIED");
        for example in &result.examples {
            println!("  example: {}", format_var_map(example));
        }
    } else {
        println!("FAILED");
        for counterexample in &result.counterexamples {
            println!("  counterexample: {}", format_var_map(counterexample));
        }
    }

    if verbose {
        println!("\n-- SSA --\n{}", result.ssa_text);
        println!("\n-- SMT --\n{}", result.smt_text);
    }
}

fn print_equivalence_result(result: &EquivalenceResult, verbose: bool, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(result).unwrap());
        return;
    }

    if result.ok {
        println!("EQUIVALENT");
        for example in &result.examples {
            println!("  example: {}", format_var_map(example));
        }
    } else {
        println!("NOT EQUIVALENT");
        for counterexample in &result.counterexamples {
            let rendered: Vec<String> = counterexample
                .iter()
                .map(|(name, (a, b))| format!("{}: {} vs {}", name, a, b))
                .collect();
            println!("  counterexample: {}", rendered.join(", "));
        }
    }

    if verbose {
        println!("\n-- SSA (program 1) --\n{}", result.ssa1_text);
        println!("\n-- SSA (program 2) --\n{}", result.ssa2_text);
        println!("\n-- SMT --\n{}", result.smt_text);
    }
}

fn format_var_map(map: &veribound::VarMap) -> String {
    map.iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn run(cli: &Cli) -> Result<bool, VerifierError> {
    match &cli.command {
        Commands::Verify { input, unroll_depth, optimizations } => {
            let source = read_source(input)?;
            let cfg = Config {
                unroll_depth: *unroll_depth,
                optimizations: optimization_set(optimizations),
                mode: Mode::Verification,
            };
            let result = veribound::verify(&source, &cfg)?;
            let ok = result.ok;
            print_verification_result(&result, cli.verbose, cli.json);
            Ok(ok)
        }
        Commands::Equiv { input1, input2, unroll_depth, optimizations } => {
            let source1 = read_source(input1)?;
            let source2 = read_source(input2)?;
            let cfg = Config {
                unroll_depth: *unroll_depth,
                optimizations: optimization_set(optimizations),
                mode: Mode::Equivalence,
            };
            let result = veribound::equiv(&source1, &source2, &cfg)?;
            let ok = result.ok;
            print_equivalence_result(&result, cli.verbose, cli.json);
            Ok(ok)
        }
    }
}

/// Render `err` with surrounding source context where one of the span-carrying
/// phases raised it, falling back to the plain single-line reporter for
/// phases `DetailedErrorReporter` doesn't cover (solver, I/O).
fn report(err: &VerifierError) {
    let mut detailed = DetailedErrorReporter::new();
    match err {
        VerifierError::Lex { source } => detailed.report_lex_error(source),
        VerifierError::Parse { source } => detailed.report_parse_error(source),
        VerifierError::Semantic { source } => detailed.report_semantic_error(source),
        VerifierError::Solver { .. } | VerifierError::Io { .. } => {
            ErrorReporter::new(true).report_error(err);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            report(&err);
            process::exit(2);
        }
    }
}
