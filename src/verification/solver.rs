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

//! Z3-backed solver for linear integer arithmetic formulas.
//!
//! `Formula` distinguishes integer and boolean variables at the
//! constructor level so a malformed comparison (e.g. comparing two
//! booleans with `<`) is a type error the encoder rejects before it ever
//! reaches here, rather than something this layer has to guess at.

use crate::error::SolverError;
use std::collections::HashMap;
use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, SatResult, Solver};

#[derive(Debug, Clone)]
pub enum Formula {
    BoolConst(bool),
    IntConst(i64),
    BoolVar(String),
    IntVar(String),
    Eq(Box<Formula>, Box<Formula>),
    Ne(Box<Formula>, Box<Formula>),
    Lt(Box<Formula>, Box<Formula>),
    Le(Box<Formula>, Box<Formula>),
    Gt(Box<Formula>, Box<Formula>),
    Ge(Box<Formula>, Box<Formula>),
    Add(Box<Formula>, Box<Formula>),
    Sub(Box<Formula>, Box<Formula>),
    Mul(Box<Formula>, Box<Formula>),
    Div(Box<Formula>, Box<Formula>),
    Mod(Box<Formula>, Box<Formula>),
    Neg(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Not(Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    /// Integer-valued if-then-else, used only to coerce a boolean-valued
    /// expression into the integer sort every SSA variable carries.
    IteInt(Box<Formula>, Box<Formula>, Box<Formula>),
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::BoolConst(b) => write!(f, "{}", b),
            Formula::IntConst(n) => write!(f, "{}", n),
            Formula::BoolVar(name) | Formula::IntVar(name) => write!(f, "{}", name),
            Formula::Eq(l, r) => write!(f, "({} = {})", l, r),
            Formula::Ne(l, r) => write!(f, "({} != {})", l, r),
            Formula::Lt(l, r) => write!(f, "({} < {})", l, r),
            Formula::Le(l, r) => write!(f, "({} <= {})", l, r),
            Formula::Gt(l, r) => write!(f, "({} > {})", l, r),
            Formula::Ge(l, r) => write!(f, "({} >= {})", l, r),
            Formula::Add(l, r) => write!(f, "({} + {})", l, r),
            Formula::Sub(l, r) => write!(f, "({} - {})", l, r),
            Formula::Mul(l, r) => write!(f, "({} * {})", l, r),
            Formula::Div(l, r) => write!(f, "({} / {})", l, r),
            Formula::Mod(l, r) => write!(f, "({} % {})", l, r),
            Formula::Neg(e) => write!(f, "(-{})", e),
            Formula::And(fs) => write!(f, "({})", fs.iter().map(ToString::to_string).collect::<Vec<_>>().join(" && ")),
            Formula::Or(fs) => write!(f, "({})", fs.iter().map(ToString::to_string).collect::<Vec<_>>().join(" || ")),
            Formula::Not(e) => write!(f, "!{}", e),
            Formula::Implies(l, r) => write!(f, "({} => {})", l, r),
            Formula::IteInt(c, t, e) => write!(f, "(if {} then {} else {})", c, t, e),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SolverValue {
    Int(i64),
    Bool(bool),
}

/// A satisfying assignment returned alongside a failed obligation.
pub struct Model {
    pub assignments: HashMap<String, SolverValue>,
}

pub enum CheckResult {
    Verified,
    Failed(Model),
}

enum Sorted<'ctx> {
    Int(Int<'ctx>),
    Bool(Bool<'ctx>),
}

impl<'ctx> Sorted<'ctx> {
    fn as_int(&self) -> Result<&Int<'ctx>, SolverError> {
        match self {
            Sorted::Int(i) => Ok(i),
            Sorted::Bool(_) => Err(SolverError::Internal { message: "expected an integer term".to_string() }),
        }
    }

    fn as_bool(&self) -> Result<&Bool<'ctx>, SolverError> {
        match self {
            Sorted::Bool(b) => Ok(b),
            Sorted::Int(_) => Err(SolverError::Internal { message: "expected a boolean term".to_string() }),
        }
    }
}

pub struct SmtSolver {
    context: Context,
}

impl SmtSolver {
    pub fn new() -> Self {
        let config = Config::new();
        let context = Context::new(&config);
        Self { context }
    }

    /// Check that `formula` holds on every input by asserting its
    /// negation and looking for a satisfying assignment.
    pub fn check_valid(&self, formula: &Formula, blocked: &[HashMap<String, SolverValue>]) -> Result<CheckResult, SolverError> {
        let solver = Solver::new(&self.context);
        let mut int_vars = HashMap::new();
        let mut bool_vars = HashMap::new();

        let encoded = self.translate(formula, &mut int_vars, &mut bool_vars)?;
        let negated = encoded.as_bool()?.not();
        solver.assert(&negated);

        for assignment in blocked {
            let mut diffs = Vec::new();
            for (name, value) in assignment {
                match value {
                    SolverValue::Int(n) => {
                        if let Some(var) = int_vars.get(name) {
                            diffs.push(var._eq(&Int::from_i64(&self.context, *n)).not());
                        }
                    }
                    SolverValue::Bool(b) => {
                        if let Some(var) = bool_vars.get(name) {
                            diffs.push(var._eq(&Bool::from_bool(&self.context, *b)).not());
                        }
                    }
                }
            }
            if !diffs.is_empty() {
                let refs: Vec<&Bool> = diffs.iter().collect();
                solver.assert(&Bool::or(&self.context, &refs));
            }
        }

        match solver.check() {
            SatResult::Unsat => Ok(CheckResult::Verified),
            SatResult::Sat => {
                let model = solver.get_model().ok_or(SolverError::NoModel)?;
                let mut assignments = HashMap::new();
                for (name, var) in &int_vars {
                    if let Some(value) = model.eval(var, true) {
                        if let Some(v) = value.as_i64() {
                            assignments.insert(name.clone(), SolverValue::Int(v));
                        }
                    }
                }
                for (name, var) in &bool_vars {
                    if let Some(value) = model.eval(var, true) {
                        if let Some(v) = value.as_bool() {
                            assignments.insert(name.clone(), SolverValue::Bool(v));
                        }
                    }
                }
                Ok(CheckResult::Failed(Model { assignments }))
            }
            SatResult::Unknown => Err(SolverError::Unknown { context: solver.get_reason_unknown().unwrap_or_default() }),
        }
    }

    /// Find a satisfying assignment for `formula` directly, with no
    /// negation — used to produce a witness execution when a program
    /// verifies.
    pub fn find_model(&self, formula: &Formula) -> Result<Option<HashMap<String, SolverValue>>, SolverError> {
        let solver = Solver::new(&self.context);
        let mut int_vars = HashMap::new();
        let mut bool_vars = HashMap::new();

        let encoded = self.translate(formula, &mut int_vars, &mut bool_vars)?;
        solver.assert(encoded.as_bool()?);

        match solver.check() {
            SatResult::Sat => {
                let model = solver.get_model().ok_or(SolverError::NoModel)?;
                let mut assignments = HashMap::new();
                for (name, var) in &int_vars {
                    if let Some(value) = model.eval(var, true) {
                        if let Some(v) = value.as_i64() {
                            assignments.insert(name.clone(), SolverValue::Int(v));
                        }
                    }
                }
                for (name, var) in &bool_vars {
                    if let Some(value) = model.eval(var, true) {
                        if let Some(v) = value.as_bool() {
                            assignments.insert(name.clone(), SolverValue::Bool(v));
                        }
                    }
                }
                Ok(Some(assignments))
            }
            SatResult::Unsat => Ok(None),
            SatResult::Unknown => Err(SolverError::Unknown { context: solver.get_reason_unknown().unwrap_or_default() }),
        }
    }

    fn translate<'ctx>(
        &'ctx self,
        formula: &Formula,
        int_vars: &mut HashMap<String, Int<'ctx>>,
        bool_vars: &mut HashMap<String, Bool<'ctx>>,
    ) -> Result<Sorted<'ctx>, SolverError> {
        match formula {
            Formula::BoolConst(b) => Ok(Sorted::Bool(Bool::from_bool(&self.context, *b))),
            Formula::IntConst(n) => Ok(Sorted::Int(Int::from_i64(&self.context, *n))),
            Formula::IntVar(name) => {
                let var = int_vars.entry(name.clone()).or_insert_with(|| Int::new_const(&self.context, name.clone()));
                Ok(Sorted::Int(var.clone()))
            }
            Formula::BoolVar(name) => {
                let var = bool_vars.entry(name.clone()).or_insert_with(|| Bool::new_const(&self.context, name.clone()));
                Ok(Sorted::Bool(var.clone()))
            }
            Formula::Eq(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Bool(match (&l, &r) {
                    (Sorted::Int(_), Sorted::Int(_)) => l.as_int()?._eq(r.as_int()?),
                    _ => l.as_bool()?._eq(r.as_bool()?),
                }))
            }
            Formula::Ne(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                let eq = match (&l, &r) {
                    (Sorted::Int(_), Sorted::Int(_)) => l.as_int()?._eq(r.as_int()?),
                    _ => l.as_bool()?._eq(r.as_bool()?),
                };
                Ok(Sorted::Bool(eq.not()))
            }
            Formula::Lt(l, r) => Ok(Sorted::Bool(self.translate(l, int_vars, bool_vars)?.as_int()?.lt(self.translate(r, int_vars, bool_vars)?.as_int()?))),
            Formula::Le(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Bool(l.as_int()?.le(r.as_int()?)))
            }
            Formula::Gt(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Bool(l.as_int()?.gt(r.as_int()?)))
            }
            Formula::Ge(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Bool(l.as_int()?.ge(r.as_int()?)))
            }
            Formula::Add(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Int(Int::add(&self.context, &[l.as_int()?, r.as_int()?])))
            }
            Formula::Sub(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Int(Int::sub(&self.context, &[l.as_int()?, r.as_int()?])))
            }
            Formula::Mul(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Int(Int::mul(&self.context, &[l.as_int()?, r.as_int()?])))
            }
            Formula::Div(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Int(l.as_int()?.div(r.as_int()?)))
            }
            Formula::Mod(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Int(l.as_int()?.modulo(r.as_int()?)))
            }
            Formula::Neg(e) => Ok(Sorted::Int(self.translate(e, int_vars, bool_vars)?.as_int()?.unary_minus())),
            Formula::And(fs) => {
                let mut terms = Vec::with_capacity(fs.len());
                for formula in fs {
                    terms.push(self.translate(formula, int_vars, bool_vars)?);
                }
                let bools: Result<Vec<&Bool>, SolverError> = terms.iter().map(Sorted::as_bool).collect();
                Ok(Sorted::Bool(Bool::and(&self.context, &bools?)))
            }
            Formula::Or(fs) => {
                let mut terms = Vec::with_capacity(fs.len());
                for formula in fs {
                    terms.push(self.translate(formula, int_vars, bool_vars)?);
                }
                let bools: Result<Vec<&Bool>, SolverError> = terms.iter().map(Sorted::as_bool).collect();
                Ok(Sorted::Bool(Bool::or(&self.context, &bools?)))
            }
            Formula::Not(e) => {
                let e = self.translate(e, int_vars, bool_vars)?;
                Ok(Sorted::Bool(e.as_bool()?.not()))
            }
            Formula::Implies(l, r) => {
                let l = self.translate(l, int_vars, bool_vars)?;
                let r = self.translate(r, int_vars, bool_vars)?;
                Ok(Sorted::Bool(l.as_bool()?.implies(r.as_bool()?)))
            }
            Formula::IteInt(cond, then_branch, else_branch) => {
                let cond = self.translate(cond, int_vars, bool_vars)?;
                let then_branch = self.translate(then_branch, int_vars, bool_vars)?;
                let else_branch = self.translate(else_branch, int_vars, bool_vars)?;
                Ok(Sorted::Int(cond.as_bool()?.ite(then_branch.as_int()?, else_branch.as_int()?)))
            }
        }
    }
}

impl Default for SmtSolver {
    fn default() -> Self {
        Self::new()
    }
}
