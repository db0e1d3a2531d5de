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

use veribound::parser::parse_source;
use veribound::ssa::builder::build_ssa;
use veribound::ssa::unroll::unroll_program;
use veribound::ssa::SsaStmt;

fn ssa_for(src: &str, depth: u32) -> veribound::ssa::SsaProgram {
    let program = parse_source(src, "t.vb").expect("parse should succeed");
    let unrolled = unroll_program(program.statements, depth);
    build_ssa(&unrolled).expect("ssa build should succeed")
}

fn contains_while(stmts: &[SsaStmt]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        SsaStmt::While { .. } => true,
        SsaStmt::If { then_branch, else_branch, .. } => {
            contains_while(then_branch) || contains_while(else_branch)
        }
        _ => false,
    })
}

#[test]
fn unrolling_removes_every_while_node() {
    let program = ssa_for("var x:=0; while(x<4){ x:=x+1; }", 5);
    assert!(!contains_while(&program.statements));
}

#[test]
fn nested_if_inside_while_unrolls_cleanly() {
    let src = "var x:=0; var y:=0; while(x<3){ if(x==1){ y:=y+10; } else { y:=y+1; } x:=x+1; } assert y>=0;";
    let program = ssa_for(src, 5);
    assert!(!contains_while(&program.statements));
}

#[test]
fn if_merge_introduces_a_phi_for_each_branch_defined_variable() {
    let program = ssa_for("var x:=3; if(x<5){ var y:=x+1; } else { var y:=x-1; } assert y>0;", 3);
    let has_phi = program.statements.iter().any(|stmt| match stmt {
        SsaStmt::If { phis, .. } => !phis.is_empty(),
        _ => false,
    });
    assert!(has_phi);
}

#[test]
fn each_ssa_version_has_exactly_one_definition() {
    let program = ssa_for("var x:=1; x:=x+1; x:=x+1; if(x>0){ x:=x+1; } else { x:=x-1; }", 3);

    fn collect_defs(stmts: &[SsaStmt], defs: &mut Vec<(String, u32)>) {
        for stmt in stmts {
            match stmt {
                SsaStmt::Decl { name, version, .. } | SsaStmt::Assign { name, version, .. } => {
                    defs.push((name.clone(), *version));
                }
                SsaStmt::Phi(phi) => defs.push((phi.name.clone(), phi.version)),
                SsaStmt::If { then_branch, else_branch, phis, .. } => {
                    collect_defs(then_branch, defs);
                    collect_defs(else_branch, defs);
                    for phi in phis {
                        defs.push((phi.name.clone(), phi.version));
                    }
                }
                SsaStmt::While { .. } => unreachable!(),
                SsaStmt::Assert { .. } => {}
            }
        }
    }

    let mut defs = Vec::new();
    collect_defs(&program.statements, &mut defs);
    let mut sorted = defs.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(defs.len(), sorted.len(), "every (name, version) pair must be defined exactly once");
}

#[test]
fn unroll_depth_bounds_how_many_times_a_false_guard_is_explored() {
    let three = ssa_for("var x:=0; while(x<10){ x:=x+1; }", 3);
    let five = ssa_for("var x:=0; while(x<10){ x:=x+1; }", 5);
    assert!(five.statements.len() >= three.statements.len());
}
