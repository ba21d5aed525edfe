// SPDX-License-Identifier: Apache-2.0

//! SAT driver: submit a clause set, get back a model or `Unsat`.
//!
//! The default backend is varisat, run in process. External solver
//! binaries (cadical, kissat, minisat, glucose) are fed DIMACS on stdin
//! and their stdout is parsed leniently: any output mentioning "unsat"
//! means unsatisfiable, otherwise the signed integers on non-comment
//! lines are the assignment.

use std::io::Write;
use std::process::{Command, Stdio};

use varisat::ExtendFormula;

use crate::cnf::{Cnf, Model};
use crate::error::{Error, Result};

/// External solver names we know how to invoke, with the flags that keep
/// their stdout down to the solution lines.
const EXTERNAL_SOLVERS: &[(&str, &[&str])] = &[
    ("cadical", &["-q"]),
    ("kissat", &["-q"]),
    ("minisat", &[]),
    ("glucose", &["-model"]),
];

#[derive(Debug, Clone)]
pub enum Backend {
    /// In-process varisat solver.
    Varisat,
    /// An external solver binary driven over DIMACS.
    External { name: String, args: Vec<String> },
}

impl Backend {
    /// Selects a backend by name; `varisat` is the in-process solver.
    pub fn by_name(name: &str) -> Result<Backend> {
        if name == "varisat" {
            return Ok(Backend::Varisat);
        }
        for (known, args) in EXTERNAL_SOLVERS {
            if *known == name {
                return Ok(Backend::External {
                    name: name.to_string(),
                    args: args.iter().map(|a| a.to_string()).collect(),
                });
            }
        }
        Err(Error::SolverFailure(format!(
            "unsupported solver '{}'",
            name
        )))
    }
}

impl Default for Backend {
    fn default() -> Backend {
        Backend::Varisat
    }
}

#[derive(Debug)]
pub enum SolveOutcome {
    Sat(Model),
    Unsat,
}

/// Runs one blocking solver invocation over the clause buffer.
pub fn solve(cnf: &Cnf, backend: &Backend) -> Result<SolveOutcome> {
    match backend {
        Backend::Varisat => solve_varisat(cnf),
        Backend::External { name, args } => solve_external(cnf, name, args),
    }
}

fn solve_varisat(cnf: &Cnf) -> Result<SolveOutcome> {
    let mut solver = varisat::Solver::new();
    let mut clause_lits = Vec::new();
    for clause in cnf.clauses() {
        clause_lits.clear();
        clause_lits.extend(
            clause
                .iter()
                .map(|&lit| varisat::Lit::from_dimacs(lit as isize)),
        );
        solver.add_clause(&clause_lits);
    }
    match solver.solve() {
        Ok(false) => Ok(SolveOutcome::Unsat),
        Ok(true) => {
            let model = solver
                .model()
                .ok_or_else(|| Error::SolverFailure("sat result carried no model".to_string()))?;
            let assignments: Vec<i32> = model.iter().map(|lit| lit.to_dimacs() as i32).collect();
            Ok(SolveOutcome::Sat(Model::from_assignments(
                cnf.var_count(),
                &assignments,
            )))
        }
        Err(e) => Err(Error::SolverFailure(format!("varisat: {:?}", e))),
    }
}

fn solve_external(cnf: &Cnf, name: &str, args: &[String]) -> Result<SolveOutcome> {
    let mut child = Command::new(name)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::SolverFailure(format!("failed to launch {}: {}", name, e)))?;
    {
        let stdin = child.stdin.as_mut().expect("stdin was piped");
        stdin
            .write_all(cnf.to_dimacs().as_bytes())
            .map_err(|e| Error::SolverFailure(format!("{}: stdin write failed: {}", name, e)))?;
    }
    let output = child
        .wait_with_output()
        .map_err(|e| Error::SolverFailure(format!("{}: {}", name, e)))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    log::debug!("{} produced {} bytes of output", name, stdout.len());
    parse_solver_output(cnf.var_count(), &stdout)
}

/// Parses solver stdout: comment lines are skipped, an "unsat" token means
/// unsatisfiable, and otherwise the signed assignment integers are
/// collected from the remaining lines.
fn parse_solver_output(var_count: i32, stdout: &str) -> Result<SolveOutcome> {
    let lower = stdout.to_lowercase();
    let mut saw_sat = false;
    let mut assignments = Vec::new();
    for line in lower.lines() {
        let line = line.trim();
        if line.starts_with('c') {
            continue;
        }
        if line.contains("unsat") {
            return Ok(SolveOutcome::Unsat);
        }
        if line.contains("sat") {
            saw_sat = true;
        }
        for token in line.split_whitespace() {
            if let Ok(value) = token.parse::<i32>() {
                if value != 0 {
                    assignments.push(value);
                }
            }
        }
    }
    if !saw_sat && assignments.is_empty() {
        return Err(Error::SolverFailure(
            "unrecognized solver output".to_string(),
        ));
    }
    Ok(SolveOutcome::Sat(Model::from_assignments(
        var_count,
        &assignments,
    )))
}
