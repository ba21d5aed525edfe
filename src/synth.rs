// SPDX-License-Identifier: Apache-2.0

//! SAT encoding of bounded reversible-circuit synthesis: "does a `k`-gate
//! circuit over {NOT, CNOT, CCNOT} realize permutation `P`?".
//!
//! The encoding tracks one boolean per (time step, input row, wire bit) and
//! one selector per candidate gate per step. Exactly one selector holds per
//! step; the chosen gate's transition clauses relate step `t-1` to step `t`
//! while every other candidate's clauses are disabled by its own selector
//! guard.

use std::collections::HashMap;

use crate::circuit::Circuit;
use crate::cnf::{Cnf, Lit, Model};
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::solver::{solve, Backend, SolveOutcome};
use crate::truth_table::TruthTable;

/// Encoder ceiling: `2^w` rows per time step get expensive fast.
pub const MAX_SYNTH_WIDTH: usize = 8;
pub const MAX_GATE_BUDGET: usize = 64;

/// Enumerates every valid candidate gate for `width`, in a fixed order:
/// NOTs by target, then CNOTs by (target, control), then CCNOTs by
/// (target, control pair). Sizes: `w`, `w(w-1)`, `w * C(w-1, 2)`.
pub fn gate_library(width: usize) -> Vec<Gate> {
    let mut library = Vec::new();
    for target in 0..width {
        library.push(Gate::not(target));
    }
    for target in 0..width {
        for control in 0..width {
            if control != target {
                library.push(Gate::cnot(control, target).expect("wires are distinct"));
            }
        }
    }
    for target in 0..width {
        for c0 in 0..width {
            for c1 in c0 + 1..width {
                if c0 != target && c1 != target {
                    library.push(Gate::ccnot(c0, c1, target).expect("wires are distinct"));
                }
            }
        }
    }
    library
}

pub struct SynthesisEncoding {
    width: usize,
    budget: usize,
    cnf: Cnf,
    library: Vec<Gate>,
    gate_index: HashMap<Gate, usize>,
    /// selectors[t][v]: gate `library[v]` is the one applied at step `t+1`.
    selectors: Vec<Vec<Lit>>,
}

impl SynthesisEncoding {
    /// Builds the CNF for "some `budget`-gate circuit realizes `target`".
    pub fn build(target: &TruthTable, budget: usize) -> Result<SynthesisEncoding> {
        let width = target.width();
        if width > MAX_SYNTH_WIDTH {
            return Err(Error::EncodingLimit(format!(
                "synthesis width {} exceeds maximum {}",
                width, MAX_SYNTH_WIDTH
            )));
        }
        if budget > MAX_GATE_BUDGET {
            return Err(Error::EncodingLimit(format!(
                "gate budget {} exceeds maximum {}",
                budget, MAX_GATE_BUDGET
            )));
        }
        let rows = target.len();
        let library = gate_library(width);
        let mut cnf = Cnf::new();

        // state[t][i][b]: bit b of row i after t gates.
        let state: Vec<Vec<Vec<Lit>>> = (0..=budget)
            .map(|_| (0..rows).map(|_| cnf.new_vars(width)).collect())
            .collect();

        for (i, row) in state[0].iter().enumerate() {
            for (b, &lit) in row.iter().enumerate() {
                cnf.fix(lit, i >> b & 1 == 1);
            }
        }
        for (i, row) in state[budget].iter().enumerate() {
            for (b, &lit) in row.iter().enumerate() {
                cnf.fix(lit, target.bit(i, b));
            }
        }

        let mut selectors = Vec::with_capacity(budget);
        for t in 1..=budget {
            let step_selectors = cnf.new_vars(library.len());
            cnf.exactly_one(&step_selectors);

            for (v, gate) in library.iter().enumerate() {
                let sel = step_selectors[v];
                let target_bit = gate.target();
                for i in 0..rows {
                    let prev = &state[t - 1][i];
                    let cur = &state[t][i];
                    if gate.controls().is_empty() {
                        // Unconditional flip: sel -> (cur = !prev).
                        cnf.add_clause(&[-sel, prev[target_bit], cur[target_bit]]);
                        cnf.add_clause(&[-sel, -prev[target_bit], -cur[target_bit]]);
                    } else {
                        // fire <-> sel AND all control bits at t-1.
                        let fire = cnf.new_var();
                        let mut conjuncts = Vec::with_capacity(gate.controls().len() + 1);
                        conjuncts.push(sel);
                        conjuncts.extend(gate.controls().iter().map(|&c| prev[c]));
                        cnf.equals_and(fire, &conjuncts);
                        cnf.xor3_if(sel, cur[target_bit], prev[target_bit], fire);
                    }
                    for b in 0..width {
                        if b != target_bit {
                            cnf.iff_if(sel, cur[b], prev[b]);
                        }
                    }
                }
            }
            selectors.push(step_selectors);
        }

        let gate_index = library
            .iter()
            .enumerate()
            .map(|(v, &gate)| (gate, v))
            .collect();
        Ok(SynthesisEncoding {
            width,
            budget,
            cnf,
            library,
            gate_index,
            selectors,
        })
    }

    pub fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    /// Blocks `circuit` from appearing as a contiguous gate run at any
    /// layer alignment, so repeated queries enumerate distinct solutions.
    pub fn exclude(&mut self, circuit: &Circuit) -> Result<()> {
        if circuit.width() != self.width {
            return Err(Error::InvalidCircuit(format!(
                "excluded circuit has width {}, encoding has {}",
                circuit.width(),
                self.width
            )));
        }
        let gates = circuit.gates();
        if gates.len() > self.budget {
            // Cannot occur within the budget; nothing to emit.
            return Ok(());
        }
        let mut indices = Vec::with_capacity(gates.len());
        for gate in gates {
            let v = *self
                .gate_index
                .get(gate)
                .ok_or_else(|| Error::InvalidCircuit(format!("gate {} not in library", gate)))?;
            indices.push(v);
        }
        for shift in 0..=self.budget - gates.len() {
            let clause: Vec<Lit> = indices
                .iter()
                .enumerate()
                .map(|(layer, &v)| -self.selectors[shift + layer][v])
                .collect();
            self.cnf.add_clause(&clause);
        }
        Ok(())
    }

    /// Requires every wire to be touched (target or control) by at least
    /// one chosen gate.
    pub fn forbid_unused_wires(&mut self) {
        for wire in 0..self.width {
            let touching: Vec<Lit> = self
                .selectors
                .iter()
                .flat_map(|step| {
                    step.iter()
                        .enumerate()
                        .filter(|(v, _)| self.library[*v].touches(wire))
                        .map(|(_, &sel)| sel)
                })
                .collect();
            self.cnf.at_least_one(&touching);
        }
    }

    /// Reads the chosen gate sequence out of a satisfying model.
    pub fn decode(&self, model: &Model) -> Result<Circuit> {
        let mut circuit = Circuit::new(self.width)?;
        for (t, step) in self.selectors.iter().enumerate() {
            let mut chosen = step
                .iter()
                .enumerate()
                .filter(|&(_, &sel)| model.value(sel))
                .map(|(v, _)| v);
            let v = chosen.next().ok_or_else(|| {
                Error::SolverFailure(format!("model selects no gate at step {}", t + 1))
            })?;
            if chosen.next().is_some() {
                return Err(Error::SolverFailure(format!(
                    "model selects multiple gates at step {}",
                    t + 1
                )));
            }
            circuit.push(self.library[v])?;
        }
        Ok(circuit)
    }
}

/// Optional structural constraints layered onto a synthesis query.
#[derive(Debug, Default, Clone)]
pub struct SynthesisOptions {
    pub exclude: Vec<Circuit>,
    pub forbid_unused_wires: bool,
}

/// Synthesizes a circuit of exactly `budget` gates realizing `target`, or
/// `Unsat` when none exists.
pub fn synthesize(target: &TruthTable, budget: usize, backend: &Backend) -> Result<Circuit> {
    synthesize_with(target, budget, &SynthesisOptions::default(), backend)
}

pub fn synthesize_with(
    target: &TruthTable,
    budget: usize,
    options: &SynthesisOptions,
    backend: &Backend,
) -> Result<Circuit> {
    let mut encoding = SynthesisEncoding::build(target, budget)?;
    for excluded in &options.exclude {
        encoding.exclude(excluded)?;
    }
    if options.forbid_unused_wires {
        encoding.forbid_unused_wires();
    }
    log::debug!(
        "synthesis query: width={} budget={} vars={} clauses={}",
        target.width(),
        budget,
        encoding.cnf().var_count(),
        encoding.cnf().clauses().len()
    );
    match solve(encoding.cnf(), backend)? {
        SolveOutcome::Sat(model) => {
            let circuit = encoding.decode(&model)?;
            debug_assert_eq!(&circuit.simulate(), target);
            Ok(circuit)
        }
        SolveOutcome::Unsat => Err(Error::Unsat),
    }
}

/// Minimum-length synthesis: tries budgets `0, 1, 2, ..` up to `max_budget`
/// and returns the first SAT answer.
pub fn synthesize_optimal(
    target: &TruthTable,
    max_budget: usize,
    backend: &Backend,
) -> Result<Circuit> {
    for budget in 0..=max_budget {
        match synthesize(target, budget, backend) {
            Ok(circuit) => return Ok(circuit),
            Err(Error::Unsat) => continue,
            Err(other) => return Err(other),
        }
    }
    Err(Error::Unsat)
}
