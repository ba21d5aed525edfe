// SPDX-License-Identifier: Apache-2.0

//! Ordered gate sequences and the structural edits the unroller moves are
//! built from. Circuits are never mutated in place by the catalog; every
//! edit returns a new value.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gate::{Gate, GateKind};
use crate::truth_table::{check_permutation, check_width, TruthTable};

/// Tally of gate kinds in a circuit. Relabeling permutes wires but never
/// changes kinds, so every circuit in an equivalence class shares this.
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
pub struct GateComposition {
    pub not: usize,
    pub cnot: usize,
    pub ccnot: usize,
}

impl std::fmt::Display for GateComposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.not, self.cnot, self.ccnot)
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Circuit {
    width: usize,
    gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(width: usize) -> Result<Circuit> {
        check_width(width)?;
        Ok(Circuit {
            width,
            gates: Vec::new(),
        })
    }

    pub fn from_gates(width: usize, gates: Vec<Gate>) -> Result<Circuit> {
        check_width(width)?;
        for gate in &gates {
            gate.validate(width)?;
        }
        Ok(Circuit { width, gates })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn push(&mut self, gate: Gate) -> Result<()> {
        gate.validate(self.width)?;
        self.gates.push(gate);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Gate> {
        self.gates.pop()
    }

    /// Re-checks every gate against the circuit width. Constructors keep
    /// this true; ingest paths (blobs, stores) call it before trusting a
    /// decoded circuit.
    pub fn validate(&self) -> Result<()> {
        check_width(self.width)?;
        for gate in &self.gates {
            gate.validate(self.width)?;
        }
        Ok(())
    }

    /// The half-open gate range `[start, end)` as a new circuit.
    pub fn slice(&self, start: usize, end: usize) -> Result<Circuit> {
        if start > end || end > self.gates.len() {
            return Err(Error::InvalidCircuit(format!(
                "slice {}..{} out of bounds for {} gates",
                start,
                end,
                self.gates.len()
            )));
        }
        Ok(Circuit {
            width: self.width,
            gates: self.gates[start..end].to_vec(),
        })
    }

    /// Gate order reversed. Every gate is self-inverse, so this is the
    /// inverse circuit.
    pub fn reverse(&self) -> Circuit {
        let mut gates = self.gates.clone();
        gates.reverse();
        Circuit {
            width: self.width,
            gates,
        }
    }

    /// Cyclic shift: the first `shift % len` gates move to the back.
    pub fn rotate(&self, shift: usize) -> Circuit {
        if self.gates.is_empty() {
            return self.clone();
        }
        let shift = shift % self.gates.len();
        let mut gates = Vec::with_capacity(self.gates.len());
        gates.extend_from_slice(&self.gates[shift..]);
        gates.extend_from_slice(&self.gates[..shift]);
        Circuit {
            width: self.width,
            gates,
        }
    }

    /// Maps every wire through `perm`, which must be a permutation of
    /// `0..width`.
    pub fn relabel(&self, perm: &[usize]) -> Result<Circuit> {
        check_permutation(perm, self.width)?;
        let gates = self.gates.iter().map(|g| g.relabel(perm)).collect();
        Ok(Circuit {
            width: self.width,
            gates,
        })
    }

    /// True when the gates at `index` and `index + 1` commute.
    pub fn commutes_at(&self, index: usize) -> Result<bool> {
        if index + 1 >= self.gates.len() {
            return Err(Error::InvalidCircuit(format!(
                "no adjacent pair at position {} in {} gates",
                index,
                self.gates.len()
            )));
        }
        Ok(self.gates[index].commutes_with(&self.gates[index + 1]))
    }

    /// Exchanges the adjacent gates at `index` and `index + 1`, failing
    /// with `NonCommuting` when the pair does not commute.
    pub fn swap(&self, index: usize) -> Result<Circuit> {
        if !self.commutes_at(index)? {
            return Err(Error::NonCommuting { index });
        }
        let mut gates = self.gates.clone();
        gates.swap(index, index + 1);
        Ok(Circuit {
            width: self.width,
            gates,
        })
    }

    /// This circuit followed by `other`.
    pub fn concat(&self, other: &Circuit) -> Result<Circuit> {
        if self.width != other.width {
            return Err(Error::InvalidCircuit(format!(
                "cannot concatenate widths {} and {}",
                self.width, other.width
            )));
        }
        let mut gates = self.gates.clone();
        gates.extend_from_slice(&other.gates);
        Ok(Circuit {
            width: self.width,
            gates,
        })
    }

    /// The permutation of `{0,1}^w` obtained by applying the gates left to
    /// right.
    pub fn simulate(&self) -> TruthTable {
        let mut tt = TruthTable::identity(self.width)
            .expect("circuit width was validated at construction");
        for gate in &self.gates {
            tt.apply_gate(gate);
        }
        tt
    }

    pub fn composition(&self) -> GateComposition {
        let mut composition = GateComposition::default();
        for gate in &self.gates {
            match gate.kind() {
                GateKind::Not => composition.not += 1,
                GateKind::Cnot => composition.cnot += 1,
                GateKind::Ccnot => composition.ccnot += 1,
            }
        }
        composition
    }

    /// Canonical byte serialization of the gate sequence: per gate a kind
    /// tag, the target, then sorted controls. Equal fingerprints iff the
    /// circuits are structurally identical (at a fixed width).
    pub fn fingerprint(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.gates.len() * 4);
        for gate in &self.gates {
            gate.encode_into(&mut out);
        }
        out
    }

    /// Decodes a fingerprint blob back into a circuit.
    pub fn from_blob(width: usize, blob: &[u8]) -> Result<Circuit> {
        check_width(width)?;
        let mut gates = Vec::new();
        let mut cursor = 0usize;
        while cursor < blob.len() {
            let kind = GateKind::from_tag(blob[cursor]).ok_or_else(|| {
                Error::InvalidCircuit(format!("unknown gate tag {} in blob", blob[cursor]))
            })?;
            let need = 2 + kind.control_count();
            if cursor + need > blob.len() {
                return Err(Error::InvalidCircuit(
                    "truncated gate encoding in blob".to_string(),
                ));
            }
            let target = blob[cursor + 1] as usize;
            let gate = match kind {
                GateKind::Not => Gate::not(target),
                GateKind::Cnot => Gate::cnot(blob[cursor + 2] as usize, target)?,
                GateKind::Ccnot => {
                    let c0 = blob[cursor + 2] as usize;
                    let c1 = blob[cursor + 3] as usize;
                    if c0 >= c1 {
                        return Err(Error::InvalidCircuit(format!(
                            "blob controls ({}, {}) not in canonical order",
                            c0, c1
                        )));
                    }
                    Gate::ccnot(c0, c1, target)?
                }
            };
            gate.validate(width)?;
            gates.push(gate);
            cursor += need;
        }
        Ok(Circuit { width, gates })
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[w={}]", self.width)?;
        for gate in &self.gates {
            write!(f, " {}", gate)?;
        }
        Ok(())
    }
}
