// SPDX-License-Identifier: Apache-2.0

//! The reversible gate library: single-target NOT, controlled-NOT, and
//! Toffoli (CCNOT). A gate flips its target bit when every control bit is
//! set; with no controls the flip is unconditional. Every gate is its own
//! inverse.

use crate::error::{Error, Result};

/// Kind tag for a [`Gate`]; also the first byte of its fingerprint encoding.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum GateKind {
    Not,
    Cnot,
    Ccnot,
}

impl GateKind {
    pub fn tag(self) -> u8 {
        match self {
            GateKind::Not => 0,
            GateKind::Cnot => 1,
            GateKind::Ccnot => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<GateKind> {
        match tag {
            0 => Some(GateKind::Not),
            1 => Some(GateKind::Cnot),
            2 => Some(GateKind::Ccnot),
            _ => None,
        }
    }

    /// Number of control wires a gate of this kind carries.
    pub fn control_count(self) -> usize {
        match self {
            GateKind::Not => 0,
            GateKind::Cnot => 1,
            GateKind::Ccnot => 2,
        }
    }
}

/// A reversible gate over wires indexed from zero. Controls are held sorted;
/// construction rejects colliding wires so a `Gate` value is canonical by
/// construction.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Gate {
    Not { target: usize },
    Cnot { control: usize, target: usize },
    Ccnot { controls: [usize; 2], target: usize },
}

impl Gate {
    pub fn not(target: usize) -> Gate {
        Gate::Not { target }
    }

    pub fn cnot(control: usize, target: usize) -> Result<Gate> {
        if control == target {
            return Err(Error::InvalidCircuit(format!(
                "cnot control and target collide on wire {}",
                target
            )));
        }
        Ok(Gate::Cnot { control, target })
    }

    pub fn ccnot(c0: usize, c1: usize, target: usize) -> Result<Gate> {
        if c0 == c1 || c0 == target || c1 == target {
            return Err(Error::InvalidCircuit(format!(
                "ccnot wires must be distinct; got controls ({}, {}) target {}",
                c0, c1, target
            )));
        }
        let controls = if c0 < c1 { [c0, c1] } else { [c1, c0] };
        Ok(Gate::Ccnot { controls, target })
    }

    pub fn kind(&self) -> GateKind {
        match self {
            Gate::Not { .. } => GateKind::Not,
            Gate::Cnot { .. } => GateKind::Cnot,
            Gate::Ccnot { .. } => GateKind::Ccnot,
        }
    }

    pub fn target(&self) -> usize {
        match self {
            Gate::Not { target } => *target,
            Gate::Cnot { target, .. } => *target,
            Gate::Ccnot { target, .. } => *target,
        }
    }

    /// Control wires in ascending order.
    pub fn controls(&self) -> &[usize] {
        match self {
            Gate::Not { .. } => &[],
            Gate::Cnot { control, .. } => std::slice::from_ref(control),
            Gate::Ccnot { controls, .. } => controls,
        }
    }

    /// Checks that every wire the gate names fits within `width`.
    pub fn validate(&self, width: usize) -> Result<()> {
        let target = self.target();
        if target >= width {
            return Err(Error::InvalidCircuit(format!(
                "target wire {} out of bounds for width {}",
                target, width
            )));
        }
        for &control in self.controls() {
            if control >= width {
                return Err(Error::InvalidCircuit(format!(
                    "control wire {} out of bounds for width {}",
                    control, width
                )));
            }
        }
        Ok(())
    }

    /// True when every control bit of `state` is set, i.e. the gate would
    /// flip its target on this input.
    pub fn fires(&self, state: u32) -> bool {
        self.controls().iter().all(|&c| state >> c & 1 == 1)
    }

    /// Applies the gate to a single state value.
    pub fn apply(&self, state: u32) -> u32 {
        if self.fires(state) {
            state ^ (1 << self.target())
        } else {
            state
        }
    }

    /// True when the wire is the gate's target or one of its controls.
    pub fn touches(&self, wire: usize) -> bool {
        self.target() == wire || self.controls().contains(&wire)
    }

    /// Two adjacent gates commute exactly when neither writes a wire that
    /// the other reads or writes.
    pub fn commutes_with(&self, other: &Gate) -> bool {
        !other.touches(self.target()) && !self.touches(other.target())
    }

    /// Maps every wire through `perm`; controls are re-sorted so the result
    /// stays canonical. The caller guarantees `perm` is a permutation.
    pub fn relabel(&self, perm: &[usize]) -> Gate {
        match self {
            Gate::Not { target } => Gate::Not {
                target: perm[*target],
            },
            Gate::Cnot { control, target } => Gate::Cnot {
                control: perm[*control],
                target: perm[*target],
            },
            Gate::Ccnot { controls, target } => {
                let c0 = perm[controls[0]];
                let c1 = perm[controls[1]];
                Gate::Ccnot {
                    controls: if c0 < c1 { [c0, c1] } else { [c1, c0] },
                    target: perm[*target],
                }
            }
        }
    }

    /// Appends the fingerprint encoding: kind tag, target, sorted controls.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.kind().tag());
        out.push(self.target() as u8);
        for &control in self.controls() {
            out.push(control as u8);
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::Not { target } => write!(f, "not({})", target),
            Gate::Cnot { control, target } => write!(f, "cnot({}; {})", control, target),
            Gate::Ccnot { controls, target } => {
                write!(f, "ccnot({}, {}; {})", controls[0], controls[1], target)
            }
        }
    }
}
