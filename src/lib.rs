// SPDX-License-Identifier: Apache-2.0

//! Catalog of identity reversible circuits over {NOT, CNOT, CCNOT}:
//! exact truth-table simulation, SAT-based synthesis of inverse circuits,
//! breadth-first enumeration of equivalence classes under commutation /
//! rotation / reversal / relabeling moves, and a deduplicating store of
//! dimension groups, representatives, and equivalents.

pub mod catalog;
pub mod circuit;
pub mod cnf;
pub mod error;
pub mod gate;
pub mod seed;
pub mod solver;
pub mod synth;
pub mod truth_table;
pub mod unroller;
