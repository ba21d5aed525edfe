// SPDX-License-Identifier: Apache-2.0

//! Seed generation: draw a random forward circuit, synthesize an inverse
//! for its permutation under a fixed gate budget, and concatenate the two
//! into a verified identity.
//!
//! The forward sampler enforces a local diversity rule (adjacent gates
//! never share a target) so trivially self-cancelling `g, g` pairs do not
//! short-circuit the SAT phase.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::solver::Backend;
use crate::synth::{synthesize_with, SynthesisOptions};
use crate::unroller::CancelToken;

#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Fresh forward circuits drawn before giving up on a dimension.
    pub max_attempts: usize,
    /// Exclude the mirrored forward circuit from the inverse search, so
    /// the SAT phase must find a structurally different inverse.
    pub exclude_mirror: bool,
}

impl Default for SeedOptions {
    fn default() -> SeedOptions {
        SeedOptions {
            max_attempts: 10,
            exclude_mirror: false,
        }
    }
}

/// One successfully generated identity seed.
#[derive(Debug)]
pub struct SeedOutcome {
    pub identity: Circuit,
    pub forward: Circuit,
    pub inverse: Circuit,
    pub attempts: usize,
}

/// Running tallies across `generate` calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeedStats {
    pub successes: usize,
    pub failures: usize,
    pub attempts: usize,
}

pub struct SeedGenerator {
    rng: Pcg64Mcg,
    backend: Backend,
    stats: SeedStats,
}

impl SeedGenerator {
    pub fn new(seed: u64, backend: Backend) -> SeedGenerator {
        SeedGenerator {
            rng: Pcg64Mcg::seed_from_u64(seed),
            backend,
            stats: SeedStats::default(),
        }
    }

    pub fn stats(&self) -> SeedStats {
        self.stats
    }

    /// Generates an identity circuit of exactly `length` gates on `width`
    /// wires: a random forward half plus a SAT-derived inverse half.
    ///
    /// Retries with a fresh forward circuit when the inverse query is
    /// `Unsat` (which can only happen under `exclude_mirror`); all other
    /// errors are terminal.
    pub fn generate(
        &mut self,
        width: usize,
        length: usize,
        options: &SeedOptions,
        cancel: &CancelToken,
    ) -> Result<SeedOutcome> {
        if length % 2 != 0 {
            return Err(Error::InvalidCircuit(format!(
                "identity seed length must be even, got {}",
                length
            )));
        }
        let half = length / 2;
        for attempt in 1..=options.max_attempts.max(1) {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            self.stats.attempts += 1;
            let forward = self.random_forward(width, half)?;
            let target = forward.simulate().inverse();
            let synthesis_options = SynthesisOptions {
                exclude: if options.exclude_mirror {
                    vec![forward.reverse()]
                } else {
                    Vec::new()
                },
                forbid_unused_wires: false,
            };
            match synthesize_with(&target, half, &synthesis_options, &self.backend) {
                Ok(inverse) => {
                    let identity = forward.concat(&inverse)?;
                    debug_assert!(identity.simulate().is_identity());
                    self.stats.successes += 1;
                    log::info!(
                        "seed ({}, {}) found on attempt {}: {}",
                        width,
                        length,
                        attempt,
                        identity
                    );
                    return Ok(SeedOutcome {
                        identity,
                        forward,
                        inverse,
                        attempts: attempt,
                    });
                }
                Err(Error::Unsat) => {
                    log::warn!(
                        "seed ({}, {}) attempt {} unsat, redrawing forward circuit",
                        width,
                        length,
                        attempt
                    );
                    continue;
                }
                Err(other) => {
                    self.stats.failures += 1;
                    return Err(other);
                }
            }
        }
        self.stats.failures += 1;
        Err(Error::Unsat)
    }

    /// A random circuit of `gate_count` gates obeying the diversity rule.
    fn random_forward(&mut self, width: usize, gate_count: usize) -> Result<Circuit> {
        let mut circuit = Circuit::new(width)?;
        let mut previous_target: Option<usize> = None;
        for _ in 0..gate_count {
            let gate = loop {
                let candidate = self.random_gate(width);
                // Width one only has not(0); the rule cannot apply there.
                match previous_target {
                    Some(target) if width > 1 && candidate.target() == target => continue,
                    _ => break candidate,
                }
            };
            previous_target = Some(gate.target());
            circuit.push(gate)?;
        }
        Ok(circuit)
    }

    fn random_gate(&mut self, width: usize) -> Gate {
        // Kinds that exist at this width: NOT always, CNOT from two wires,
        // CCNOT from three.
        let kinds = match width {
            1 => 1,
            2 => 2,
            _ => 3,
        };
        match self.rng.gen_range(0..kinds) {
            0 => Gate::not(self.rng.gen_range(0..width)),
            1 => {
                let target = self.rng.gen_range(0..width);
                let control = loop {
                    let wire = self.rng.gen_range(0..width);
                    if wire != target {
                        break wire;
                    }
                };
                Gate::cnot(control, target).expect("wires are distinct")
            }
            _ => {
                let target = self.rng.gen_range(0..width);
                let c0 = loop {
                    let wire = self.rng.gen_range(0..width);
                    if wire != target {
                        break wire;
                    }
                };
                let c1 = loop {
                    let wire = self.rng.gen_range(0..width);
                    if wire != target && wire != c0 {
                        break wire;
                    }
                };
                Gate::ccnot(c0, c1, target).expect("wires are distinct")
            }
        }
    }
}
