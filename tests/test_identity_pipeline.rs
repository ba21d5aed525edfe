// SPDX-License-Identifier: Apache-2.0

//! End-to-end pipeline: seed an identity, catalog it, unroll its class,
//! and fold the equivalents back in.

use revsynth::catalog::store::MemStore;
use revsynth::catalog::Catalog;
use revsynth::circuit::Circuit;
use revsynth::gate::Gate;
use revsynth::seed::{SeedGenerator, SeedOptions};
use revsynth::solver::Backend;
use revsynth::unroller::{unroll, CancelToken};

fn fresh_catalog() -> Catalog<MemStore> {
    Catalog::open(MemStore::new())
}

#[test]
fn test_seed_unroll_fold_pipeline() {
    let mut catalog = fresh_catalog();
    let mut generator = SeedGenerator::new(11, Backend::Varisat);
    let cancel = CancelToken::new();

    let outcome = generator
        .generate(3, 4, &SeedOptions::default(), &cancel)
        .unwrap();
    assert!(outcome.identity.simulate().is_identity());

    let inserted = catalog.insert_identity(&outcome.identity).unwrap();
    assert!(inserted.was_new);
    let representatives = catalog.list_representatives(3, 4);
    assert_eq!(representatives.len(), 1);
    let rep = representatives[0].clone();
    assert_eq!(rep.circuit_id, inserted.id);
    assert!(!rep.fully_unrolled);

    let class = unroll(&outcome.identity, 10, &cancel).unwrap();
    assert!(!class.circuits.is_empty());
    assert!(class.circuits.len() <= 10);
    for circuit in &class.circuits {
        assert!(circuit.simulate().is_identity());
        assert_eq!(circuit.width(), 3);
        assert_eq!(circuit.len(), 4);
        assert_eq!(circuit.composition(), outcome.identity.composition());
    }

    let stats = catalog.fold_equivalents(rep.id, &class).unwrap();
    assert_eq!(stats.inserted + stats.duplicates + stats.adopted, class.circuits.len());
    let rep_after = catalog.list_representatives(3, 4)[0].clone();
    assert_eq!(rep_after.fully_unrolled, class.fully_unrolled);

    // Every folded equivalent points at the surviving representative.
    for row in catalog.circuits_in_dim_group(3, 4) {
        if row.id != rep.circuit_id {
            assert_eq!(row.representative_id, Some(rep.id));
        }
    }
}

#[test]
fn test_catalog_snapshot_survives_reopen() {
    let dir = std::env::temp_dir().join("revsynth-pipeline-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("catalog.json");
    std::fs::remove_file(&path).ok();

    let mut catalog = fresh_catalog();
    let mut circuit = Circuit::new(2).unwrap();
    circuit.push(Gate::cnot(0, 1).unwrap()).unwrap();
    circuit.push(Gate::cnot(0, 1).unwrap()).unwrap();
    let first = catalog.insert_identity(&circuit).unwrap();
    catalog.into_store().save(&path).unwrap();

    let mut reopened = Catalog::open(MemStore::load(&path).unwrap());
    // The identity is still known and keeps its id; new ids continue past
    // it.
    let again = reopened.insert_identity(&circuit).unwrap();
    assert!(!again.was_new);
    assert_eq!(again.id, first.id);
    let mut other = Circuit::new(2).unwrap();
    other.push(Gate::cnot(1, 0).unwrap()).unwrap();
    other.push(Gate::cnot(1, 0).unwrap()).unwrap();
    let second = reopened.insert_identity(&other).unwrap();
    assert!(second.was_new);
    assert!(second.id > first.id);
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_double_cnot_class_scenario() {
    // The [cnot(0;1), cnot(0;1)] identity on two wires: its class is
    // itself plus the relabeled [cnot(1;0), cnot(1;0)].
    let mut circuit = Circuit::new(2).unwrap();
    circuit.push(Gate::cnot(0, 1).unwrap()).unwrap();
    circuit.push(Gate::cnot(0, 1).unwrap()).unwrap();
    let class = unroll(&circuit, usize::MAX, &CancelToken::new()).unwrap();
    assert!(class.fully_unrolled);
    assert_eq!(class.circuits.len(), 2);

    let mut catalog = fresh_catalog();
    catalog.insert_identity(&circuit).unwrap();
    let rep = catalog.list_representatives(2, 2)[0].clone();
    let stats = catalog.fold_equivalents(rep.id, &class).unwrap();
    assert_eq!(stats.inserted, 1);
    assert_eq!(catalog.dim_group(2, 2).unwrap().circuit_count, 2);

    // Folding the same class again is a no-op for the counts.
    let stats = catalog.fold_equivalents(rep.id, &class).unwrap();
    assert_eq!(stats.inserted, 0);
    assert_eq!(stats.duplicates, class.circuits.len());
    assert_eq!(catalog.dim_group(2, 2).unwrap().circuit_count, 2);
}

#[test]
fn test_unroll_bound_reports_truncation_to_catalog() {
    let mut circuit = Circuit::new(3).unwrap();
    for gate in [
        Gate::not(0),
        Gate::cnot(0, 1).unwrap(),
        Gate::cnot(0, 1).unwrap(),
        Gate::not(0),
    ] {
        circuit.push(gate).unwrap();
    }
    let mut catalog = fresh_catalog();
    catalog.insert_identity(&circuit).unwrap();
    let rep = catalog.list_representatives(3, 4)[0].clone();

    let truncated = unroll(&circuit, 2, &CancelToken::new()).unwrap();
    assert!(!truncated.fully_unrolled);
    catalog.fold_equivalents(rep.id, &truncated).unwrap();
    assert!(!catalog.list_representatives(3, 4)[0].fully_unrolled);

    let complete = unroll(&circuit, usize::MAX, &CancelToken::new()).unwrap();
    assert!(complete.fully_unrolled);
    assert!(complete.circuits.len() > truncated.circuits.len());
    catalog.fold_equivalents(rep.id, &complete).unwrap();
    assert!(catalog.list_representatives(3, 4)[0].fully_unrolled);
}
