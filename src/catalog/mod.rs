// SPDX-License-Identifier: Apache-2.0

//! The identity catalog: deduplicated circuit storage keyed by canonical
//! fingerprint, grouped into `(width, length)` dimension groups, with one
//! elected representative per gate composition and equivalence links from
//! unrolled circuits back to their representative.
//!
//! Every top-level operation executes as one store transaction; the core
//! assumes a single logical writer.

pub mod store;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, GateComposition};
use crate::error::{Error, Result};
use crate::unroller::UnrollOutcome;
use store::{RowStore, Table};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitRow {
    pub id: u64,
    pub width: usize,
    pub length: usize,
    /// Canonical serialization of the gate sequence; identical to
    /// `fingerprint`.
    pub gates_blob: Vec<u8>,
    pub composition_not: usize,
    pub composition_cnot: usize,
    pub composition_ccnot: usize,
    pub fingerprint: Vec<u8>,
    /// Set when this circuit is an equivalent folded under a
    /// representative.
    pub representative_id: Option<u64>,
}

impl CircuitRow {
    pub fn composition(&self) -> GateComposition {
        GateComposition {
            not: self.composition_not,
            cnot: self.composition_cnot,
            ccnot: self.composition_ccnot,
        }
    }

    pub fn to_circuit(&self) -> Result<Circuit> {
        Circuit::from_blob(self.width, &self.gates_blob)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimGroupRow {
    pub id: u64,
    pub width: usize,
    pub length: usize,
    pub circuit_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepresentativeRow {
    pub id: u64,
    pub dim_group_id: u64,
    pub circuit_id: u64,
    pub composition: GateComposition,
    pub fully_unrolled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquivalentRow {
    pub representative_id: u64,
    pub circuit_id: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct InsertOutcome {
    pub id: u64,
    pub was_new: bool,
}

/// Tallies from one `fold_equivalents` call.
#[derive(Debug, Default, Clone, Copy)]
pub struct FoldStats {
    /// Circuits not previously in the catalog.
    pub inserted: usize,
    /// Circuits already present (the representative itself included).
    pub duplicates: usize,
    /// Representatives of the same composition converted to equivalents.
    pub demoted: usize,
    /// Previously unaffiliated circuits linked under the representative.
    pub adopted: usize,
}

impl std::fmt::Display for FoldStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} inserted, {} duplicates, {} demoted, {} adopted",
            self.inserted, self.duplicates, self.demoted, self.adopted
        )
    }
}

fn circuit_key(width: usize, length: usize, fingerprint: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(4 + fingerprint.len());
    key.extend_from_slice(&(width as u16).to_be_bytes());
    key.extend_from_slice(&(length as u16).to_be_bytes());
    key.extend_from_slice(fingerprint);
    key
}

fn dim_group_key(width: usize, length: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(4);
    key.extend_from_slice(&(width as u16).to_be_bytes());
    key.extend_from_slice(&(length as u16).to_be_bytes());
    key
}

fn decode_row<T: for<'a> Deserialize<'a>>(table: Table, bytes: &[u8]) -> T {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|e| panic!("corrupt row in table {}: {}", table.name(), e))
}

fn encode_row<T: Serialize>(row: &T) -> Vec<u8> {
    serde_json::to_vec(row).expect("row types serialize without error")
}

pub struct Catalog<S: RowStore> {
    store: S,
    /// Circuit id to circuits-table key, rebuilt at open.
    key_by_id: HashMap<u64, Vec<u8>>,
    next_circuit_id: u64,
    next_dim_group_id: u64,
    next_representative_id: u64,
}

impl<S: RowStore> Catalog<S> {
    /// Wraps a store, rebuilding the id indexes from its contents.
    pub fn open(store: S) -> Catalog<S> {
        let mut key_by_id = HashMap::new();
        let mut next_circuit_id = 1;
        for (key, bytes) in store.scan(Table::Circuits, &[]) {
            let row: CircuitRow = decode_row(Table::Circuits, &bytes);
            next_circuit_id = next_circuit_id.max(row.id + 1);
            key_by_id.insert(row.id, key);
        }
        let mut next_dim_group_id = 1;
        for (_, bytes) in store.scan(Table::DimGroups, &[]) {
            let row: DimGroupRow = decode_row(Table::DimGroups, &bytes);
            next_dim_group_id = next_dim_group_id.max(row.id + 1);
        }
        let mut next_representative_id = 1;
        for (_, bytes) in store.scan(Table::Representatives, &[]) {
            let row: RepresentativeRow = decode_row(Table::Representatives, &bytes);
            next_representative_id = next_representative_id.max(row.id + 1);
        }
        Catalog {
            store,
            key_by_id,
            next_circuit_id,
            next_dim_group_id,
            next_representative_id,
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Inserts a verified identity circuit, electing it representative of
    /// its `(dim_group, composition)` slot when the slot is empty.
    /// Idempotent: re-inserting returns the existing id with
    /// `was_new = false`.
    pub fn insert_identity(&mut self, circuit: &Circuit) -> Result<InsertOutcome> {
        self.check_admissible(circuit)?;
        let key = circuit_key(circuit.width(), circuit.len(), &circuit.fingerprint());
        if let Some(bytes) = self.store.get(Table::Circuits, &key) {
            let row: CircuitRow = decode_row(Table::Circuits, &bytes);
            return Ok(InsertOutcome {
                id: row.id,
                was_new: false,
            });
        }
        self.store.begin();
        match self.insert_representative_candidate(circuit) {
            Ok(id) => {
                self.store.commit();
                Ok(InsertOutcome { id, was_new: true })
            }
            Err(e) => {
                self.store.rollback();
                Err(e)
            }
        }
    }

    /// Strict variant: a fingerprint collision is reported as
    /// `DuplicateFingerprint` instead of being folded into idempotent
    /// success.
    pub fn insert_identity_strict(&mut self, circuit: &Circuit) -> Result<u64> {
        let outcome = self.insert_identity(circuit)?;
        if !outcome.was_new {
            return Err(Error::DuplicateFingerprint);
        }
        Ok(outcome.id)
    }

    fn check_admissible(&self, circuit: &Circuit) -> Result<()> {
        circuit.validate()?;
        if !circuit.simulate().is_identity() {
            return Err(Error::InvalidCircuit(format!(
                "circuit does not simulate to the identity: {}",
                circuit
            )));
        }
        Ok(())
    }

    fn insert_representative_candidate(&mut self, circuit: &Circuit) -> Result<u64> {
        let (circuit_id, dim_group_id) = self.insert_circuit_row(circuit, None);
        let composition = circuit.composition();
        let already_elected = self
            .representatives_of_group(dim_group_id)
            .into_iter()
            .any(|(_, rep)| rep.composition == composition);
        if !already_elected {
            let rep = RepresentativeRow {
                id: self.next_representative_id,
                dim_group_id,
                circuit_id,
                composition,
                fully_unrolled: false,
            };
            self.next_representative_id += 1;
            self.store
                .put(Table::Representatives, &rep.id.to_be_bytes(), encode_row(&rep));
            log::info!(
                "elected circuit {} representative of ({}, {}) composition {}",
                circuit_id,
                circuit.width(),
                circuit.len(),
                composition
            );
        }
        Ok(circuit_id)
    }

    /// Writes the circuit row and bumps its dimension group, creating the
    /// group on first contact. The caller has checked the fingerprint is
    /// absent.
    fn insert_circuit_row(
        &mut self,
        circuit: &Circuit,
        representative_id: Option<u64>,
    ) -> (u64, u64) {
        let fingerprint = circuit.fingerprint();
        let key = circuit_key(circuit.width(), circuit.len(), &fingerprint);
        debug_assert!(self.store.get(Table::Circuits, &key).is_none());

        let group_key = dim_group_key(circuit.width(), circuit.len());
        let mut group: DimGroupRow = match self.store.get(Table::DimGroups, &group_key) {
            Some(bytes) => decode_row(Table::DimGroups, &bytes),
            None => {
                let group = DimGroupRow {
                    id: self.next_dim_group_id,
                    width: circuit.width(),
                    length: circuit.len(),
                    circuit_count: 0,
                };
                self.next_dim_group_id += 1;
                group
            }
        };
        group.circuit_count += 1;
        self.store
            .put(Table::DimGroups, &group_key, encode_row(&group));

        let composition = circuit.composition();
        let row = CircuitRow {
            id: self.next_circuit_id,
            width: circuit.width(),
            length: circuit.len(),
            gates_blob: fingerprint.clone(),
            composition_not: composition.not,
            composition_cnot: composition.cnot,
            composition_ccnot: composition.ccnot,
            fingerprint,
            representative_id,
        };
        self.next_circuit_id += 1;
        self.store.put(Table::Circuits, &key, encode_row(&row));
        self.key_by_id.insert(row.id, key);
        (row.id, group.id)
    }

    pub fn dim_group(&self, width: usize, length: usize) -> Option<DimGroupRow> {
        self.store
            .get(Table::DimGroups, &dim_group_key(width, length))
            .map(|bytes| decode_row(Table::DimGroups, &bytes))
    }

    pub fn dim_groups(&self) -> Vec<DimGroupRow> {
        self.store
            .scan(Table::DimGroups, &[])
            .into_iter()
            .map(|(_, bytes)| decode_row(Table::DimGroups, &bytes))
            .collect()
    }

    pub fn circuit_by_id(&self, id: u64) -> Option<CircuitRow> {
        let key = self.key_by_id.get(&id)?;
        self.store
            .get(Table::Circuits, key)
            .map(|bytes| decode_row(Table::Circuits, &bytes))
    }

    /// All circuits of a dimension group, in fingerprint order.
    pub fn circuits_in_dim_group(&self, width: usize, length: usize) -> Vec<CircuitRow> {
        self.store
            .scan(Table::Circuits, &dim_group_key(width, length))
            .into_iter()
            .map(|(_, bytes)| decode_row(Table::Circuits, &bytes))
            .collect()
    }

    /// The currently-elected representatives of `(width, length)`.
    pub fn list_representatives(&self, width: usize, length: usize) -> Vec<RepresentativeRow> {
        match self.dim_group(width, length) {
            Some(group) => self
                .representatives_of_group(group.id)
                .into_iter()
                .map(|(_, rep)| rep)
                .collect(),
            None => Vec::new(),
        }
    }

    fn representatives_of_group(&self, dim_group_id: u64) -> Vec<(Vec<u8>, RepresentativeRow)> {
        self.store
            .scan(Table::Representatives, &[])
            .into_iter()
            .map(|(key, bytes)| {
                let row: RepresentativeRow = decode_row(Table::Representatives, &bytes);
                (key, row)
            })
            .filter(|(_, row)| row.dim_group_id == dim_group_id)
            .collect()
    }

    fn representative_by_id(&self, id: u64) -> Option<RepresentativeRow> {
        self.store
            .get(Table::Representatives, &id.to_be_bytes())
            .map(|bytes| decode_row(Table::Representatives, &bytes))
    }

    /// Elects an already-cataloged circuit as an additional representative
    /// of its `(dim_group, composition)` slot. Slots hold an ordered list
    /// of representatives: shard merges and fingerprint-disjoint classes
    /// of one composition both produce more than one.
    pub fn elect_representative(&mut self, circuit_id: u64) -> Result<RepresentativeRow> {
        let circuit_row = self.circuit_by_id(circuit_id).ok_or_else(|| {
            Error::InvalidCircuit(format!("unknown circuit id {}", circuit_id))
        })?;
        let group = self
            .dim_group(circuit_row.width, circuit_row.length)
            .expect("cataloged circuit always has a dimension group");
        if let Some((_, existing)) = self
            .representatives_of_group(group.id)
            .into_iter()
            .find(|(_, rep)| rep.circuit_id == circuit_id)
        {
            return Ok(existing);
        }
        self.store.begin();
        let rep = RepresentativeRow {
            id: self.next_representative_id,
            dim_group_id: group.id,
            circuit_id,
            composition: circuit_row.composition(),
            fully_unrolled: false,
        };
        self.next_representative_id += 1;
        self.store
            .put(Table::Representatives, &rep.id.to_be_bytes(), encode_row(&rep));
        self.store.commit();
        Ok(rep)
    }

    /// The representative a folded equivalent points at, if any.
    pub fn equivalent_of(&self, circuit_id: u64) -> Option<EquivalentRow> {
        self.store
            .get(Table::Equivalents, &circuit_id.to_be_bytes())
            .map(|bytes| decode_row(Table::Equivalents, &bytes))
    }

    /// Folds an unroller's output under the representative that produced
    /// it: inserts the new circuits as equivalents, demotes any other
    /// representative of the same composition whose fingerprint appears in
    /// the class, and records the `fully_unrolled` verdict.
    pub fn fold_equivalents(
        &mut self,
        representative_id: u64,
        outcome: &UnrollOutcome,
    ) -> Result<FoldStats> {
        let rep = self.representative_by_id(representative_id).ok_or_else(|| {
            Error::InvalidCircuit(format!("unknown representative id {}", representative_id))
        })?;
        let rep_circuit = self
            .circuit_by_id(rep.circuit_id)
            .unwrap_or_else(|| panic!("representative {} lost its circuit", rep.id));

        self.store.begin();
        match self.fold_inner(&rep, &rep_circuit, outcome) {
            Ok(stats) => {
                self.store.commit();
                log::info!(
                    "folded {} equivalents under representative {}: {}",
                    outcome.circuits.len(),
                    representative_id,
                    stats
                );
                Ok(stats)
            }
            Err(e) => {
                self.store.rollback();
                Err(e)
            }
        }
    }

    fn fold_inner(
        &mut self,
        rep: &RepresentativeRow,
        rep_circuit: &CircuitRow,
        outcome: &UnrollOutcome,
    ) -> Result<FoldStats> {
        let mut stats = FoldStats::default();
        for equivalent in &outcome.circuits {
            if equivalent.width() != rep_circuit.width || equivalent.len() != rep_circuit.length {
                return Err(Error::InvalidCircuit(format!(
                    "equivalent has dimension ({}, {}), representative has ({}, {})",
                    equivalent.width(),
                    equivalent.len(),
                    rep_circuit.width,
                    rep_circuit.length
                )));
            }
            if equivalent.composition() != rep.composition {
                return Err(Error::InvalidCircuit(format!(
                    "equivalent composition {} differs from representative's {}",
                    equivalent.composition(),
                    rep.composition
                )));
            }
            let key = circuit_key(equivalent.width(), equivalent.len(), &equivalent.fingerprint());
            match self.store.get(Table::Circuits, &key) {
                None => {
                    let (circuit_id, _) = self.insert_circuit_row(equivalent, Some(rep.id));
                    self.link_equivalent(rep.id, circuit_id);
                    stats.inserted += 1;
                }
                Some(bytes) => {
                    let mut existing: CircuitRow = decode_row(Table::Circuits, &bytes);
                    if existing.id == rep.circuit_id {
                        stats.duplicates += 1;
                        continue;
                    }
                    if let Some((rival_key, _)) = self
                        .representatives_of_group(rep.dim_group_id)
                        .into_iter()
                        .find(|(_, rival)| {
                            rival.circuit_id == existing.id && rival.composition == rep.composition
                        })
                    {
                        // A rival representative generates the same class;
                        // demote it to an equivalent of ours.
                        self.store.delete(Table::Representatives, &rival_key);
                        existing.representative_id = Some(rep.id);
                        self.store.put(Table::Circuits, &key, encode_row(&existing));
                        self.link_equivalent(rep.id, existing.id);
                        stats.demoted += 1;
                    } else if existing.representative_id.is_none() {
                        existing.representative_id = Some(rep.id);
                        self.store.put(Table::Circuits, &key, encode_row(&existing));
                        self.link_equivalent(rep.id, existing.id);
                        stats.adopted += 1;
                    } else {
                        stats.duplicates += 1;
                    }
                }
            }
        }
        let updated = RepresentativeRow {
            fully_unrolled: outcome.fully_unrolled,
            ..rep.clone()
        };
        self.store.put(
            Table::Representatives,
            &updated.id.to_be_bytes(),
            encode_row(&updated),
        );
        Ok(stats)
    }

    fn link_equivalent(&mut self, representative_id: u64, circuit_id: u64) {
        let row = EquivalentRow {
            representative_id,
            circuit_id,
        };
        self.store
            .put(Table::Equivalents, &circuit_id.to_be_bytes(), encode_row(&row));
    }

    /// Plain-text dump of a dimension group: a header line, then one `c`
    /// record per circuit with a target-then-controls line per gate.
    pub fn export_dim_group(&self, width: usize, length: usize) -> String {
        let mut out = format!("h {} {}\n", width, length);
        for row in self.circuits_in_dim_group(width, length) {
            out.push_str(&format!("c {} {}\n", row.width, row.length));
            let circuit = row
                .to_circuit()
                .unwrap_or_else(|e| panic!("corrupt gates blob for circuit {}: {}", row.id, e));
            for gate in circuit.gates() {
                out.push_str(&gate.target().to_string());
                for &control in gate.controls() {
                    out.push_str(&format!(" {}", control));
                }
                out.push('\n');
            }
        }
        out
    }

    /// Loads circuits from the `export_dim_group` format, inserting each
    /// through `insert_identity`. Returns the number of new circuits.
    pub fn import_dim_group(&mut self, text: &str) -> Result<usize> {
        let mut lines = text.lines().peekable();
        let mut new_circuits = 0;
        while let Some(line) = lines.next() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                ["h", _, _] | [] => continue,
                ["c", width, length] => {
                    let width = parse_field(width)?;
                    let length: usize = parse_field(length)?;
                    let mut circuit = Circuit::new(width)?;
                    for _ in 0..length {
                        let gate_line = lines.next().ok_or_else(|| {
                            Error::InvalidCircuit("truncated circuit record".to_string())
                        })?;
                        let mut numbers = gate_line.split_whitespace();
                        let target = parse_field(numbers.next().ok_or_else(|| {
                            Error::InvalidCircuit("empty gate line".to_string())
                        })?)?;
                        let controls: Vec<usize> = numbers
                            .map(parse_field)
                            .collect::<Result<_>>()?;
                        let gate = match controls.as_slice() {
                            [] => crate::gate::Gate::not(target),
                            [c] => crate::gate::Gate::cnot(*c, target)?,
                            [c0, c1] => crate::gate::Gate::ccnot(*c0, *c1, target)?,
                            _ => {
                                return Err(Error::InvalidCircuit(format!(
                                    "gate with {} controls not in the library",
                                    controls.len()
                                )))
                            }
                        };
                        circuit.push(gate)?;
                    }
                    if self.insert_identity(&circuit)?.was_new {
                        new_circuits += 1;
                    }
                }
                _ => {
                    return Err(Error::InvalidCircuit(format!(
                        "unrecognized record line: '{}'",
                        line
                    )))
                }
            }
        }
        Ok(new_circuits)
    }
}

fn parse_field(field: &str) -> Result<usize> {
    field
        .parse()
        .map_err(|_| Error::InvalidCircuit(format!("malformed number '{}'", field)))
}

#[cfg(test)]
mod tests {
    use super::store::MemStore;
    use super::*;
    use crate::gate::Gate;
    use crate::unroller::{unroll, CancelToken};

    fn identity_pair(width: usize, gate: Gate) -> Circuit {
        let mut c = Circuit::new(width).unwrap();
        c.push(gate).unwrap();
        c.push(gate).unwrap();
        c
    }

    fn catalog() -> Catalog<MemStore> {
        Catalog::open(MemStore::new())
    }

    #[test]
    fn test_insert_rejects_non_identity() {
        let mut catalog = catalog();
        let mut c = Circuit::new(2).unwrap();
        c.push(Gate::not(0)).unwrap();
        assert!(matches!(
            catalog.insert_identity(&c),
            Err(Error::InvalidCircuit(_))
        ));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut catalog = catalog();
        let c = identity_pair(2, Gate::not(0));
        let first = catalog.insert_identity(&c).unwrap();
        assert!(first.was_new);
        let second = catalog.insert_identity(&c).unwrap();
        assert!(!second.was_new);
        assert_eq!(first.id, second.id);
        // The duplicate did not bump the group count.
        assert_eq!(catalog.dim_group(2, 2).unwrap().circuit_count, 1);
        assert!(matches!(
            catalog.insert_identity_strict(&c),
            Err(Error::DuplicateFingerprint)
        ));
    }

    #[test]
    fn test_first_of_composition_is_elected() {
        let mut catalog = catalog();
        let nots = identity_pair(2, Gate::not(0));
        let cnots = identity_pair(2, Gate::cnot(0, 1).unwrap());
        catalog.insert_identity(&nots).unwrap();
        catalog.insert_identity(&cnots).unwrap();
        // Same dimension, different compositions: two representatives.
        let reps = catalog.list_representatives(2, 2);
        assert_eq!(reps.len(), 2);
        // A second circuit of an elected composition is not elected.
        let other_nots = identity_pair(2, Gate::not(1));
        catalog.insert_identity(&other_nots).unwrap();
        assert_eq!(catalog.list_representatives(2, 2).len(), 2);
        assert_eq!(catalog.dim_group(2, 2).unwrap().circuit_count, 3);
    }

    #[test]
    fn test_fold_links_equivalents() {
        let mut catalog = catalog();
        let rep_circuit = identity_pair(2, Gate::not(0));
        let rep_id = {
            catalog.insert_identity(&rep_circuit).unwrap();
            catalog.list_representatives(2, 2)[0].id
        };
        let outcome = unroll(&rep_circuit, usize::MAX, &CancelToken::new()).unwrap();
        let stats = catalog.fold_equivalents(rep_id, &outcome).unwrap();
        // The class is {not(0) pair, not(1) pair}; the representative
        // itself is the one duplicate.
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.demoted, 0);
        let rep = catalog.list_representatives(2, 2)[0].clone();
        assert!(rep.fully_unrolled);
        let folded = catalog
            .circuits_in_dim_group(2, 2)
            .into_iter()
            .find(|row| row.id != rep.circuit_id)
            .unwrap();
        assert_eq!(folded.representative_id, Some(rep_id));
        assert_eq!(catalog.equivalent_of(folded.id).unwrap().representative_id, rep_id);
    }

    #[test]
    fn test_fold_adopts_unaffiliated_circuit() {
        let mut catalog = catalog();
        let rep_circuit = identity_pair(2, Gate::not(0));
        catalog.insert_identity(&rep_circuit).unwrap();
        let rep_id = catalog.list_representatives(2, 2)[0].id;
        // The relabeled twin shares the composition slot, so inserting it
        // elects nothing; it sits unaffiliated until a fold claims it.
        let twin = identity_pair(2, Gate::not(1));
        let twin_id = catalog.insert_identity(&twin).unwrap().id;
        let outcome = unroll(&rep_circuit, usize::MAX, &CancelToken::new()).unwrap();
        let stats = catalog.fold_equivalents(rep_id, &outcome).unwrap();
        assert_eq!(stats.adopted, 1);
        assert_eq!(stats.inserted, 0);
        assert_eq!(
            catalog.circuit_by_id(twin_id).unwrap().representative_id,
            Some(rep_id)
        );
    }

    #[test]
    fn test_fold_demotes_rival_representative() {
        let mut catalog = catalog();
        let rep_circuit = identity_pair(2, Gate::not(0));
        catalog.insert_identity(&rep_circuit).unwrap();
        let rep_id = catalog.list_representatives(2, 2)[0].id;
        // Stage the rival a sharded writer would have produced: the twin
        // inserted and elected before this writer saw it.
        let twin = identity_pair(2, Gate::not(1));
        let twin_id = catalog.insert_identity(&twin).unwrap().id;
        let rival = catalog.elect_representative(twin_id).unwrap();
        assert_eq!(rival.composition, rep_circuit.composition());
        assert_eq!(catalog.list_representatives(2, 2).len(), 2);

        let outcome = unroll(&rep_circuit, usize::MAX, &CancelToken::new()).unwrap();
        let stats = catalog.fold_equivalents(rep_id, &outcome).unwrap();
        assert_eq!(stats.demoted, 1);
        // The rival is gone from the representative list and points back.
        let reps = catalog.list_representatives(2, 2);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].id, rep_id);
        assert!(reps[0].fully_unrolled);
        assert_eq!(catalog.equivalent_of(twin_id).unwrap().representative_id, rep_id);
        assert_eq!(
            catalog.circuit_by_id(twin_id).unwrap().representative_id,
            Some(rep_id)
        );
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut catalog = catalog();
        catalog
            .insert_identity(&identity_pair(3, Gate::ccnot(0, 1, 2).unwrap()))
            .unwrap();
        catalog
            .insert_identity(&identity_pair(3, Gate::cnot(1, 0).unwrap()))
            .unwrap();
        let text = catalog.export_dim_group(3, 2);
        assert!(text.starts_with("h 3 2\n"));

        let mut restored = Catalog::open(MemStore::new());
        let new_circuits = restored.import_dim_group(&text).unwrap();
        assert_eq!(new_circuits, 2);
        assert_eq!(restored.export_dim_group(3, 2), text);
        // Importing again adds nothing.
        assert_eq!(restored.import_dim_group(&text).unwrap(), 0);
    }
}
