// SPDX-License-Identifier: Apache-2.0

//! The narrow key/row seam the catalog sits on: `put` / `get` / `scan`
//! over four fixed tables, with a single-writer transaction per top-level
//! catalog operation. Rows are opaque bytes at this layer; the catalog
//! encodes them as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Table {
    Circuits,
    DimGroups,
    Representatives,
    Equivalents,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Circuits,
        Table::DimGroups,
        Table::Representatives,
        Table::Equivalents,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Circuits => "circuits",
            Table::DimGroups => "dim_groups",
            Table::Representatives => "representatives",
            Table::Equivalents => "equivalents",
        }
    }

    fn index(self) -> usize {
        match self {
            Table::Circuits => 0,
            Table::DimGroups => 1,
            Table::Representatives => 2,
            Table::Equivalents => 3,
        }
    }
}

/// Abstract row store. Implementations need ordered keys (for prefix
/// scans) and last-write-wins puts; the core serializes writers itself.
pub trait RowStore {
    fn put(&mut self, table: Table, key: &[u8], row: Vec<u8>);
    fn delete(&mut self, table: Table, key: &[u8]);
    fn get(&self, table: Table, key: &[u8]) -> Option<Vec<u8>>;
    /// All rows whose key starts with `prefix`, in key order.
    fn scan(&self, table: Table, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;
    /// Opens a transaction; writes until `commit` can be undone with
    /// `rollback`. Transactions do not nest.
    fn begin(&mut self);
    fn commit(&mut self);
    fn rollback(&mut self);
}

/// In-memory ordered store, with optional JSON snapshots for persistence
/// across runs.
#[derive(Debug, Default)]
pub struct MemStore {
    tables: [BTreeMap<Vec<u8>, Vec<u8>>; 4],
    /// Undo journal: prior value per touched key, present while a
    /// transaction is open.
    journal: Option<Vec<(Table, Vec<u8>, Option<Vec<u8>>)>>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    tables: Vec<(String, Vec<(Vec<u8>, Vec<u8>)>)>,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore::default()
    }

    fn record_prior(&mut self, table: Table, key: &[u8]) {
        if let Some(journal) = self.journal.as_mut() {
            let prior = self.tables[table.index()].get(key).cloned();
            journal.push((table, key.to_vec(), prior));
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        assert!(self.journal.is_none(), "save inside an open transaction");
        let snapshot = Snapshot {
            tables: Table::ALL
                .iter()
                .map(|&table| {
                    let rows = self.tables[table.index()]
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    (table.name().to_string(), rows)
                })
                .collect(),
        };
        std::fs::write(path, serde_json::to_vec(&snapshot)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<MemStore> {
        let snapshot: Snapshot = serde_json::from_slice(&std::fs::read(path)?)?;
        let mut store = MemStore::new();
        for (name, rows) in snapshot.tables {
            let table = Table::ALL
                .iter()
                .copied()
                .find(|t| t.name() == name)
                .ok_or_else(|| anyhow::anyhow!("unknown table '{}' in snapshot", name))?;
            store.tables[table.index()] = rows.into_iter().collect();
        }
        Ok(store)
    }
}

impl RowStore for MemStore {
    fn put(&mut self, table: Table, key: &[u8], row: Vec<u8>) {
        self.record_prior(table, key);
        self.tables[table.index()].insert(key.to_vec(), row);
    }

    fn delete(&mut self, table: Table, key: &[u8]) {
        self.record_prior(table, key);
        self.tables[table.index()].remove(key);
    }

    fn get(&self, table: Table, key: &[u8]) -> Option<Vec<u8>> {
        self.tables[table.index()].get(key).cloned()
    }

    fn scan(&self, table: Table, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.tables[table.index()]
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn begin(&mut self) {
        assert!(self.journal.is_none(), "transactions do not nest");
        self.journal = Some(Vec::new());
    }

    fn commit(&mut self) {
        assert!(self.journal.is_some(), "commit without begin");
        self.journal = None;
    }

    fn rollback(&mut self) {
        let journal = self.journal.take().expect("rollback without begin");
        for (table, key, prior) in journal.into_iter().rev() {
            match prior {
                Some(row) => {
                    self.tables[table.index()].insert(key, row);
                }
                None => {
                    self.tables[table.index()].remove(&key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_scan() {
        let mut store = MemStore::new();
        store.put(Table::Circuits, b"aa", vec![1]);
        store.put(Table::Circuits, b"ab", vec![2]);
        store.put(Table::Circuits, b"ba", vec![3]);
        store.put(Table::DimGroups, b"aa", vec![9]);
        assert_eq!(store.get(Table::Circuits, b"aa"), Some(vec![1]));
        assert_eq!(store.get(Table::Circuits, b"zz"), None);
        let scanned = store.scan(Table::Circuits, b"a");
        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[0], (b"aa".to_vec(), vec![1]));
        assert_eq!(scanned[1], (b"ab".to_vec(), vec![2]));
    }

    #[test]
    fn test_rollback_restores_prior_state() {
        let mut store = MemStore::new();
        store.put(Table::Circuits, b"k", vec![1]);
        store.begin();
        store.put(Table::Circuits, b"k", vec![2]);
        store.put(Table::Circuits, b"fresh", vec![3]);
        store.delete(Table::Circuits, b"k");
        store.rollback();
        assert_eq!(store.get(Table::Circuits, b"k"), Some(vec![1]));
        assert_eq!(store.get(Table::Circuits, b"fresh"), None);
    }

    #[test]
    fn test_commit_keeps_writes() {
        let mut store = MemStore::new();
        store.begin();
        store.put(Table::Equivalents, b"k", vec![1]);
        store.commit();
        assert_eq!(store.get(Table::Equivalents, b"k"), Some(vec![1]));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = std::env::temp_dir().join("revsynth-store-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");
        let mut store = MemStore::new();
        store.put(Table::Circuits, &[0, 3, 7], vec![1, 2, 3]);
        store.put(Table::Representatives, b"r", vec![4]);
        store.save(&path).unwrap();
        let restored = MemStore::load(&path).unwrap();
        assert_eq!(restored.get(Table::Circuits, &[0, 3, 7]), Some(vec![1, 2, 3]));
        assert_eq!(restored.get(Table::Representatives, b"r"), Some(vec![4]));
        std::fs::remove_file(&path).ok();
    }
}
