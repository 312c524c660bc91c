//! Common test utilities: an in-memory document database

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tenant_migration::contract::{IndexAttemptOutcome, IndexKey, IndexSpec, StoreDocument, UpsertOutcome};
use tenant_migration::domain::{ConnectionDescriptor, Connector, TenantConnection};

/// Server error codes the fake reports for conflicting definitions
pub const INDEX_OPTIONS_CONFLICT: i32 = 85;
pub const INDEX_KEY_SPECS_CONFLICT: i32 = 86;

pub fn print_test_header(test_name: &str, purpose: &str) {
    println!("\n🧪 TEST: {}", test_name);
    println!("📋 PURPOSE: {}", purpose);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIndex {
    pub name: String,
    pub keys: Vec<IndexKey>,
    pub unique: bool,
}

type Namespace = (String, String);

#[derive(Debug, Default)]
pub struct MemoryState {
    pub stores: HashMap<Namespace, BTreeMap<i64, StoreDocument>>,
    pub indexes: HashMap<Namespace, Vec<StoredIndex>>,
    pub connects: Vec<String>,
    pub closes: usize,
    /// Databases whose connection attempts fail
    pub unreachable: HashSet<String>,
    /// store_ids whose writes fail
    pub failing_writes: HashSet<i64>,
}

/// Connector over shared in-memory state
#[derive(Clone, Default)]
pub struct MemoryConnector {
    pub state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_index(&self, database: &str, collection: &str, index: StoredIndex) {
        self.state
            .lock()
            .indexes
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .push(index);
    }

    pub fn indexes(&self, database: &str, collection: &str) -> Vec<StoredIndex> {
        self.state
            .lock()
            .indexes
            .get(&(database.to_string(), collection.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn stores(&self, database: &str, collection: &str) -> BTreeMap<i64, StoreDocument> {
        self.state
            .lock()
            .stores
            .get(&(database.to_string(), collection.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn connects(&self) -> Vec<String> {
        self.state.lock().connects.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    pub fn make_unreachable(&self, database: &str) {
        self.state.lock().unreachable.insert(database.to_string());
    }

    pub fn fail_write_for(&self, store_id: i64) {
        self.state.lock().failing_writes.insert(store_id);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        database: &str,
    ) -> Result<Box<dyn TenantConnection>> {
        let mut state = self.state.lock();
        if state.unreachable.contains(database) {
            bail!("server selection timeout for {descriptor}");
        }
        state.connects.push(database.to_string());
        Ok(Box::new(MemoryConnection {
            database: database.to_string(),
            state: self.state.clone(),
        }))
    }
}

pub struct MemoryConnection {
    database: String,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnection {
    fn namespace(&self, collection: &str) -> Namespace {
        (self.database.clone(), collection.to_string())
    }
}

#[async_trait]
impl TenantConnection for MemoryConnection {
    async fn upsert_store(&self, collection: &str, store: &StoreDocument) -> Result<UpsertOutcome> {
        let mut state = self.state.lock();
        if state.failing_writes.contains(&store.store_id) {
            bail!("write concern error for store {}", store.store_id);
        }
        let previous = state
            .stores
            .entry(self.namespace(collection))
            .or_default()
            .insert(store.store_id, store.clone());
        Ok(match previous {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Inserted,
        })
    }

    async fn create_index(&self, collection: &str, spec: &IndexSpec) -> Result<IndexAttemptOutcome> {
        let mut state = self.state.lock();
        let indexes = state.indexes.entry(self.namespace(collection)).or_default();
        let name = spec.effective_name();

        if let Some(existing) = indexes.iter().find(|i| i.name == name) {
            if existing.keys != spec.keys {
                return Ok(IndexAttemptOutcome::Rejected {
                    code: Some(INDEX_KEY_SPECS_CONFLICT),
                    reason: format!("An existing index has the same name as the requested index: {name}"),
                });
            }
            if existing.unique != spec.unique {
                return Ok(IndexAttemptOutcome::Rejected {
                    code: Some(INDEX_OPTIONS_CONFLICT),
                    reason: format!("An equivalent index already exists with different options: {name}"),
                });
            }
            return Ok(IndexAttemptOutcome::Created { index_name: name });
        }

        if let Some(existing) = indexes.iter().find(|i| i.keys == spec.keys) {
            return Ok(IndexAttemptOutcome::Rejected {
                code: Some(INDEX_OPTIONS_CONFLICT),
                reason: format!(
                    "Index already exists with a different name: {}",
                    existing.name
                ),
            });
        }

        indexes.push(StoredIndex {
            name: name.clone(),
            keys: spec.keys.clone(),
            unique: spec.unique,
        });
        Ok(IndexAttemptOutcome::Created { index_name: name })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.state.lock().closes += 1;
        Ok(())
    }
}

/// Write a CSV source file into `dir`
pub fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "store_name,store_id,fynd_store_code,company_id").unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    path
}
