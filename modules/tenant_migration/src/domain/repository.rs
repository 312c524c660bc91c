//! Data access traits
//!
//! These traits define the seams between the migration service and the
//! outside world. Implementations are in infra/.

use super::record::SourceRecord;
use super::registry::ConnectionDescriptor;
use crate::contract::{IndexAttemptOutcome, IndexSpec, MigrationError, StoreDocument, UpsertOutcome};
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Opens connections to tenant databases
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `database` using the descriptor's URI as given
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        database: &str,
    ) -> Result<Box<dyn TenantConnection>>;
}

/// An open connection scoped to one tenant database
#[async_trait]
pub trait TenantConnection: Send + Sync {
    /// Upsert by `store_id`: set every field, insert when absent
    async fn upsert_store(&self, collection: &str, store: &StoreDocument) -> Result<UpsertOutcome>;

    /// Create an index.
    ///
    /// An equivalent existing index is a success. A definition the server
    /// rejects comes back as [`IndexAttemptOutcome::Rejected`]; `Err` is
    /// reserved for failures that are not server rejections.
    async fn create_index(&self, collection: &str, spec: &IndexSpec) -> Result<IndexAttemptOutcome>;

    /// Close the connection
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Reads tabular source files into records
pub trait RecordReader: Send + Sync {
    fn read_records(&self, path: &Path) -> Result<Vec<SourceRecord>, MigrationError>;
}
