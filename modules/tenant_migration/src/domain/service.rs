//! Domain service - store upserts and index provisioning

use super::record::{DocumentStamp, StoreRecord};
use super::registry::ConnectionRegistry;
use super::repository::{Connector, RecordReader};
use crate::contract::{
    IndexAttempt, IndexAttemptOutcome, IndexSpec, MigrationError, ProvisioningReport,
    StoreStatus, UpsertOutcome, UpsertReport, DEFAULT_STORE_TYPE,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Index specifications keyed by collection name
pub type IndexCatalog = BTreeMap<String, Vec<IndexSpec>>;

/// Fixed parameters of the store upsert procedure
#[derive(Debug, Clone)]
pub struct StoreUpsertOptions {
    /// Registry group holding the store databases
    pub group: String,
    /// Target collection inside each tenant database
    pub collection: String,
    pub store_type: String,
    /// Identity written to created_by / modified_by
    pub operator: String,
    /// Base directory for relative source paths
    pub source_dir: Option<PathBuf>,
}

impl Default for StoreUpsertOptions {
    fn default() -> Self {
        Self {
            group: "ext".to_string(),
            collection: "store".to_string(),
            store_type: DEFAULT_STORE_TYPE.to_string(),
            operator: "tenant-migrate".to_string(),
            source_dir: None,
        }
    }
}

/// Domain service for tenant migrations
pub struct Service {
    registry: Arc<ConnectionRegistry>,
    catalog: Arc<IndexCatalog>,
    connector: Arc<dyn Connector>,
    reader: Arc<dyn RecordReader>,
    options: StoreUpsertOptions,
}

impl Service {
    /// Create a new service instance
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        catalog: Arc<IndexCatalog>,
        connector: Arc<dyn Connector>,
        reader: Arc<dyn RecordReader>,
        options: StoreUpsertOptions,
    ) -> Self {
        Self {
            registry,
            catalog,
            connector,
            reader,
            options,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    // ===== Store Upsert =====

    /// Read every record from `path` and upsert it into the tenant's store
    /// collection.
    ///
    /// The first malformed record or failed write aborts the run; records
    /// written before it stay written.
    pub async fn upsert_stores(
        &self,
        tenant: &str,
        path: &Path,
        active: bool,
    ) -> Result<UpsertReport, MigrationError> {
        let path = self.resolve_source(path);
        tracing::info!(tenant, path = %path.display(), active, "Adding store data");

        let records = self.reader.read_records(&path)?;
        tracing::debug!(count = records.len(), "Read source records");

        let descriptor = self.registry.descriptor(&self.options.group, tenant)?;
        let database = descriptor.database_name()?;
        let collection = self.options.collection.as_str();
        let connection = self.connector.connect(&descriptor, database).await?;
        tracing::info!(%descriptor, database, collection, "Connected");

        let stamp = DocumentStamp {
            store_type: self.options.store_type.clone(),
            operator: self.options.operator.clone(),
            status: StoreStatus::from_active(active),
        };

        let mut report = UpsertReport {
            tenant: tenant.to_string(),
            database: database.to_string(),
            collection: collection.to_string(),
            processed: 0,
            inserted: 0,
            updated: 0,
        };

        for record in &records {
            let document = StoreRecord::parse(record)?.into_document(&stamp, Utc::now());
            let outcome = connection.upsert_store(collection, &document).await?;
            tracing::info!(
                record = record.index,
                store_id = document.store_id,
                company_id = document.company_id,
                store_code = %document.store_code,
                status = %document.status,
                ?outcome,
                "Store upserted"
            );

            report.processed += 1;
            match outcome {
                UpsertOutcome::Inserted => report.inserted += 1,
                UpsertOutcome::Updated => report.updated += 1,
            }
        }

        connection.close().await?;
        tracing::info!(
            tenant,
            count = report.processed,
            inserted = report.inserted,
            updated = report.updated,
            "Store data inserted successfully"
        );
        Ok(report)
    }

    fn resolve_source(&self, path: &Path) -> PathBuf {
        match &self.options.source_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    // ===== Index Provisioning =====

    /// One connect / create-index / disconnect cycle.
    ///
    /// Returns the index name. A server rejection is returned as
    /// [`MigrationError::IndexCreationFailure`] after the connection has been
    /// closed.
    pub async fn add_index(
        &self,
        tenant: &str,
        group: &str,
        collection: &str,
        spec: &IndexSpec,
    ) -> Result<String, MigrationError> {
        tracing::info!(tenant, group, collection, index = %spec, "Adding index");

        let descriptor = self.registry.descriptor(group, tenant)?;
        let database = descriptor.database_name()?;
        let connection = self.connector.connect(&descriptor, database).await?;
        tracing::debug!(%descriptor, database, collection, "Connected");

        let created = connection.create_index(collection, spec).await;
        // Close before inspecting the outcome so rejections still disconnect
        let closed = connection.close().await;

        let outcome = created?;
        closed?;

        match outcome {
            IndexAttemptOutcome::Created { index_name } => {
                tracing::info!(database, collection, index_name = %index_name, "Index created successfully");
                Ok(index_name)
            }
            IndexAttemptOutcome::Rejected { code, reason } => {
                let error = MigrationError::IndexCreationFailure {
                    database: database.to_string(),
                    collection: collection.to_string(),
                    index: spec.effective_name(),
                    code,
                    reason,
                };
                tracing::warn!(%error, "Error creating index");
                Err(error)
            }
        }
    }

    /// Create every specification registered for `collection` on every
    /// tenant of `group`, one cycle per (tenant, specification) pair.
    ///
    /// Server rejections are recorded in the report and the loop moves on;
    /// any other error stops it.
    pub async fn provision_indexes(
        &self,
        group: &str,
        collection: &str,
    ) -> Result<ProvisioningReport, MigrationError> {
        let specs = self
            .catalog
            .get(collection)
            .filter(|specs| !specs.is_empty())
            .ok_or_else(|| MigrationError::NoIndexSpecs {
                collection: collection.to_string(),
            })?;
        let tenants = self.registry.tenants(group)?;
        tracing::info!(group, collection, tenants = tenants.len(), specs = specs.len(), "Provisioning indexes");

        let mut report = ProvisioningReport::default();
        for tenant in tenants {
            let database = self.registry.descriptor(group, tenant)?.database_name()?.to_string();
            for spec in specs {
                let outcome = match self.add_index(tenant, group, collection, spec).await {
                    Ok(index_name) => IndexAttemptOutcome::Created { index_name },
                    Err(MigrationError::IndexCreationFailure { code, reason, .. }) => {
                        IndexAttemptOutcome::Rejected { code, reason }
                    }
                    Err(e) => return Err(e),
                };
                report.attempts.push(IndexAttempt {
                    tenant: tenant.to_string(),
                    database: database.clone(),
                    collection: collection.to_string(),
                    spec: spec.clone(),
                    outcome,
                });
            }
        }

        tracing::info!(
            group,
            collection,
            created = report.created(),
            rejected = report.rejected(),
            "Index provisioning finished"
        );
        Ok(report)
    }
}
