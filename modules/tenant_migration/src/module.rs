//! Module wiring: configuration -> service -> enabled jobs

use crate::config::Config;
use crate::contract::{MigrationError, ProvisioningReport, UpsertReport};
use crate::domain::{ConnectionRegistry, Connector, RecordReader, Service};
use crate::infra::{FileRecordReader, MongoConnector};
use std::sync::Arc;

/// What a run did
#[derive(Debug, Default)]
pub struct RunSummary {
    pub provisioning: Option<ProvisioningReport>,
    pub upserts: Vec<UpsertReport>,
}

/// Tenant migration module
pub struct TenantMigrationModule {
    config: Config,
    service: Arc<Service>,
}

impl TenantMigrationModule {
    /// Build against MongoDB and the local filesystem
    pub fn new(config: Config) -> Self {
        Self::with_adapters(config, Arc::new(MongoConnector::new()), Arc::new(FileRecordReader))
    }

    /// Build with explicit adapters
    pub fn with_adapters(
        config: Config,
        connector: Arc<dyn Connector>,
        reader: Arc<dyn RecordReader>,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::from_config(&config.connections));
        let catalog = Arc::new(config.index_specs.clone());

        let service = Arc::new(Service::new(
            registry,
            catalog,
            connector,
            reader,
            config.store_upsert_options(),
        ));

        tracing::debug!(
            groups = ?service.registry().groups().collect::<Vec<_>>(),
            "Tenant migration module initialized"
        );
        Self { config, service }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Run every enabled job in order: index provisioning, then store upserts
    pub async fn run(&self) -> Result<RunSummary, MigrationError> {
        let mut summary = RunSummary::default();

        let provisioning = &self.config.index_provisioning;
        if provisioning.enabled {
            let report = self
                .service
                .provision_indexes(&provisioning.group, &provisioning.collection)
                .await?;
            summary.provisioning = Some(report);
        } else {
            tracing::info!("Index provisioning disabled");
        }

        let upsert = &self.config.store_upsert;
        if upsert.enabled {
            for job in &upsert.jobs {
                let report = self
                    .service
                    .upsert_stores(&job.tenant, &job.file, job.active)
                    .await?;
                summary.upserts.push(report);
            }
        } else if !upsert.jobs.is_empty() {
            tracing::info!(jobs = upsert.jobs.len(), "Store upsert disabled, skipping jobs");
        }

        Ok(summary)
    }
}
