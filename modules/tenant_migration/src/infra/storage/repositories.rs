//! MongoDB implementations

use crate::contract::{IndexAttemptOutcome, IndexSpec, StoreDocument, UpsertOutcome};
use crate::domain::repository::{Connector, TenantConnection};
use crate::domain::ConnectionDescriptor;
use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::Document;
use mongodb::{Client, Database};

use super::mapper;

// ===== Connector =====

/// Opens one driver client per connection; no pooling across tenants
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

impl MongoConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        database: &str,
    ) -> Result<Box<dyn TenantConnection>> {
        let client = Client::with_uri_str(descriptor.uri())
            .await
            .with_context(|| format!("failed to connect to {descriptor}"))?;
        let database = client.database(database);

        Ok(Box::new(MongoTenantConnection { client, database }))
    }
}

// ===== Tenant Connection =====

pub struct MongoTenantConnection {
    client: Client,
    database: Database,
}

#[async_trait]
impl TenantConnection for MongoTenantConnection {
    async fn upsert_store(&self, collection: &str, store: &StoreDocument) -> Result<UpsertOutcome> {
        let result = self
            .database
            .collection::<Document>(collection)
            .update_one(mapper::store_filter(store), mapper::store_update(store))
            .upsert(true)
            .await
            .with_context(|| format!("upsert of store {} failed", store.store_id))?;

        Ok(if result.upserted_id.is_some() {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn create_index(&self, collection: &str, spec: &IndexSpec) -> Result<IndexAttemptOutcome> {
        let created = self
            .database
            .collection::<Document>(collection)
            .create_index(mapper::index_model(spec))
            .await;

        match created {
            Ok(result) => Ok(IndexAttemptOutcome::Created {
                index_name: result.index_name,
            }),
            Err(error) => match mapper::index_rejection(&error) {
                Some(rejected) => Ok(rejected),
                None => Err(anyhow::Error::new(error).context(format!(
                    "index creation on {}.{} failed",
                    self.database.name(),
                    collection
                ))),
            },
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client.shutdown().await;
        Ok(())
    }
}
