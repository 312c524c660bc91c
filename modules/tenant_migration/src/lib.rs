//! Tenant Migration Module
//!
//! Administrative migrations for a multi-tenant MongoDB deployment: bulk
//! upsert of store records from CSV/spreadsheet files, and provisioning of
//! compound indexes across every tenant database of a group.

// Public exports
pub mod contract;
pub use contract::{
    IndexAttempt, IndexAttemptOutcome, IndexDirection, IndexKey, IndexSpec, MigrationError,
    ProvisioningReport, StoreDocument, StoreStatus, UpsertOutcome, UpsertReport,
};

pub mod config;
pub use config::Config;

pub mod module;
pub use module::{RunSummary, TenantMigrationModule};

pub mod domain;
pub mod infra;
