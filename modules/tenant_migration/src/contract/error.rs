//! Contract error types for tenant migration

use std::path::PathBuf;
use thiserror::Error;

/// Tenant migration errors
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Group is not present in the connection registry
    #[error("unknown database group '{group}'")]
    UnknownGroup { group: String },

    /// Tenant is not registered (or disabled) within its group
    #[error("unknown tenant '{tenant}' in group '{group}'")]
    UnknownTenant { group: String, tenant: String },

    /// Connection descriptor has no usable database segment
    #[error("invalid connection descriptor {descriptor}: {details}")]
    InvalidDescriptor { descriptor: String, details: String },

    /// Source record lacks a required column, or the value is blank
    #[error("record {record}: missing required field '{field}'")]
    MissingField { record: usize, field: &'static str },

    /// Source record value cannot be converted to the document type
    #[error("record {record}: invalid value '{value}' for field '{field}'")]
    InvalidField {
        record: usize,
        field: &'static str,
        value: String,
    },

    /// Source file extension is neither CSV nor a spreadsheet
    #[error("unsupported source format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Source file could not be read
    #[error("failed to read source {}: {details}", path.display())]
    Source { path: PathBuf, details: String },

    /// No index specification is registered for the collection
    #[error("no index specifications registered for collection '{collection}'")]
    NoIndexSpecs { collection: String },

    /// Server rejected an index definition
    #[error("index creation failed on {database}.{collection} ({index}): {reason}")]
    IndexCreationFailure {
        database: String,
        collection: String,
        index: String,
        code: Option<i32>,
        reason: String,
    },

    /// Configuration could not be loaded or resolved
    #[error("configuration error: {0}")]
    Config(String),

    /// Any other driver or connection failure
    #[error("database error: {0:#}")]
    Database(#[from] anyhow::Error),
}
