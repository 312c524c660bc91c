//! Contract layer - public types shared by the domain and storage layers

pub mod error;
pub mod model;

pub use error::MigrationError;
pub use model::{
    IndexAttempt, IndexAttemptOutcome, IndexDirection, IndexKey, IndexSpec, ProvisioningReport,
    StoreDocument, StoreStatus, UpsertOutcome, UpsertReport, DEFAULT_STORE_TYPE,
};
