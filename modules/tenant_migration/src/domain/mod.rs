//! Domain layer - business logic and services

pub mod record;
pub mod registry;
pub mod repository;
pub mod service;

pub use record::{SourceRecord, StoreRecord};
pub use registry::{ConnectionDescriptor, ConnectionRegistry};
pub use repository::{Connector, RecordReader, TenantConnection};
pub use service::{IndexCatalog, Service, StoreUpsertOptions};
