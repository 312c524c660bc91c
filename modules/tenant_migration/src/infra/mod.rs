//! Infrastructure - database and file adapters

pub mod source;
pub mod storage;

pub use source::{FileRecordReader, SourceFormat};
pub use storage::MongoConnector;
