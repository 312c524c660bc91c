//! Storage layer - MongoDB adapter

pub mod mapper;
pub mod repositories;

pub use repositories::{MongoConnector, MongoTenantConnection};
