//! Conversions between contract models and BSON

use crate::contract::{IndexAttemptOutcome, IndexSpec, StoreDocument};
use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, Document};
use mongodb::error::{Error, ErrorKind};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;

// ===== Store Conversions =====

fn bson_datetime(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

/// Filter matching the store's business key
pub fn store_filter(store: &StoreDocument) -> Document {
    doc! { "store_id": store.store_id }
}

/// `$set` payload; every field is overwritten on each upsert
pub fn store_update(store: &StoreDocument) -> Document {
    doc! {
        "$set": {
            "store_name": store.store_name.as_str(),
            "store_id": store.store_id,
            "store_code": store.store_code.as_str(),
            "company_id": store.company_id,
            "store_type": store.store_type.as_str(),
            "status": store.status.as_str(),
            "created_on": bson_datetime(store.created_on),
            "modified_on": bson_datetime(store.modified_on),
            "created_by": store.created_by.as_str(),
            "modified_by": store.modified_by.as_str(),
        }
    }
}

// ===== Index Conversions =====

/// Ordered key document, e.g. `{ modified_on: 1, status: 1 }`
pub fn index_keys(spec: &IndexSpec) -> Document {
    let mut keys = Document::new();
    for key in &spec.keys {
        keys.insert(key.field(), key.direction().as_i32());
    }
    keys
}

pub fn index_model(spec: &IndexSpec) -> IndexModel {
    let options = IndexOptions::builder()
        .name(spec.name.clone())
        .unique(spec.unique.then_some(true))
        .build();

    IndexModel::builder()
        .keys(index_keys(spec))
        .options(options)
        .build()
}

/// Server-side command failures (conflicting options, key specs, ...)
/// become a reported rejection; everything else is not ours to classify.
pub fn index_rejection(error: &Error) -> Option<IndexAttemptOutcome> {
    match &*error.kind {
        ErrorKind::Command(command) => Some(IndexAttemptOutcome::Rejected {
            code: Some(command.code),
            reason: format!("{} ({}): {}", command.code_name, command.code, command.message),
        }),
        _ => None,
    }
}
