//! Source record schema and mapping to store documents

use crate::contract::{MigrationError, StoreDocument, StoreStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub const STORE_NAME: &str = "store_name";
pub const STORE_ID: &str = "store_id";
pub const STORE_CODE: &str = "fynd_store_code";
pub const COMPANY_ID: &str = "company_id";

/// One row of a tabular source, keyed by header name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// 1-based data row number (header excluded)
    pub index: usize,
    fields: HashMap<String, String>,
}

impl SourceRecord {
    pub fn new(index: usize, fields: HashMap<String, String>) -> Self {
        Self { index, fields }
    }

    pub fn from_pairs<K, V>(index: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            index,
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Raw value as read; whitespace-only counts as missing
    fn required(&self, field: &'static str) -> Result<&str, MigrationError> {
        match self.get(field) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(MigrationError::MissingField {
                record: self.index,
                field,
            }),
        }
    }

    fn required_int(&self, field: &'static str) -> Result<i64, MigrationError> {
        let value = self.required(field)?.trim();
        value.parse::<i64>().map_err(|_| MigrationError::InvalidField {
            record: self.index,
            field,
            value: value.to_string(),
        })
    }
}

/// Validated store row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub store_name: String,
    pub store_id: i64,
    pub store_code: String,
    pub company_id: i64,
}

impl StoreRecord {
    pub fn parse(record: &SourceRecord) -> Result<Self, MigrationError> {
        Ok(Self {
            store_name: record.required(STORE_NAME)?.to_string(),
            store_id: record.required_int(STORE_ID)?,
            store_code: record.required(STORE_CODE)?.to_string(),
            company_id: record.required_int(COMPANY_ID)?,
        })
    }

    pub fn into_document(self, stamp: &DocumentStamp, now: DateTime<Utc>) -> StoreDocument {
        StoreDocument {
            store_name: self.store_name,
            store_id: self.store_id,
            store_code: self.store_code,
            company_id: self.company_id,
            store_type: stamp.store_type.clone(),
            status: stamp.status,
            created_on: now,
            modified_on: now,
            created_by: stamp.operator.clone(),
            modified_by: stamp.operator.clone(),
        }
    }
}

/// Fixed values stamped on every document of one upsert run
#[derive(Debug, Clone)]
pub struct DocumentStamp {
    pub store_type: String,
    pub operator: String,
    pub status: StoreStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::DEFAULT_STORE_TYPE;

    fn stamp(active: bool) -> DocumentStamp {
        DocumentStamp {
            store_type: DEFAULT_STORE_TYPE.to_string(),
            operator: "migration_bot".to_string(),
            status: StoreStatus::from_active(active),
        }
    }

    fn store_a() -> SourceRecord {
        SourceRecord::from_pairs(
            1,
            [
                ("store_name", "Store A"),
                ("store_id", "101"),
                ("fynd_store_code", "SA1"),
                ("company_id", "5"),
            ],
        )
    }

    #[test]
    fn test_textual_ids_become_integers() {
        let now = Utc::now();
        let doc = StoreRecord::parse(&store_a())
            .unwrap()
            .into_document(&stamp(true), now);

        assert_eq!(doc.store_id, 101);
        assert_eq!(doc.company_id, 5);
        assert_eq!(doc.store_name, "Store A");
        assert_eq!(doc.store_code, "SA1");
        assert_eq!(doc.store_type, "high_street");
        assert_eq!(doc.status, StoreStatus::Active);
        assert_eq!(doc.created_on, now);
        assert_eq!(doc.modified_on, now);
        assert_eq!(doc.created_by, "migration_bot");
        assert_eq!(doc.modified_by, "migration_bot");
    }

    #[test]
    fn test_inactive_flag() {
        let doc = StoreRecord::parse(&store_a())
            .unwrap()
            .into_document(&stamp(false), Utc::now());
        assert_eq!(doc.status, StoreStatus::Inactive);
    }

    #[test]
    fn test_ids_are_trimmed() {
        let record = SourceRecord::from_pairs(
            3,
            [
                ("store_name", "Store B"),
                ("store_id", " 202 "),
                ("fynd_store_code", "SB2"),
                ("company_id", "7"),
            ],
        );
        assert_eq!(StoreRecord::parse(&record).unwrap().store_id, 202);
    }

    #[test]
    fn test_text_values_kept_as_read() {
        let record = SourceRecord::from_pairs(
            5,
            [
                ("store_name", " Store A "),
                ("store_id", "101"),
                ("fynd_store_code", " SA1"),
                ("company_id", " 5"),
            ],
        );
        let store = StoreRecord::parse(&record).unwrap();
        assert_eq!(store.store_name, " Store A ");
        assert_eq!(store.store_code, " SA1");
        assert_eq!(store.company_id, 5);
    }

    #[test]
    fn test_missing_column() {
        let record = SourceRecord::from_pairs(
            4,
            [("store_name", "Store C"), ("store_id", "1"), ("company_id", "2")],
        );
        match StoreRecord::parse(&record) {
            Err(MigrationError::MissingField { record, field }) => {
                assert_eq!(record, 4);
                assert_eq!(field, "fynd_store_code");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let record = SourceRecord::from_pairs(
            2,
            [
                ("store_name", "  "),
                ("store_id", "1"),
                ("fynd_store_code", "X"),
                ("company_id", "2"),
            ],
        );
        assert!(matches!(
            StoreRecord::parse(&record),
            Err(MigrationError::MissingField { field: "store_name", .. })
        ));
    }

    #[test]
    fn test_non_numeric_id() {
        let record = SourceRecord::from_pairs(
            9,
            [
                ("store_name", "Store D"),
                ("store_id", "S-101"),
                ("fynd_store_code", "SD1"),
                ("company_id", "5"),
            ],
        );
        match StoreRecord::parse(&record) {
            Err(MigrationError::InvalidField { record, field, value }) => {
                assert_eq!(record, 9);
                assert_eq!(field, "store_id");
                assert_eq!(value, "S-101");
            }
            other => panic!("expected InvalidField, got {other:?}"),
        }
    }
}
