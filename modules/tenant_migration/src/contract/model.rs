//! Contract models for tenant migration
//!
//! These models are transport-agnostic and shared by the domain service and
//! the storage adapters. Index specifications also appear in configuration,
//! so they carry serde derives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store type stamped on every store document unless configured otherwise
pub const DEFAULT_STORE_TYPE: &str = "high_street";

/// Store lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Active,
    Inactive,
}

impl StoreStatus {
    /// Map the `active` flag of an upsert job to a status
    pub fn from_active(active: bool) -> Self {
        if active {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical store document written to a tenant's store collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDocument {
    pub store_name: String,
    /// Business key; one document per store_id within a collection
    pub store_id: i64,
    pub store_code: String,
    pub company_id: i64,
    pub store_type: String,
    pub status: StoreStatus,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
    pub created_by: String,
    pub modified_by: String,
}

/// Whether an upsert inserted a new document or updated an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Per-field sort direction of an index key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDirection", into = "i32")]
pub enum IndexDirection {
    Ascending,
    Descending,
}

impl IndexDirection {
    /// Server-side representation (1 / -1)
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

impl From<IndexDirection> for i32 {
    fn from(direction: IndexDirection) -> Self {
        direction.as_i32()
    }
}

/// Accepted spellings of a direction in configuration files
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDirection {
    Number(i64),
    Text(String),
}

impl TryFrom<RawDirection> for IndexDirection {
    type Error = String;

    fn try_from(raw: RawDirection) -> Result<Self, Self::Error> {
        match raw {
            RawDirection::Number(1) => Ok(Self::Ascending),
            RawDirection::Number(-1) => Ok(Self::Descending),
            RawDirection::Number(n) => Err(format!("invalid index direction {n}, expected 1 or -1")),
            RawDirection::Text(text) => match text.to_ascii_lowercase().as_str() {
                "1" | "asc" | "ascending" => Ok(Self::Ascending),
                "-1" | "desc" | "descending" => Ok(Self::Descending),
                _ => Err(format!(
                    "invalid index direction '{text}', expected asc/desc or 1/-1"
                )),
            },
        }
    }
}

/// One (field, direction) pair of a compound index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey(pub String, pub IndexDirection);

impl IndexKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self(field.into(), IndexDirection::Ascending)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self(field.into(), IndexDirection::Descending)
    }

    pub fn field(&self) -> &str {
        &self.0
    }

    pub fn direction(&self) -> IndexDirection {
        self.1
    }
}

/// Compound index specification; key order is significant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIndexSpec")]
pub struct IndexSpec {
    pub keys: Vec<IndexKey>,
    /// Explicit index name; the server derives one from the keys when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub unique: bool,
}

/// A spec is either a bare list of keys or a table with options
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndexSpec {
    Keys(Vec<IndexKey>),
    Full {
        keys: Vec<IndexKey>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        unique: bool,
    },
}

impl TryFrom<RawIndexSpec> for IndexSpec {
    type Error = String;

    fn try_from(raw: RawIndexSpec) -> Result<Self, Self::Error> {
        let spec = match raw {
            RawIndexSpec::Keys(keys) => Self::new(keys),
            RawIndexSpec::Full { keys, name, unique } => Self { keys, name, unique },
        };
        if spec.keys.is_empty() {
            return Err("index specification needs at least one key".to_string());
        }
        Ok(spec)
    }
}

impl IndexSpec {
    pub fn new(keys: Vec<IndexKey>) -> Self {
        Self {
            keys,
            name: None,
            unique: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Name the server generates for these keys: `field_dir` joined by `_`
    pub fn generated_name(&self) -> String {
        self.keys
            .iter()
            .map(|key| format!("{}_{}", key.field(), key.direction().as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Explicit name if set, otherwise the generated one
    pub fn effective_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.generated_name())
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({}, {})", key.field(), key.direction().as_i32())?;
        }
        f.write_str("]")?;
        if self.unique {
            f.write_str(" unique")?;
        }
        Ok(())
    }
}

/// Report returned by one store upsert run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertReport {
    pub tenant: String,
    pub database: String,
    pub collection: String,
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Outcome of a single index creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexAttemptOutcome {
    /// Index exists after the call (created now or already present)
    Created { index_name: String },
    /// Server rejected the definition; reported, not fatal
    Rejected { code: Option<i32>, reason: String },
}

/// One (tenant, specification) cycle of the provisioning loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAttempt {
    pub tenant: String,
    pub database: String,
    pub collection: String,
    pub spec: IndexSpec,
    pub outcome: IndexAttemptOutcome,
}

/// Report returned by a provisioning loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningReport {
    pub attempts: Vec<IndexAttempt>,
}

impl ProvisioningReport {
    pub fn created(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, IndexAttemptOutcome::Created { .. }))
            .count()
    }

    pub fn rejected(&self) -> usize {
        self.attempts.len() - self.created()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_name_follows_server_convention() {
        let spec = IndexSpec::new(vec![IndexKey::asc("store_id"), IndexKey::desc("store_name")]);
        assert_eq!(spec.generated_name(), "store_id_1_store_name_-1");
        assert_eq!(spec.effective_name(), "store_id_1_store_name_-1");
        assert_eq!(spec.clone().named("by_store").effective_name(), "by_store");
    }

    #[test]
    fn test_status_from_active_flag() {
        assert_eq!(StoreStatus::from_active(true).as_str(), "ACTIVE");
        assert_eq!(StoreStatus::from_active(false).as_str(), "INACTIVE");
    }

    #[test]
    fn test_direction_spellings() {
        assert_eq!(
            IndexDirection::try_from(RawDirection::Number(-1)),
            Ok(IndexDirection::Descending)
        );
        assert_eq!(
            IndexDirection::try_from(RawDirection::Text("ASC".into())),
            Ok(IndexDirection::Ascending)
        );
        assert!(IndexDirection::try_from(RawDirection::Number(2)).is_err());
        assert!(IndexDirection::try_from(RawDirection::Text("up".into())).is_err());
    }

    #[test]
    fn test_empty_keys_rejected() {
        assert!(IndexSpec::try_from(RawIndexSpec::Keys(Vec::new())).is_err());
        assert!(IndexSpec::try_from(RawIndexSpec::Full {
            keys: Vec::new(),
            name: Some("by_nothing".to_string()),
            unique: false,
        })
        .is_err());
        assert!(IndexSpec::try_from(RawIndexSpec::Keys(vec![IndexKey::asc("status")])).is_ok());
    }

    #[test]
    fn test_display_lists_keys_in_order() {
        let spec = IndexSpec::new(vec![IndexKey::asc("modified_on"), IndexKey::asc("status")]);
        assert_eq!(spec.to_string(), "[(modified_on, 1), (status, 1)]");
    }
}
