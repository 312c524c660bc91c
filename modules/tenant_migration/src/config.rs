//! Configuration for tenant migration
//!
//! Loaded once at startup from a YAML file, with `TENANT_MIGRATE__`
//! environment variables layered on top (`__` separates nested keys, e.g.
//! `TENANT_MIGRATE__CONNECTIONS__LOGS__VINCULUM`).

use crate::contract::{IndexSpec, MigrationError, DEFAULT_STORE_TYPE};
use crate::domain::StoreUpsertOptions;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "TENANT_MIGRATE__";

/// Tenant migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Identity stamped on created_by / modified_by
    #[serde(default = "default_operator")]
    pub operator: String,

    /// store_type stamped on every store document
    #[serde(default = "default_store_type")]
    pub store_type: String,

    /// Base directory for relative upsert source paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    /// Connection registry: group -> tenant -> descriptor
    #[serde(default)]
    pub connections: BTreeMap<String, BTreeMap<String, TenantEntry>>,

    /// Compound index specifications keyed by collection
    #[serde(default)]
    pub index_specs: BTreeMap<String, Vec<IndexSpec>>,

    #[serde(default)]
    pub index_provisioning: IndexProvisioningConfig,

    #[serde(default)]
    pub store_upsert: StoreUpsertConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            operator: default_operator(),
            store_type: default_store_type(),
            source_dir: None,
            connections: BTreeMap::new(),
            index_specs: BTreeMap::new(),
            index_provisioning: IndexProvisioningConfig::default(),
            store_upsert: StoreUpsertConfig::default(),
        }
    }
}

impl Config {
    /// Load defaults, then the YAML file (if given), then env overrides
    pub fn load(path: Option<&Path>) -> Result<Self, MigrationError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(MigrationError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Yaml::file(path));
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Parse a YAML document without touching the environment
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MigrationError> {
        Self::extract(Figment::from(Serialized::defaults(Config::default())).merge(Yaml::string(yaml)))
    }

    fn extract(figment: Figment) -> Result<Self, MigrationError> {
        figment
            .extract()
            .map_err(|e| MigrationError::Config(e.to_string()))
    }

    /// Parameters of the store upsert procedure
    pub fn store_upsert_options(&self) -> StoreUpsertOptions {
        StoreUpsertOptions {
            group: self.store_upsert.group.clone(),
            collection: self.store_upsert.collection.clone(),
            store_type: self.store_type.clone(),
            operator: self.operator.clone(),
            source_dir: self.source_dir.clone(),
        }
    }
}

/// A registry entry: a bare URI, or a URI with an enable flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TenantEntry {
    Uri(String),
    Entry {
        uri: String,
        #[serde(default = "default_true")]
        enabled: bool,
    },
}

impl TenantEntry {
    pub fn uri(&self) -> &str {
        match self {
            Self::Uri(uri) | Self::Entry { uri, .. } => uri,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Self::Uri(_) => true,
            Self::Entry { enabled, .. } => *enabled,
        }
    }
}

/// Index provisioning job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexProvisioningConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_index_group")]
    pub group: String,

    #[serde(default = "default_index_collection")]
    pub collection: String,
}

impl Default for IndexProvisioningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            group: default_index_group(),
            collection: default_index_collection(),
        }
    }
}

/// Store upsert jobs; disabled unless switched on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreUpsertConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_store_group")]
    pub group: String,

    #[serde(default = "default_store_collection")]
    pub collection: String,

    #[serde(default)]
    pub jobs: Vec<StoreUpsertJob>,
}

impl Default for StoreUpsertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            group: default_store_group(),
            collection: default_store_collection(),
            jobs: Vec::new(),
        }
    }
}

/// One source file to upsert into one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreUpsertJob {
    pub tenant: String,
    pub file: PathBuf,
    /// ACTIVE when true, INACTIVE otherwise
    #[serde(default)]
    pub active: bool,
}

/// Replace `${VAR}` placeholders using `lookup`; unknown variables fail
pub fn expand_env<F>(input: &str, lookup: F) -> Result<String, MigrationError>
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| MigrationError::Config(e.to_string()))?;

    let mut missing = None;
    let expanded = pattern.replace_all(input, |caps: &Captures<'_>| {
        let name = &caps[1];
        lookup(name).unwrap_or_else(|| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });

    match missing {
        Some(name) => Err(MigrationError::Config(format!(
            "environment variable '{name}' is not set"
        ))),
        None => Ok(expanded.into_owned()),
    }
}

fn default_operator() -> String {
    "tenant-migrate".to_string()
}

fn default_store_type() -> String {
    DEFAULT_STORE_TYPE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_index_group() -> String {
    "logs".to_string()
}

fn default_index_collection() -> String {
    "shipment_event_log".to_string()
}

fn default_store_group() -> String {
    "ext".to_string()
}

fn default_store_collection() -> String {
    "store".to_string()
}
