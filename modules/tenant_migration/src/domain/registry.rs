//! Connection registry: (group, tenant) -> connection descriptor

use crate::config::{expand_env, TenantEntry};
use crate::contract::MigrationError;
use std::collections::BTreeMap;
use std::fmt;

/// Connection URI for one tenant database
///
/// The URI is used as given by the driver. `Display` and `Debug` mask the
/// password so descriptors can be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    uri: String,
}

impl ConnectionDescriptor {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Database name: the text after the last `/` and before the first `?`
    pub fn database_name(&self) -> Result<&str, MigrationError> {
        let start = self.uri.find("://").map_or(0, |i| i + 3);
        let rest = &self.uri[start..];
        let path = rest.find('?').map_or(rest, |q| &rest[..q]);

        let slash = path
            .rfind('/')
            .ok_or_else(|| self.invalid("no database path segment"))?;
        let name = &path[slash + 1..];
        if name.is_empty() {
            return Err(self.invalid("empty database name"));
        }
        Ok(name)
    }

    fn invalid(&self, details: &str) -> MigrationError {
        MigrationError::InvalidDescriptor {
            descriptor: self.redacted(),
            details: details.to_string(),
        }
    }

    fn redacted(&self) -> String {
        let start = self.uri.find("://").map_or(0, |i| i + 3);
        let authority_end = self.uri[start..]
            .find(['/', '?'])
            .map_or(self.uri.len(), |i| start + i);
        let authority = &self.uri[start..authority_end];

        match authority.rfind('@') {
            Some(at) => {
                let userinfo = &authority[..at];
                let user = userinfo.split(':').next().unwrap_or_default();
                let masked = if userinfo.contains(':') {
                    format!("{user}:****")
                } else {
                    user.to_string()
                };
                format!(
                    "{}{}{}",
                    &self.uri[..start],
                    masked,
                    &self.uri[start + at..]
                )
            }
            None => self.uri.clone(),
        }
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionDescriptor")
            .field(&self.redacted())
            .finish()
    }
}

/// Resolves `${VAR}` placeholders in descriptor templates
pub type VarLookup = fn(&str) -> Option<String>;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Read-only registry of tenant databases, partitioned by group
///
/// Descriptors are kept as templates and resolved on lookup, so only the
/// tenants a run actually touches need their variables set.
#[derive(Clone)]
pub struct ConnectionRegistry {
    groups: BTreeMap<String, BTreeMap<String, String>>,
    lookup: VarLookup,
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::with_lookup(process_env)
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookup(lookup: VarLookup) -> Self {
        Self {
            groups: BTreeMap::new(),
            lookup,
        }
    }

    /// Build from configuration, skipping disabled tenants; placeholders
    /// resolve from the process environment
    pub fn from_config(
        connections: &BTreeMap<String, BTreeMap<String, TenantEntry>>,
    ) -> Self {
        Self::from_config_with(connections, process_env)
    }

    /// Same as [`Self::from_config`] with an explicit variable lookup
    pub fn from_config_with(
        connections: &BTreeMap<String, BTreeMap<String, TenantEntry>>,
        lookup: VarLookup,
    ) -> Self {
        let mut registry = Self::with_lookup(lookup);
        for (group, tenants) in connections {
            // Keep empty groups so they list as empty rather than unknown
            registry.groups.entry(group.clone()).or_default();
            for (tenant, entry) in tenants {
                if !entry.enabled() {
                    tracing::debug!(group = %group, tenant = %tenant, "Skipping disabled tenant");
                    continue;
                }
                registry.insert(group.clone(), tenant.clone(), ConnectionDescriptor::new(entry.uri()));
            }
        }
        registry
    }

    /// Register a descriptor; a later insert for the same pair replaces it
    pub fn insert(
        &mut self,
        group: impl Into<String>,
        tenant: impl Into<String>,
        descriptor: ConnectionDescriptor,
    ) {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(tenant.into(), descriptor.uri);
    }

    /// Resolved descriptor for a tenant
    pub fn descriptor(&self, group: &str, tenant: &str) -> Result<ConnectionDescriptor, MigrationError> {
        let template = self
            .groups
            .get(group)
            .and_then(|tenants| tenants.get(tenant))
            .ok_or_else(|| MigrationError::UnknownTenant {
                group: group.to_string(),
                tenant: tenant.to_string(),
            })?;
        Ok(ConnectionDescriptor::new(expand_env(template, self.lookup)?))
    }

    /// Tenants of a group in lexicographic order
    pub fn tenants(&self, group: &str) -> Result<Vec<&str>, MigrationError> {
        self.groups
            .get(group)
            .map(|tenants| tenants.keys().map(String::as_str).collect())
            .ok_or_else(|| MigrationError::UnknownGroup {
                group: group.to_string(),
            })
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}
