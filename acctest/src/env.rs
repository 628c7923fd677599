//! Configuration sources for acceptance tests
//!
//! Values like the organization id or billing account come from the process
//! environment in real runs. Tests pass a `MapSource` instead so they never
//! touch global state.

use crate::error::{AcctestError, Result};
use std::collections::HashMap;

/// Environment variables naming the organization to create projects in
pub const ORG_ENV_VARS: &[&str] = &["GOOGLE_ORG"];

/// Environment variables naming the billing account for new projects
pub const BILLING_ACCOUNT_ENV_VARS: &[&str] = &["GOOGLE_BILLING_ACCOUNT"];

/// Environment variables naming the default project, in priority order
pub const PROJECT_ENV_VARS: &[&str] = &[
    "GOOGLE_PROJECT",
    "GOOGLE_CLOUD_PROJECT",
    "GCLOUD_PROJECT",
    "CLOUDSDK_CORE_PROJECT",
];

/// Environment variables naming the default region, in priority order
pub const REGION_ENV_VARS: &[&str] = &["GOOGLE_REGION", "GCLOUD_REGION", "CLOUDSDK_COMPUTE_REGION"];

pub const DEFAULT_REGION: &str = "us-central1";

/// Gate variable: acceptance tests touch real infrastructure only when set
pub const ACCEPTANCE_ENV_VAR: &str = "TF_ACC";

/// Read-only source of named configuration values
pub trait ConfigSource: Send + Sync {
    /// Returns the raw value, or None when unset
    fn get(&self, name: &str) -> Option<String>;

    /// Returns the value only when set to something non-empty
    fn get_non_empty(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_empty())
    }
}

/// Reads from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory source, mainly for tests
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl ConfigSource for MapSource {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MapSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// First non-empty value among `vars`
pub fn multi_env_search(source: &dyn ConfigSource, vars: &[&str]) -> Option<String> {
    vars.iter().find_map(|var| source.get_non_empty(var))
}

/// Like `multi_env_search` but fails with `MissingEnvironment` naming every
/// variable consulted
pub fn require(source: &dyn ConfigSource, key: &str, vars: &[&str]) -> Result<String> {
    multi_env_search(source, vars).ok_or_else(|| AcctestError::MissingEnvironment {
        key: key.to_string(),
        vars: vars.iter().map(|v| v.to_string()).collect(),
    })
}

pub fn org_id(source: &dyn ConfigSource) -> Result<String> {
    require(source, "org_id", ORG_ENV_VARS)
}

pub fn billing_account(source: &dyn ConfigSource) -> Result<String> {
    require(source, "billing_account", BILLING_ACCOUNT_ENV_VARS)
}

pub fn project(source: &dyn ConfigSource) -> Result<String> {
    require(source, "project", PROJECT_ENV_VARS)
}

pub fn region(source: &dyn ConfigSource) -> String {
    multi_env_search(source, REGION_ENV_VARS).unwrap_or_else(|| DEFAULT_REGION.to_string())
}

/// True when acceptance runs are enabled
pub fn acceptance_enabled(source: &dyn ConfigSource) -> bool {
    source.get_non_empty(ACCEPTANCE_ENV_VAR).is_some()
}
