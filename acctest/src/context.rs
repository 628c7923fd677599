//! Template context and its builder
//!
//! A `Context` maps placeholder names to values for one test invocation.
//! `ContextBuilder` assembles it from literal values, random suffixes, and a
//! `ConfigSource`, deferring lookup failures until `build()`.

use crate::env::{self, ConfigSource};
use crate::error::{AcctestError, Result};
use crate::random::{seeded_rng, RandomChars};
use crate::types::Scalar;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Default suffix length used by fixtures
pub const DEFAULT_SUFFIX_LEN: usize = 10;

/// Context carries the named values substituted into a template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: BTreeMap<String, Scalar>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context with `key` set
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.values.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(Scalar::to_string)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Scalar)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Builds a `Context` for one test invocation
pub struct ContextBuilder<'a> {
    source: &'a dyn ConfigSource,
    rng: Option<StdRng>,
    values: BTreeMap<String, Scalar>,
    error: Option<AcctestError>,
}

impl fmt::Debug for ContextBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("seeded", &self.rng.is_some())
            .field("values", &self.values)
            .field("error", &self.error)
            .finish()
    }
}

impl<'a> ContextBuilder<'a> {
    pub fn new(source: &'a dyn ConfigSource) -> Self {
        Self {
            source,
            rng: None,
            values: BTreeMap::new(),
            error: None,
        }
    }

    /// Makes every later `random_suffix` reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(seeded_rng(seed));
        self
    }

    /// Sets a literal value; a repeated key replaces the earlier value
    pub fn value(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Sets `key` to a random alphanumeric string of length `len`
    pub fn random_suffix(mut self, key: impl Into<String>, len: usize) -> Self {
        let chars = RandomChars::alpha_num();
        let suffix = match self.rng.as_mut() {
            Some(rng) => chars.sample_with(rng, len),
            None => chars.sample(len),
        };
        self.values.insert(key.into(), Scalar::String(suffix));
        self
    }

    /// Sets `key` from the first non-empty variable in `vars`, failing the
    /// build when none is set
    pub fn env(mut self, key: impl Into<String>, vars: &[&str]) -> Self {
        let key = key.into();
        match env::require(self.source, &key, vars) {
            Ok(value) => {
                self.values.insert(key, Scalar::String(value));
            }
            Err(e) => self.record_error(e),
        }
        self
    }

    /// Sets `key` from `vars`, falling back to `default`
    pub fn env_or(mut self, key: impl Into<String>, vars: &[&str], default: &str) -> Self {
        let value = env::multi_env_search(self.source, vars).unwrap_or_else(|| default.to_string());
        self.values.insert(key.into(), Scalar::String(value));
        self
    }

    pub fn org_id(self) -> Self {
        self.env("org_id", env::ORG_ENV_VARS)
    }

    pub fn billing_account(self) -> Self {
        self.env("billing_account", env::BILLING_ACCOUNT_ENV_VARS)
    }

    pub fn build(self) -> Result<Context> {
        if let Some(e) = self.error {
            return Err(e);
        }
        debug!(keys = ?self.values.keys().collect::<Vec<_>>(), "built template context");
        Ok(Context {
            values: self.values,
        })
    }

    fn record_error(&mut self, e: AcctestError) {
        if self.error.is_none() {
            self.error = Some(e);
        }
    }
}
