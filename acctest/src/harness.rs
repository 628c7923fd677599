//! Test case model and the harness seam
//!
//! A `Harness` applies a rendered configuration and reports the state it
//! observed. `run` drives a `TestCase` through a harness: pre-check, apply
//! and check each step, then always destroy.

use crate::check::Check;
use crate::env::{acceptance_enabled, ConfigSource};
use crate::error::{AcctestError, Result};
use crate::types::State;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Applies configurations and tears them down again
#[async_trait]
pub trait Harness: Send + Sync {
    /// Applies `config` with the case's external `providers` and returns
    /// the resulting state
    async fn apply(
        &self,
        case_name: &str,
        providers: &ExternalProviders,
        config: &str,
    ) -> Result<State>;

    /// Destroys everything applied for `case_name`
    async fn destroy(&self, case_name: &str) -> Result<()>;
}

pub type PreCheck = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// Provider local name mapped to an optional version constraint
pub type ExternalProviders = BTreeMap<String, Option<String>>;

/// One apply-and-verify step
#[derive(Clone)]
pub struct TestStep {
    pub config: String,
    pub check: Option<Check>,
}

impl TestStep {
    pub fn new(config: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            check: None,
        }
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.check = Some(check);
        self
    }
}

impl fmt::Debug for TestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestStep")
            .field("config_len", &self.config.len())
            .field("has_check", &self.check.is_some())
            .finish()
    }
}

/// A complete acceptance test
pub struct TestCase {
    pub name: String,
    pub pre_check: Option<PreCheck>,
    /// Providers the configuration needs besides the one under test,
    /// mapped to an optional version constraint
    pub external_providers: ExternalProviders,
    pub steps: Vec<TestStep>,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pre_check: None,
            external_providers: ExternalProviders::new(),
            steps: Vec::new(),
        }
    }

    pub fn pre_check<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.pre_check = Some(Box::new(f));
        self
    }

    pub fn external_provider(mut self, name: impl Into<String>, version: Option<&str>) -> Self {
        self.external_providers
            .insert(name.into(), version.map(str::to_string));
        self
    }

    pub fn step(mut self, step: TestStep) -> Self {
        self.steps.push(step);
        self
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("has_pre_check", &self.pre_check.is_some())
            .field("external_providers", &self.external_providers)
            .field("steps", &self.steps)
            .finish()
    }
}

/// Fails with `AcceptanceDisabled` unless `TF_ACC` is set in `source`
pub fn pre_check_acceptance(source: &dyn ConfigSource) -> Result<()> {
    if acceptance_enabled(source) {
        Ok(())
    } else {
        Err(AcctestError::AcceptanceDisabled)
    }
}

/// Runs `case` against `harness`.
///
/// Destroy runs once after the first apply attempt, whether or not the
/// steps succeeded. A step failure is returned in preference to a destroy
/// failure.
pub async fn run(harness: &dyn Harness, case: &TestCase) -> Result<()> {
    if case.steps.is_empty() {
        return Err(AcctestError::InvalidTestCase(format!(
            "{} has no steps",
            case.name
        )));
    }

    if let Some(pre_check) = &case.pre_check {
        pre_check()?;
    }

    info!(case = %case.name, steps = case.steps.len(), "running test case");
    let outcome = run_steps(harness, case).await;

    let destroyed = harness.destroy(&case.name).await;
    if let Err(e) = &destroyed {
        warn!(case = %case.name, error = %e, "destroy failed");
    }

    outcome?;
    destroyed?;
    info!(case = %case.name, "test case passed");
    Ok(())
}

async fn run_steps(harness: &dyn Harness, case: &TestCase) -> Result<()> {
    for (idx, step) in case.steps.iter().enumerate() {
        debug!(case = %case.name, step = idx + 1, "applying step");
        let state = harness
            .apply(&case.name, &case.external_providers, &step.config)
            .await?;

        if let Some(check) = &step.check {
            check(&state).map_err(|e| {
                warn!(case = %case.name, step = idx + 1, error = %e, "check failed");
                e
            })?;
        }
    }
    Ok(())
}

/// Replays previously recorded states, one per apply
#[derive(Debug, Default)]
pub struct RecordedHarness {
    recording: Vec<State>,
    inner: Mutex<RecordedInner>,
}

#[derive(Debug, Default)]
struct RecordedInner {
    cursor: usize,
    applied: Vec<String>,
    destroyed: usize,
}

impl RecordedHarness {
    pub fn new(recording: Vec<State>) -> Self {
        Self {
            recording,
            inner: Mutex::new(RecordedInner::default()),
        }
    }

    /// Loads a JSON array of states
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let recording: Vec<State> = serde_json::from_str(&data)?;
        Ok(Self::new(recording))
    }

    /// Every configuration applied so far, in order
    pub async fn applied(&self) -> Vec<String> {
        self.inner.lock().await.applied.clone()
    }

    pub async fn destroy_count(&self) -> usize {
        self.inner.lock().await.destroyed
    }
}

#[async_trait]
impl Harness for RecordedHarness {
    async fn apply(
        &self,
        case_name: &str,
        _providers: &ExternalProviders,
        config: &str,
    ) -> Result<State> {
        let mut inner = self.inner.lock().await;
        let state = self.recording.get(inner.cursor).cloned().ok_or_else(|| {
            AcctestError::Harness(format!(
                "{}: recording exhausted after {} applies",
                case_name,
                self.recording.len()
            ))
        })?;
        inner.cursor += 1;
        inner.applied.push(config.to_string());
        Ok(state)
    }

    async fn destroy(&self, _case_name: &str) -> Result<()> {
        self.inner.lock().await.destroyed += 1;
        Ok(())
    }
}
