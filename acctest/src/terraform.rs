//! Harness backed by the Terraform CLI
//!
//! Each apply writes the rendered configuration to `main.tf` in the working
//! directory, declares the case's external providers in `providers.tf`,
//! runs `init` and `apply`, then reads state back through
//! `terraform show -json`. Commands are bounded by a timeout and never
//! retried.

use crate::env::ConfigSource;
use crate::error::{AcctestError, Result};
use crate::harness::{ExternalProviders, Harness};
use crate::types::{flatten_attributes, State};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Overrides the terraform binary used by acceptance runs
pub const TERRAFORM_PATH_ENV_VAR: &str = "TF_ACC_TERRAFORM_PATH";

const DEFAULT_BINARY: &str = "terraform";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const CONFIG_FILE: &str = "main.tf";
const PROVIDERS_FILE: &str = "providers.tf";
const DEFAULT_PROVIDER_NAMESPACE: &str = "hashicorp";

#[derive(Debug, Clone)]
pub struct TerraformCli {
    binary: PathBuf,
    work_dir: PathBuf,
    timeout: Duration,
}

impl TerraformCli {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            work_dir: work_dir.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Uses `TF_ACC_TERRAFORM_PATH` from `source` when set
    pub fn from_source(source: &dyn ConfigSource, work_dir: impl Into<PathBuf>) -> Self {
        let cli = Self::new(work_dir);
        match source.get_non_empty(TERRAFORM_PATH_ENV_VAR) {
            Some(path) => cli.with_binary(path),
            None => cli,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn terraform(&self, args: &[&str]) -> Result<String> {
        let command = format!("terraform {}", args.join(" "));
        debug!(command = %command, dir = %self.work_dir.display(), "running");

        let child = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.work_dir)
            .env("TF_IN_AUTOMATION", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| AcctestError::Timeout {
                command: command.clone(),
                seconds: self.timeout.as_secs(),
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcctestError::Harness(format!(
                "'{}' exited with {}: {}",
                command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Harness for TerraformCli {
    async fn apply(
        &self,
        case_name: &str,
        providers: &ExternalProviders,
        config: &str,
    ) -> Result<State> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        tokio::fs::write(self.work_dir.join(CONFIG_FILE), config).await?;

        let providers_path = self.work_dir.join(PROVIDERS_FILE);
        match required_providers_block(providers) {
            Some(block) => tokio::fs::write(&providers_path, block).await?,
            None if providers_path.exists() => tokio::fs::remove_file(&providers_path).await?,
            None => {}
        }

        info!(case = %case_name, "terraform apply");
        self.terraform(&["init", "-input=false", "-no-color"]).await?;
        self.terraform(&["apply", "-auto-approve", "-input=false", "-no-color"])
            .await?;

        let shown = self.terraform(&["show", "-json", "-no-color"]).await?;
        parse_show_json(&shown)
    }

    async fn destroy(&self, case_name: &str) -> Result<()> {
        if !self.work_dir.join(CONFIG_FILE).exists() {
            debug!(case = %case_name, "nothing applied, skipping destroy");
            return Ok(());
        }
        info!(case = %case_name, "terraform destroy");
        self.terraform(&["destroy", "-auto-approve", "-input=false", "-no-color"])
            .await
            .map(|_| ())
    }
}

/// `terraform { required_providers { ... } }` for `providers`, or None when
/// there are none. Sources default to the `hashicorp` namespace.
pub fn required_providers_block(providers: &ExternalProviders) -> Option<String> {
    if providers.is_empty() {
        return None;
    }

    let mut block = String::from("terraform {\n  required_providers {\n");
    for (name, version) in providers {
        block.push_str(&format!("    {} = {{\n", name));
        block.push_str(&format!(
            "      source = \"{}/{}\"\n",
            DEFAULT_PROVIDER_NAMESPACE, name
        ));
        if let Some(version) = version {
            block.push_str(&format!("      version = \"{}\"\n", version));
        }
        block.push_str("    }\n");
    }
    block.push_str("  }\n}\n");
    Some(block)
}

#[derive(Debug, Deserialize)]
struct ShowOutput {
    #[serde(default)]
    values: Option<ShowValues>,
}

#[derive(Debug, Deserialize)]
struct ShowValues {
    #[serde(default)]
    root_module: Option<ShowModule>,
}

#[derive(Debug, Deserialize)]
struct ShowModule {
    #[serde(default)]
    resources: Vec<ShowResource>,
    #[serde(default)]
    child_modules: Vec<ShowModule>,
}

#[derive(Debug, Deserialize)]
struct ShowResource {
    address: String,
    #[serde(default)]
    values: Value,
}

/// Converts `terraform show -json` output into `State`
pub fn parse_show_json(data: &str) -> Result<State> {
    let output: ShowOutput = serde_json::from_str(data)?;
    let mut state = State::new();
    if let Some(root) = output.values.and_then(|v| v.root_module) {
        collect_module(&root, &mut state);
    }
    Ok(state)
}

fn collect_module(module: &ShowModule, state: &mut State) {
    for resource in &module.resources {
        state.insert_resource(resource.address.clone(), flatten_attributes(&resource.values));
    }
    for child in &module.child_modules {
        collect_module(child, state);
    }
}
