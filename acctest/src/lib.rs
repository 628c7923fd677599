//! acctest - acceptance test support for Terraform providers
//!
//! Renders `%{name}` configuration templates from a per-test context, builds
//! that context from the environment and random suffixes, and drives test
//! cases through a pluggable harness.

// Core modules
pub mod context;
pub mod error;
pub mod template;
pub mod types;

// Context sources
pub mod env;
pub mod random;

// Harness modules
pub mod check;
pub mod harness;
pub mod terraform;

// Re-exports for convenience
pub use check::{
    check_resource_attr, check_resource_attr_set, check_resource_exists, compose,
    compose_aggregate, Check,
};
pub use context::{Context, ContextBuilder, DEFAULT_SUFFIX_LEN};
pub use env::{ConfigSource, MapSource, ProcessEnv};
pub use error::{AcctestError, Result};
pub use harness::{
    pre_check_acceptance, run, ExternalProviders, Harness, RecordedHarness, TestCase, TestStep,
};
pub use random::rand_string;
pub use template::{render, Template};
pub use terraform::TerraformCli;
pub use types::{Scalar, State};
