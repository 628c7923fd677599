//! Acceptance fixtures for the App Hub discovered workload data source

pub mod fixtures;
pub mod workload_uri;

pub use fixtures::{basic_context, basic_test_case, render_basic, BASIC_CONFIG};
pub use workload_uri::{workload_uri, WorkloadUriError};
