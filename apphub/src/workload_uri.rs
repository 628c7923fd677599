//! Conversion from Compute self links to App Hub workload URIs
//!
//! App Hub identifies a workload by its service-qualified resource name,
//! e.g. `//compute.googleapis.com/projects/p/regions/r/instanceGroups/mig`,
//! while Compute reports `https://www.googleapis.com/compute/v1/...` links.

use thiserror::Error;
use url::Url;

pub const COMPUTE_API_HOST: &str = "www.googleapis.com";
pub const COMPUTE_API_PATH: &str = "/compute/v1";
pub const COMPUTE_SERVICE_NAME: &str = "//compute.googleapis.com";

#[derive(Debug, Error)]
pub enum WorkloadUriError {
    #[error("Failed to parse self link: {0}")]
    Parse(#[from] url::ParseError),

    #[error("Not a Compute v1 self link: {0}")]
    NotComputeSelfLink(String),
}

/// Converts an instance group self link into its workload URI
pub fn workload_uri(self_link: &str) -> Result<String, WorkloadUriError> {
    let url = Url::parse(self_link)?;

    let on_compute = url.scheme() == "https" && url.host_str() == Some(COMPUTE_API_HOST);
    let resource = url
        .path()
        .strip_prefix(COMPUTE_API_PATH)
        .filter(|rest| rest.len() > 1 && rest.starts_with('/'));

    match resource {
        Some(rest) if on_compute => Ok(format!("{}{}", COMPUTE_SERVICE_NAME, rest)),
        _ => Err(WorkloadUriError::NotComputeSelfLink(self_link.to_string())),
    }
}
