//! Fixture for the `google_apphub_discovered_workload` data source
//!
//! Provisions a service project attached to App Hub with a regional managed
//! instance group, then looks the group up as a discovered workload.

use crate::workload_uri::workload_uri;
use acctest::check::Check;
use acctest::types::{attribute_string, State};
use acctest::{
    check_resource_attr_set, pre_check_acceptance, AcctestError, ConfigSource, Context,
    ContextBuilder, TestCase, TestStep, DEFAULT_SUFFIX_LEN,
};
use std::sync::Arc;
use tracing::debug;

pub const CASE_NAME: &str = "DataSourceApphubDiscoveredWorkload_basic";

pub const WORKLOAD_ADDRESS: &str = "data.google_apphub_discovered_workload.catalog-workload";

pub const MIG_ADDRESS: &str = "google_compute_region_instance_group_manager.mig";

pub const BASIC_CONFIG: &str = r##"
resource "google_project" "service_project" {
  project_id ="tf-test-ah-%{random_suffix}"
  name = "Service Project"
  org_id = "%{org_id}"
  billing_account = "%{billing_account}"
}

# Enable Compute API
resource "google_project_service" "compute_service_project" {
  project = google_project.service_project.project_id
  service = "compute.googleapis.com"
}

resource "time_sleep" "wait_120s" {
  depends_on = [google_project_service.compute_service_project]
  create_duration = "120s"
}

resource "google_apphub_service_project_attachment" "service_project_attachment" {
  service_project_attachment_id = google_project.service_project.project_id
  depends_on = [time_sleep.wait_120s]
}

data "google_apphub_discovered_workload" "catalog-workload" {
  location = "us-central1"
  workload_uri = "${replace(google_compute_region_instance_group_manager.mig.instance_group, "https://www.googleapis.com/compute/v1", "//compute.googleapis.com")}"
  depends_on = [google_apphub_service_project_attachment.service_project_attachment]
}

# VPC network
resource "google_compute_network" "ilb_network" {
  name                    = "l7-ilb-network-%{random_suffix}"
  project                 = google_project.service_project.project_id
  auto_create_subnetworks = false
  depends_on = [time_sleep.wait_120s]
}

# backend subnet
resource "google_compute_subnetwork" "ilb_subnet" {
  name          = "l7-ilb-subnetwork-%{random_suffix}"
  project       = google_project.service_project.project_id
  ip_cidr_range = "10.0.1.0/24"
  region        = "us-central1"
  network       = google_compute_network.ilb_network.id
}

# instance template
resource "google_compute_instance_template" "instance_template" {
  name         = "l7-ilb-mig-template-%{random_suffix}"
  project               = google_project.service_project.project_id
  machine_type = "e2-small"
  tags         = ["http-server"]
  network_interface {
    network    = google_compute_network.ilb_network.id
    subnetwork = google_compute_subnetwork.ilb_subnet.id
    access_config {
      # add external ip to fetch packages
    }
  }
  disk {
    source_image = "debian-cloud/debian-10"
    auto_delete  = true
    boot         = true
  }
  # install nginx and serve a simple web page
  metadata = {
    startup-script = <<-EOF1
      #! /bin/bash
      set -euo pipefail
      export DEBIAN_FRONTEND=noninteractive
      apt-get update
      apt-get install -y nginx-light jq
      NAME=$(curl -H "Metadata-Flavor: Google" "http://metadata.google.internal/computeMetadata/v1/instance/hostname")
      IP=$(curl -H "Metadata-Flavor: Google" "http://metadata.google.internal/computeMetadata/v1/instance/network-interfaces/0/ip")
      METADATA=$(curl -f -H "Metadata-Flavor: Google" "http://metadata.google.internal/computeMetadata/v1/instance/attributes/?recursive=True" | jq 'del(.["startup-script"])')
      cat <<EOF > /var/www/html/index.html
      <pre>
      Name: $NAME
      IP: $IP
      Metadata: $METADATA
      </pre>
      EOF
    EOF1
  }
  lifecycle {
    create_before_destroy = true
  }
}

resource "google_compute_region_instance_group_manager" "mig" {
  name     = "l7-ilb-mig1-%{random_suffix}"
  project               = google_project.service_project.project_id
  region   = "us-central1"
  version {
    instance_template = google_compute_instance_template.instance_template.id
    name              = "primary"
  }
  base_instance_name = "vm"
  target_size        = 2
}
"##;

/// Context for `BASIC_CONFIG`: organization, billing account, and a random
/// suffix that is reproducible when `seed` is given
pub fn basic_context(source: &dyn ConfigSource, seed: Option<u64>) -> acctest::Result<Context> {
    let builder = ContextBuilder::new(source);
    let builder = match seed {
        Some(seed) => builder.with_seed(seed),
        None => builder,
    };
    builder
        .org_id()
        .billing_account()
        .random_suffix("random_suffix", DEFAULT_SUFFIX_LEN)
        .build()
}

/// Renders `BASIC_CONFIG`, optionally pinning the suffix
pub fn render_basic(
    source: &dyn ConfigSource,
    seed: Option<u64>,
    suffix: Option<&str>,
) -> acctest::Result<String> {
    let mut context = basic_context(source, seed)?;
    if let Some(suffix) = suffix {
        context = context.with("random_suffix", suffix);
    }
    debug!(suffix = ?context.get_string("random_suffix"), "rendering discovered workload fixture");
    acctest::render(BASIC_CONFIG, &context)
}

/// The basic acceptance test: the data source resolves and exposes `name`.
///
/// `gate` is consulted by the pre-check for `TF_ACC`.
pub fn basic_test_case<S>(context: &Context, gate: S) -> acctest::Result<TestCase>
where
    S: ConfigSource + 'static,
{
    let config = acctest::render(BASIC_CONFIG, context)?;
    Ok(TestCase::new(CASE_NAME)
        .pre_check(move || pre_check_acceptance(&gate))
        .external_provider("time", None)
        .step(TestStep::new(config).with_check(check_resource_attr_set(WORKLOAD_ADDRESS, "name"))))
}

/// Passes when the data source was queried with the URI derived from the
/// managed instance group's self link
pub fn check_workload_uri_matches() -> Check {
    Arc::new(|state: &State| {
        let instance_group = state
            .attribute(MIG_ADDRESS, "instance_group")
            .map(attribute_string)
            .ok_or_else(|| AcctestError::CheckFailed {
                address: MIG_ADDRESS.to_string(),
                message: "attribute 'instance_group' not set".to_string(),
            })?;
        let expected = workload_uri(&instance_group).map_err(|e| AcctestError::CheckFailed {
            address: MIG_ADDRESS.to_string(),
            message: e.to_string(),
        })?;
        acctest::check_resource_attr(WORKLOAD_ADDRESS, "workload_uri", expected)(state)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use acctest::{MapSource, Template};

    fn source() -> MapSource {
        MapSource::new()
            .with("GOOGLE_ORG", "123456789012")
            .with("GOOGLE_BILLING_ACCOUNT", "012345-ABCDEF-678901")
    }

    #[test]
    fn template_uses_expected_placeholders() {
        let template = Template::new(BASIC_CONFIG);
        assert_eq!(
            template.placeholders(),
            vec!["random_suffix", "org_id", "billing_account"]
        );
    }

    #[test]
    fn renders_every_placeholder() {
        let rendered = render_basic(&source(), Some(1), Some("abc123")).unwrap();

        assert!(!rendered.contains("%{"));
        assert!(rendered.contains(r#"project_id ="tf-test-ah-abc123""#));
        assert!(rendered.contains(r#"org_id = "123456789012""#));
        assert!(rendered.contains(r#"billing_account = "012345-ABCDEF-678901""#));
        assert!(rendered.contains(r#""l7-ilb-mig1-abc123""#));
    }

    #[test]
    fn harness_syntax_survives_rendering() {
        let rendered = render_basic(&source(), Some(1), None).unwrap();
        assert!(rendered.contains(
            r#""${replace(google_compute_region_instance_group_manager.mig.instance_group, "https://www.googleapis.com/compute/v1", "//compute.googleapis.com")}""#
        ));
        assert!(rendered.contains("NAME=$(curl"));
    }

    #[test]
    fn seeded_renders_match() {
        let a = render_basic(&source(), Some(99), None).unwrap();
        let b = render_basic(&source(), Some(99), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_org_fails_before_rendering() {
        let source = MapSource::new().with("GOOGLE_BILLING_ACCOUNT", "b");
        let err = render_basic(&source, None, None).unwrap_err();
        assert!(matches!(err, AcctestError::MissingEnvironment { ref key, .. } if key == "org_id"));
    }

    #[test]
    fn test_case_declares_time_provider_and_one_step() {
        let context = basic_context(&source(), Some(3)).unwrap();
        let case = basic_test_case(&context, MapSource::new()).unwrap();

        assert_eq!(case.name, CASE_NAME);
        assert!(case.external_providers.contains_key("time"));
        assert_eq!(case.steps.len(), 1);
        assert!(case.steps[0].check.is_some());
        assert!(case.steps[0]
            .config
            .contains(&context.get_string("random_suffix").unwrap()));
    }

    #[test]
    fn pre_check_follows_gate() {
        let context = basic_context(&source(), None).unwrap();

        let closed = basic_test_case(&context, MapSource::new()).unwrap();
        let pre_check = closed.pre_check.as_ref().unwrap();
        assert!(matches!(pre_check(), Err(AcctestError::AcceptanceDisabled)));

        let open = basic_test_case(&context, MapSource::new().with("TF_ACC", "1")).unwrap();
        assert!((open.pre_check.as_ref().unwrap())().is_ok());
    }
}
