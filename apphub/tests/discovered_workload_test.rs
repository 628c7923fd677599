//! Acceptance tests for the discovered workload data source
//!
//! The recorded tests replay captured state and always run. The live test
//! provisions real infrastructure and only runs with TF_ACC set.

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use acctest::env::acceptance_enabled;
use acctest::types::flatten_attributes;
use acctest::{
    compose, run, AcctestError, MapSource, ProcessEnv, RecordedHarness, State, TerraformCli,
    TestStep,
};
use apphub::fixtures::discovered_workload::{
    basic_context, basic_test_case, check_workload_uri_matches, MIG_ADDRESS, WORKLOAD_ADDRESS,
};
use serde_json::json;
use serial_test::serial;
use std::io::Write;

fn source() -> MapSource {
    MapSource::new()
        .with("GOOGLE_ORG", "123456789012")
        .with("GOOGLE_BILLING_ACCOUNT", "012345-ABCDEF-678901")
        .with("TF_ACC", "1")
}

fn recorded_state(suffix: &str) -> State {
    let project = format!("tf-test-ah-{}", suffix);
    let self_link = format!(
        "https://www.googleapis.com/compute/v1/projects/{}/regions/us-central1/instanceGroups/l7-ilb-mig1-{}",
        project, suffix
    );
    let uri = self_link.replace(
        "https://www.googleapis.com/compute/v1",
        "//compute.googleapis.com",
    );

    State::new()
        .with_resource(
            "google_project.service_project",
            flatten_attributes(&json!({"project_id": project, "name": "Service Project"})),
        )
        .with_resource(
            MIG_ADDRESS,
            flatten_attributes(&json!({
                "name": format!("l7-ilb-mig1-{}", suffix),
                "instance_group": self_link,
                "target_size": 2
            })),
        )
        .with_resource(
            WORKLOAD_ADDRESS,
            flatten_attributes(&json!({
                "location": "us-central1",
                "workload_uri": uri,
                "name": format!("projects/{}/locations/us-central1/discoveredWorkloads/0a1b2c", project),
                "workload_reference": [{"uri": uri}]
            })),
        )
}

#[tokio::test]
async fn recorded_basic_run_passes() {
    let context = basic_context(&source(), Some(2024)).unwrap();
    let suffix = context.get_string("random_suffix").unwrap();
    let case = basic_test_case(&context, source()).unwrap();

    let harness = RecordedHarness::new(vec![recorded_state(&suffix)]);
    run(&harness, &case).await.unwrap();

    let applied = harness.applied().await;
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0], case.steps[0].config);
    assert!(applied[0].contains(&format!("l7-ilb-network-{}", suffix)));
    assert_eq!(harness.destroy_count().await, 1);
}

#[tokio::test]
async fn recorded_workload_uri_matches_instance_group() {
    let harness = RecordedHarness::new(vec![recorded_state("k3j9x")]);
    let case = acctest::TestCase::new("workload_uri").step(
        TestStep::new("unused").with_check(compose(vec![
            acctest::check_resource_attr_set(WORKLOAD_ADDRESS, "name"),
            check_workload_uri_matches(),
        ])),
    );
    run(&harness, &case).await.unwrap();
}

#[tokio::test]
async fn recorded_run_without_workload_fails_check() {
    let context = basic_context(&source(), Some(1)).unwrap();
    let case = basic_test_case(&context, source()).unwrap();

    let mut state = recorded_state("abc");
    state.resources.remove(WORKLOAD_ADDRESS);
    let harness = RecordedHarness::new(vec![state]);

    let err = run(&harness, &case).await.unwrap_err();
    match err {
        AcctestError::CheckFailed { address, .. } => assert_eq!(address, WORKLOAD_ADDRESS),
        other => panic!("expected CheckFailed, got {:?}", other),
    }
    assert_eq!(harness.destroy_count().await, 1);
}

#[test]
fn recorded_run_from_file() {
    let context = basic_context(&source(), Some(5)).unwrap();
    let suffix = context.get_string("random_suffix").unwrap();
    let case = basic_test_case(&context, source()).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let recording = serde_json::to_string(&vec![recorded_state(&suffix)]).unwrap();
    file.write_all(recording.as_bytes()).unwrap();

    let harness = RecordedHarness::from_json_file(file.path()).unwrap();
    tokio_test::block_on(run(&harness, &case)).unwrap();
}

#[test]
fn closed_gate_skips_provisioning() {
    let closed = MapSource::new()
        .with("GOOGLE_ORG", "1")
        .with("GOOGLE_BILLING_ACCOUNT", "b");
    let context = basic_context(&closed, None).unwrap();
    let case = basic_test_case(&context, closed).unwrap();

    let harness = RecordedHarness::new(vec![recorded_state("zzz")]);
    let err = tokio_test::block_on(run(&harness, &case)).unwrap_err();
    assert!(matches!(err, AcctestError::AcceptanceDisabled));
    assert!(tokio_test::block_on(harness.applied()).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn acc_data_source_apphub_discovered_workload_basic() {
    if !acceptance_enabled(&ProcessEnv) {
        eprintln!("TF_ACC not set, skipping live acceptance test");
        return;
    }

    let context = basic_context(&ProcessEnv, None).unwrap();
    let case = basic_test_case(&context, ProcessEnv).unwrap();

    let work_dir = tempfile::tempdir().unwrap();
    let harness = TerraformCli::from_source(&ProcessEnv, work_dir.path());
    run(&harness, &case).await.unwrap();
}
