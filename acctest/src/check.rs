//! Check functions run against harness state after each step

use crate::error::{AcctestError, Result};
use crate::types::{attribute_string, State};
use serde_json::Value;
use std::sync::Arc;

/// A check inspects observed state and fails with `CheckFailed`
pub type Check = Arc<dyn Fn(&State) -> Result<()> + Send + Sync>;

fn failed(address: &str, message: impl Into<String>) -> AcctestError {
    AcctestError::CheckFailed {
        address: address.to_string(),
        message: message.into(),
    }
}

/// Passes when `address` is present in state
pub fn check_resource_exists(address: impl Into<String>) -> Check {
    let address = address.into();
    Arc::new(move |state: &State| {
        state
            .resource(&address)
            .map(|_| ())
            .ok_or_else(|| failed(&address, "not found in state"))
    })
}

/// Passes when attribute `key` of `address` is present and non-empty
pub fn check_resource_attr_set(address: impl Into<String>, key: impl Into<String>) -> Check {
    let address = address.into();
    let key = key.into();
    Arc::new(move |state: &State| {
        let attrs = state
            .resource(&address)
            .ok_or_else(|| failed(&address, "not found in state"))?;
        match attrs.get(&key) {
            None | Some(Value::Null) => Err(failed(&address, format!("attribute '{}' not set", key))),
            Some(Value::String(s)) if s.is_empty() => {
                Err(failed(&address, format!("attribute '{}' is empty", key)))
            }
            Some(_) => Ok(()),
        }
    })
}

/// Passes when attribute `key` of `address` equals `expected` in string form
pub fn check_resource_attr(
    address: impl Into<String>,
    key: impl Into<String>,
    expected: impl Into<String>,
) -> Check {
    let address = address.into();
    let key = key.into();
    let expected = expected.into();
    Arc::new(move |state: &State| {
        let attrs = state
            .resource(&address)
            .ok_or_else(|| failed(&address, "not found in state"))?;
        let actual = attrs
            .get(&key)
            .map(attribute_string)
            .ok_or_else(|| failed(&address, format!("attribute '{}' not set", key)))?;
        if actual == expected {
            Ok(())
        } else {
            Err(failed(
                &address,
                format!("attribute '{}' expected {:?}, got {:?}", key, expected, actual),
            ))
        }
    })
}

/// Runs checks in order and stops at the first failure
pub fn compose(checks: Vec<Check>) -> Check {
    Arc::new(move |state: &State| {
        for (idx, check) in checks.iter().enumerate() {
            check(state).map_err(|e| match e {
                AcctestError::CheckFailed { address, message } => AcctestError::CheckFailed {
                    address,
                    message: format!("check {}/{}: {}", idx + 1, checks.len(), message),
                },
                other => other,
            })?;
        }
        Ok(())
    })
}

/// Runs every check and reports all failures together
pub fn compose_aggregate(checks: Vec<Check>) -> Check {
    Arc::new(move |state: &State| {
        let failures: Vec<String> = checks
            .iter()
            .filter_map(|check| check(state).err())
            .map(|e| e.to_string())
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failed("state", failures.join("; ")))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::flatten_attributes;
    use serde_json::json;

    const WORKLOAD: &str = "data.google_apphub_discovered_workload.catalog-workload";

    fn state() -> State {
        State::new()
            .with_resource(
                WORKLOAD,
                flatten_attributes(&json!({
                    "name": "projects/p/locations/us-central1/discoveredWorkloads/w1",
                    "location": "us-central1",
                    "display_name": "",
                    "workload_reference": null
                })),
            )
            .with_resource(
                "google_compute_region_instance_group_manager.mig",
                flatten_attributes(&json!({"target_size": 2})),
            )
    }

    #[test]
    fn attr_set_passes_for_populated_attribute() {
        assert!(check_resource_attr_set(WORKLOAD, "name")(&state()).is_ok());
    }

    #[test]
    fn attr_set_fails_for_empty_null_or_absent() {
        let s = state();
        assert!(check_resource_attr_set(WORKLOAD, "display_name")(&s).is_err());
        assert!(check_resource_attr_set(WORKLOAD, "workload_reference")(&s).is_err());
        assert!(check_resource_attr_set(WORKLOAD, "uid")(&s).is_err());
    }

    #[test]
    fn attr_set_fails_for_missing_resource() {
        let err = check_resource_attr_set("data.missing.x", "name")(&state()).unwrap_err();
        match err {
            AcctestError::CheckFailed { address, .. } => assert_eq!(address, "data.missing.x"),
            other => panic!("expected CheckFailed, got {:?}", other),
        }
    }

    #[test]
    fn attr_compares_string_form() {
        let s = state();
        let mig = "google_compute_region_instance_group_manager.mig";
        assert!(check_resource_attr(mig, "target_size", "2")(&s).is_ok());
        assert!(check_resource_attr(mig, "target_size", "3")(&s).is_err());
        assert!(check_resource_attr(WORKLOAD, "location", "us-central1")(&s).is_ok());
    }

    #[test]
    fn exists_check() {
        assert!(check_resource_exists(WORKLOAD)(&state()).is_ok());
        assert!(check_resource_exists("google_project.service_project")(&state()).is_err());
    }

    #[test]
    fn compose_stops_at_first_failure() {
        let check = compose(vec![
            check_resource_attr_set(WORKLOAD, "name"),
            check_resource_attr_set(WORKLOAD, "uid"),
            check_resource_attr_set(WORKLOAD, "display_name"),
        ]);
        let msg = check(&state()).unwrap_err().to_string();
        assert!(msg.contains("check 2/3"));
        assert!(msg.contains("uid"));
        assert!(!msg.contains("display_name"));
    }

    #[test]
    fn compose_aggregate_reports_all_failures() {
        let check = compose_aggregate(vec![
            check_resource_attr_set(WORKLOAD, "uid"),
            check_resource_attr_set(WORKLOAD, "name"),
            check_resource_attr_set(WORKLOAD, "display_name"),
        ]);
        let msg = check(&state()).unwrap_err().to_string();
        assert!(msg.contains("uid"));
        assert!(msg.contains("display_name"));
    }

    #[test]
    fn empty_compositions_pass() {
        assert!(compose(vec![])(&state()).is_ok());
        assert!(compose_aggregate(vec![])(&State::new()).is_ok());
    }
}
