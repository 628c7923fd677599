pub mod discovered_workload;

pub use discovered_workload::{
    basic_context, basic_test_case, check_workload_uri_matches, render_basic, BASIC_CONFIG,
    WORKLOAD_ADDRESS,
};
