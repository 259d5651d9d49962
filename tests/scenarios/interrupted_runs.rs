//! Scenario: Runs That Do Not Finish
//!
//! Journey: CI kills a generate run, or a run hits its timeout. The project
//! must look exactly as it did before the run started.
//!
//! Steps:
//! 1. Generate a baseline
//! 2. Add a mockup, then run with a zero timeout; the run is cancelled
//! 3. Ask to roll that run back; it is already settled
//! 4. Generate again; the new page appears
//!
//! Success Criteria:
//! - A cancelled run changes no output bytes
//! - A cancelled run still leaves a run log with its cause
//! - Rollback of a settled run is a no-op

use crate::common::*;

/// SCENARIO: Cancelled run leaves the tree byte-identical
#[test]
fn scenario_cancelled_run_leaves_no_trace_in_output() {
    let env = TestEnv::builder().with_mockup("home.html", HOME_HTML).build();

    // Step 1
    assert_exit_code!(env.run(&["generate"]), 0);
    let baseline = env.snapshot("src");

    // Step 2
    env.write_mockup("about.html", ABOUT_HTML);
    let result = env.run(&["generate", "--timeout", "0"]);
    assert_exit_code!(result, 3);
    assert_eq!(env.snapshot("src"), baseline);

    let log = env.latest_run_log();
    assert_eq!(log["outcome"], "rolled-back");
    assert_eq!(log["exit_code"], 3);
    let run_id = log["run_id"].as_str().unwrap().to_string();

    // Step 3
    let rollback = env.run(&["rollback", &run_id]);
    assert_exit_code!(rollback, 0);
    assert_output_contains!(rollback, "nothing to roll back");
    assert_eq!(env.snapshot("src"), baseline);

    // Step 4
    let result = env.run(&["generate"]);
    assert_exit_code!(result, 0);
    assert_generated!(env, "src/pages/about/AboutPage.tsx");
}

/// SCENARIO: A cancelled run does not poison the ledger
#[test]
fn scenario_ledger_survives_cancelled_runs() {
    let env = TestEnv::builder().with_mockup("home.html", HOME_HTML).build();
    assert_exit_code!(env.run(&["generate"]), 0);

    env.write_mockup("about.html", ABOUT_HTML);
    assert_exit_code!(env.run(&["generate", "--timeout", "0"]), 3);

    let result = env.run(&["ledger", "--json"]);
    assert_exit_code!(result, 0);
    let doc: serde_json::Value = serde_json::from_str(result.stdout.trim()).unwrap();
    let records = &doc["state"]["records"];
    assert!(!records["home"]["artifacts"].as_array().unwrap().is_empty());
    assert_eq!(records["about"]["reason"], "aborted");
    assert!(records["about"]["artifacts"]
        .as_array()
        .map_or(true, |a| a.is_empty()));

    let plan = env.run(&["plan"]);
    assert_exit_code!(plan, 0);
    assert_output_contains!(plan, "1 generate");
}
