//! Process-termination paths.
//!
//! Stack overflow on arming and an uncaught throw both end the process
//! rather than returning, so each scenario runs in a child: the test
//! re-invokes its own binary with a scenario selector in the environment
//! and asserts on the child's exit status and stderr.

use std::env;
use std::process::Command;

use vellum_diag::{throw, ExceptionStack, MAX_TRY_DEPTH};

const SCENARIO_VAR: &str = "VELLUM_FATAL_SCENARIO";

/// Re-runs the named test in a child process with the scenario selected.
fn run_scenario(scenario: &str, test_name: &str) -> (bool, String) {
    let exe = env::current_exe().expect("test binary path");
    let output = Command::new(exe)
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(SCENARIO_VAR, scenario)
        .output()
        .expect("spawn child test");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

fn scenario_is(name: &str) -> bool {
    env::var(SCENARIO_VAR).as_deref() == Ok(name)
}

#[test]
fn arming_past_capacity_terminates_the_process() {
    if scenario_is("overflow") {
        let mut ex = ExceptionStack::new();
        for _ in 0..=MAX_TRY_DEPTH {
            ex.push_try();
        }
        unreachable!("push_try past capacity must not return");
    }

    let (success, stderr) = run_scenario("overflow", "arming_past_capacity_terminates_the_process");
    assert!(!success, "child should exit non-zero");
    assert!(
        stderr.contains("exception stack overflow!"),
        "stderr was: {stderr}"
    );
}

#[test]
fn uncaught_throw_terminates_the_process() {
    if scenario_is("uncaught") {
        let mut ex = ExceptionStack::new();
        throw!(ex, "nobody is listening");
    }

    let (success, stderr) = run_scenario("uncaught", "uncaught_throw_terminates_the_process");
    assert!(!success, "child should exit non-zero");
    assert!(stderr.contains("error: nobody is listening"), "stderr was: {stderr}");
    assert!(
        stderr.contains("uncaught exception: nobody is listening"),
        "stderr was: {stderr}"
    );
}

#[test]
fn throw_under_protection_does_not_terminate() {
    // Control case: the same raise is catchable when a scope is armed.
    let mut ex = ExceptionStack::new();
    let result: Result<(), _> = ex.protect(|ex| {
        throw!(ex, "nobody is listening");
    });
    assert_eq!(result.unwrap_err().message, "nobody is listening");
}
