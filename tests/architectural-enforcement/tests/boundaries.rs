//! Layering and production-code hygiene checks

use std::fs;

use architectural_enforcement::{find_violations, report, workspace_root};

#[test]
fn test_engine_has_no_terminal_or_runtime_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("visage/core/Cargo.toml")).unwrap();
    for forbidden in ["ratatui", "crossterm", "tokio", "futures"] {
        assert!(
            !manifest.contains(forbidden),
            "visage-core must stay headless but depends on {forbidden}"
        );
    }

    let violations = find_violations(
        "visage/core/src",
        &["ratatui::", "crossterm::", "tokio::", "visage_tui"],
    );
    assert!(violations.is_empty(), "Engine references a surface:\n{}", report(&violations));
}

#[test]
fn test_no_sleep_in_production_code() {
    for dir in ["visage/core/src", "tui/src"] {
        let violations = find_violations(dir, &["thread::sleep", "time::sleep("]);
        assert!(violations.is_empty(), "Blocking sleep found:\n{}", report(&violations));
    }
}

#[test]
fn test_engine_spawns_no_threads() {
    let violations = find_violations("visage/core/src", &["thread::spawn", "std::thread"]);
    assert!(violations.is_empty(), "Engine must run on the host's thread:\n{}", report(&violations));
}

#[test]
fn test_no_unwrap_in_engine_production_code() {
    let violations = find_violations("visage/core/src", &[".unwrap()", ".expect("]);
    assert!(violations.is_empty(), "Propagate or handle instead:\n{}", report(&violations));
}

#[test]
fn test_particle_loop_is_frame_driven() {
    // The particle loop is driven by frame callbacks, never by timers
    let violations = find_violations("visage/core/src", &["Instant::now()", "SystemTime::now()"]);
    assert!(violations.is_empty(), "Engine reads the clock itself:\n{}", report(&violations));
}
