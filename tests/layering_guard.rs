//! Layering guardrails between the workspace crates.
//!
//! `shadec_core` is pure vocabulary and may only depend on `serde`. `shadec_ir` may depend on `shadec_core` but
//! never on the emitter crate. These tests scan the member manifests and fail if either rule is broken.

fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_depends_only_on_serde() {
    let names = dependency_names(include_str!("../crates/shadec_core/Cargo.toml"));
    assert_eq!(names, vec!["serde".to_string()], "shadec_core must stay dependency-free apart from serde");
}

#[test]
fn ir_does_not_depend_on_the_emitter() {
    let names = dependency_names(include_str!("../crates/shadec_ir/Cargo.toml"));
    assert!(names.iter().any(|n| n == "shadec_core"));
    assert!(
        !names.iter().any(|n| n == "shadec"),
        "`shadec` must not appear in shadec_ir's [dependencies]"
    );
}
