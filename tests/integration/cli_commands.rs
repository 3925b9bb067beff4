#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

const SEED: &str = r#"[
    {"name": "Hardware", "description": "Physical kit", "children": [
        {"name": "Phones", "children": [{"name": "Android"}]},
        {"name": "Laptops"}
    ]},
    {"name": "Software"}
]"#;

struct Workspace {
    _dir: TempDir,
    seed: PathBuf,
    config: PathBuf,
}

fn workspace(config: &str) -> Workspace {
    let dir = TempDir::new().expect("tempdir");
    let seed = dir.path().join("seed.json");
    fs::write(&seed, SEED).expect("write seed");
    let config_path = dir.path().join("canopy.toml");
    fs::write(&config_path, config).expect("write config");
    Workspace {
        _dir: dir,
        seed,
        config: config_path,
    }
}

fn run(ws: &Workspace, args: &[&str]) -> String {
    let output = cargo_bin_cmd!("canopy")
        .env("CANOPY_CONFIG", &ws.config)
        .env_remove("RUST_LOG")
        .arg("--plain")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).expect("utf8 output")
}

#[test]
fn tree_prints_hierarchy_by_name() {
    let ws = workspace("");
    let stdout = run(&ws, &["tree", "--seed", ws.seed.to_str().unwrap()]);
    assert!(stdout.contains("(5 categories)"), "heading: {stdout}");
    assert!(stdout.contains(
        "  + Hardware: Physical kit\n    - Laptops\n    + Phones\n      - Android\n  - Software\n"
    ));
}

#[test]
fn order_flag_overrides_config() {
    let ws = workspace("[store]\nchild_order = \"name\"\n");
    let stdout = run(
        &ws,
        &["--order", "insertion", "tree", "--seed", ws.seed.to_str().unwrap()],
    );
    assert!(stdout.contains("    + Phones\n      - Android\n    - Laptops\n"));
}

#[test]
fn config_file_sets_child_order() {
    let ws = workspace("[store]\nchild_order = \"insertion\"\n");
    let stdout = run(&ws, &["tree", "--seed", ws.seed.to_str().unwrap()]);
    assert!(stdout.contains("    + Phones\n      - Android\n    - Laptops\n"));
}

#[test]
fn delete_reparents_children() {
    let ws = workspace("");
    let stdout = run(
        &ws,
        &["delete", "--seed", ws.seed.to_str().unwrap(), "Phones"],
    );
    assert!(stdout.contains("deleted 1 category, reparented 1 child"));
    assert!(stdout.contains("(4 categories)"));
    assert!(stdout.contains("  + Hardware: Physical kit\n    - Android\n    - Laptops\n"));
    assert!(!stdout.contains("Phones"));
}

#[test]
fn deleting_a_root_promotes_children() {
    let ws = workspace("");
    let stdout = run(
        &ws,
        &["delete", "--seed", ws.seed.to_str().unwrap(), "Hardware"],
    );
    assert!(stdout.contains("deleted 1 category, reparented 2 children"));
    assert!(stdout.contains("  - Laptops\n  + Phones\n    - Android\n  - Software\n"));
}

#[test]
fn delete_of_unknown_name_fails() {
    let ws = workspace("");
    let output = cargo_bin_cmd!("canopy")
        .env("CANOPY_CONFIG", &ws.config)
        .args(["delete", "--seed", ws.seed.to_str().unwrap(), "Nope"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).expect("utf8 output");
    assert!(stderr.contains("no category named 'Nope'"), "stderr: {stderr}");
}

#[test]
fn invalid_config_is_reported() {
    let ws = workspace("[store]\nchild_order = \"random\"\n");
    let output = cargo_bin_cmd!("canopy")
        .env("CANOPY_CONFIG", &ws.config)
        .args(["tree", "--seed", ws.seed.to_str().unwrap()])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).expect("utf8 output");
    assert!(stderr.contains("failed to parse config"), "stderr: {stderr}");
}

#[test]
fn malformed_seed_is_reported() {
    let ws = workspace("");
    fs::write(&ws.seed, r#"[{"name": "a", "colour": "red"}]"#).expect("rewrite seed");
    cargo_bin_cmd!("canopy")
        .env("CANOPY_CONFIG", &ws.config)
        .args(["tree", "--seed", ws.seed.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn fields_lists_the_field_table() {
    let ws = workspace("");
    let stdout = run(&ws, &["fields"]);
    assert!(stdout.contains("Category fields"));
    assert!(stdout.contains("description: optional text (writable)"));
    assert!(stdout.contains("version: version (read-only)"));
    assert!(stdout.contains("parent: optional key (writable)"));
}
