//! Integration tests for the cauldron binary

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn plugin_dir(name: &str) -> PathBuf {
    fixtures().join("plugins").join(name)
}

fn assets_dir() -> PathBuf {
    fixtures().join("example-assets")
}

/// Binary isolated from the user's home and config
fn cauldron_cmd(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("cauldron");
    cmd.env("HOME", home.path());
    cmd.env("CAULDRON_CONFIG", home.path().join("cauldron.toml"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cauldron"));
}

#[test]
fn test_invalid_command() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home).arg("invalid").assert().failure();
}

#[test]
fn test_plugins_lists_loadable_plugins() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("plugins")
        .arg("--dir")
        .arg(fixtures().join("plugins"))
        .assert()
        .success()
        .stdout(predicate::str::contains("impute"))
        .stdout(predicate::str::contains("Missing Value Imputation"))
        .stdout(predicate::str::contains("broken").not());
}

#[test]
fn test_plugins_empty_directory() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("plugins")
        .arg("--dir")
        .arg(home.path().join("nothing-here"))
        .assert()
        .success()
        .stdout(predicate::str::contains("There are no plugins"));
}

#[test]
fn test_check_valid_plugin() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("check")
        .arg(plugin_dir("impute"))
        .assert()
        .success()
        .stdout(predicate::str::contains("impute"));
}

#[test]
fn test_check_reports_missing_script() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("check")
        .arg(plugin_dir("broken"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Script file not found"));
}

#[test]
fn test_form_without_values_fails_validation() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("form")
        .arg(plugin_dir("impute"))
        .arg("--examples-dir")
        .arg(assets_dir())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Input File is required"))
        .stdout(predicate::str::contains("\"method\": \"min\""));
}

#[test]
fn test_form_example_resolves_columns() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("form")
        .arg(plugin_dir("impute"))
        .arg("--example")
        .arg("--examples-dir")
        .arg(assets_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("diann/imputed.data.txt"))
        .stdout(predicate::str::contains("\"index_col\": \"Protein.Group\""))
        .stdout(predicate::str::contains("\"S3\""));
}

#[test]
fn test_form_example_with_missing_assets_warns() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("form")
        .arg(plugin_dir("impute"))
        .arg("--example")
        .arg("--examples-dir")
        .arg(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("warning: Failed to load example value for input_file"))
        .stderr(predicate::str::contains("Example loaded with 3 skipped entries"))
        .stdout(predicate::str::contains("Input File is required"));
}

#[test]
fn test_form_set_reveals_bounded_field() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("form")
        .arg(plugin_dir("impute"))
        .arg("--example")
        .arg("--examples-dir")
        .arg(assets_dir())
        .arg("--set")
        .arg("method=knn")
        .arg("--set")
        .arg("knn_k=50")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Neighbours must be at most 20"));
}

#[test]
fn test_form_rejects_unknown_field() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("form")
        .arg(plugin_dir("impute"))
        .arg("--examples-dir")
        .arg(assets_dir())
        .arg("--set")
        .arg("nope=1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown field: nope"));
}

#[test]
fn test_form_submit_prints_request() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .arg("form")
        .arg(plugin_dir("impute"))
        .arg("--example")
        .arg("--examples-dir")
        .arg(assets_dir())
        .arg("--set")
        .arg("log2=true")
        .arg("--submit")
        .assert()
        .success()
        .stdout(predicate::str::contains("{\"pluginId\":\"impute\",\"parameters\":"))
        .stdout(predicate::str::contains("\"log2\":true"));
}

#[test]
fn test_config_set_and_show() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .args(["config", "set", "examples-path", "/srv/cauldron/examples"])
        .assert()
        .success();

    cauldron_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("examples-path: /srv/cauldron/examples"));

    cauldron_cmd(&home)
        .args(["config", "set", "python-version", "3.12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_config_path_honors_override() {
    let Ok(home) = TempDir::new() else {
        return;
    };
    cauldron_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cauldron.toml"));
}
