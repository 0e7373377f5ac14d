//! Integration tests for the taxo CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SAMPLE: &str = "level_1,level_2,level_3,level_4,level_5,level_6
Kadın,Giyim,Elbise,Mini Elbise,Uzun Elbise,2025 Koleksiyonu
Kadın,Giyim,Etek
Erkek,Giyim
";

/// Helper to get a taxo command isolated from the user's environment
fn taxo(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("taxo").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env("HOME", tmp.path())
        .env("TAXO_USER", "tester")
        .env_remove("TAXO_TAXONOMY")
        .env_remove("TAXO_STORE")
        .env_remove("TAXO_LAYOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    taxo(&tmp).arg("init").assert().success();
    tmp
}

fn write_csv(tmp: &TempDir, name: &str, contents: &str) {
    fs::write(tmp.path().join(name), contents).unwrap();
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    taxo(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("tree"));
}

#[test]
fn test_init_creates_project() {
    let tmp = setup_test_project();
    assert!(tmp.path().join(".taxo/config.yaml").exists());
    assert!(tmp.path().join(".taxo/terms.db").exists());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_test_project();
    taxo(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_import_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    write_csv(&tmp, "categories.csv", SAMPLE);
    taxo(&tmp)
        .args(["import", "categories.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a taxonomy project"));
}

#[test]
fn test_template_names() {
    let tmp = TempDir::new().unwrap();
    taxo(&tmp)
        .arg("template")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "level_1,level_2,level_3,level_4,level_5,level_6\n",
        ))
        .stdout(predicate::str::contains("Kadın,Giyim,Elbise"));
}

#[test]
fn test_template_described() {
    let tmp = TempDir::new().unwrap();
    taxo(&tmp)
        .args(["template", "--layout", "described"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("level_1,level_1_desc,level_2"));
}

// ============================================================================
// Import Tests
// ============================================================================

#[test]
fn test_import_sample() {
    let tmp = setup_test_project();
    write_csv(&tmp, "categories.csv", SAMPLE);

    taxo(&tmp)
        .args(["import", "categories.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Import complete: Rows: 3 | Created: 9 | Existing: 2",
        ));

    taxo(&tmp)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kadın (kadin)"))
        .stdout(predicate::str::contains("\n  Giyim (giyim)"))
        .stdout(predicate::str::contains("\n  Giyim (giyim-erkek)"))
        .stdout(predicate::str::contains("          2025 Koleksiyonu"));
}

#[test]
fn test_reimport_creates_nothing() {
    let tmp = setup_test_project();
    write_csv(&tmp, "categories.csv", SAMPLE);

    taxo(&tmp).args(["import", "categories.csv"]).assert().success();
    taxo(&tmp)
        .args(["import", "categories.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Rows: 3 | Created: 0 | Existing: 11",
        ));
}

#[test]
fn test_import_json_summary() {
    let tmp = setup_test_project();
    write_csv(&tmp, "categories.csv", SAMPLE);

    let output = taxo(&tmp)
        .args(["import", "categories.csv", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["rows_processed"], 3);
    assert_eq!(summary["terms_created"], 9);
    assert_eq!(summary["terms_existing"], 2);
    assert_eq!(summary["rows_aborted"], 0);
}

#[test]
fn test_import_dry_run_saves_nothing() {
    let tmp = setup_test_project();
    write_csv(&tmp, "categories.csv", SAMPLE);

    taxo(&tmp)
        .args(["import", "categories.csv", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created: 9"))
        .stdout(predicate::str::contains("Dry run complete"));

    taxo(&tmp)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("No terms"));
}

#[test]
fn test_import_missing_file_fails() {
    let tmp = setup_test_project();
    taxo(&tmp)
        .args(["import", "missing.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CSV file not found"));
}

#[test]
fn test_import_header_only() {
    let tmp = setup_test_project();
    write_csv(&tmp, "header.csv", "level_1,level_2,level_3,level_4,level_5,level_6\n");

    taxo(&tmp)
        .args(["import", "header.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows: 0 | Created: 0 | Existing: 0"));
}

#[test]
fn test_import_no_header_keeps_first_row() {
    let tmp = setup_test_project();
    write_csv(&tmp, "plain.csv", "Kadın,Giyim\nErkek\n");

    taxo(&tmp)
        .args(["import", "plain.csv", "--no-header"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows: 2 | Created: 3 | Existing: 0"));
}

#[test]
fn test_import_skipped_level_attaches_to_previous() {
    let tmp = setup_test_project();
    write_csv(&tmp, "gaps.csv", "A,,B,,,\n");

    taxo(&tmp)
        .args(["import", "gaps.csv", "--no-header"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created: 2"));

    taxo(&tmp)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("A (a)\n  B (b)\n"));
}

#[test]
fn test_import_described_overwrites_description() {
    let tmp = setup_test_project();
    write_csv(&tmp, "first.csv", "Kadın,first\n");
    write_csv(&tmp, "second.csv", "Kadın,second\n");

    for file in ["first.csv", "second.csv"] {
        taxo(&tmp)
            .args(["import", file, "--no-header", "--layout", "described"])
            .assert()
            .success();
    }

    taxo(&tmp)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kadın (kadin) - second"))
        .stdout(predicate::str::contains("first").not());
}

#[test]
fn test_import_abandons_failing_row_only() {
    let tmp = setup_test_project();
    let csv = format!("P\nA,B,{},D\nR\n", "x".repeat(201));
    write_csv(&tmp, "bad.csv", &csv);

    taxo(&tmp)
        .args(["import", "bad.csv", "--no-header"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows: 3 | Created: 4 | Existing: 0"))
        .stdout(predicate::str::contains("Rows abandoned:   1"))
        .stderr(predicate::str::contains("row abandoned"));
}

#[test]
fn test_import_uses_configured_taxonomy() {
    let tmp = setup_test_project();
    write_csv(&tmp, "categories.csv", SAMPLE);

    taxo(&tmp)
        .args(["import", "categories.csv", "--taxonomy", "product_tag"])
        .assert()
        .success();

    taxo(&tmp)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("No terms"));

    taxo(&tmp)
        .args(["tree", "--taxonomy", "product_tag", "--flat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| Kadın"));
}

// ============================================================================
// Access Tests
// ============================================================================

const ROSTER: &str = "members:
  - name: Ayşe
    username: ayse
    roles: [manager]
  - name: Mehmet
    username: mehmet
    roles: [editor]
";

#[test]
fn test_manager_may_import() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join(".taxo/team.yaml"), ROSTER).unwrap();
    write_csv(&tmp, "categories.csv", SAMPLE);

    taxo(&tmp)
        .env("TAXO_USER", "ayse")
        .args(["import", "categories.csv"])
        .assert()
        .success();
}

#[test]
fn test_editor_may_not_import() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join(".taxo/team.yaml"), ROSTER).unwrap();
    write_csv(&tmp, "categories.csv", SAMPLE);

    taxo(&tmp)
        .env("TAXO_USER", "mehmet")
        .args(["import", "categories.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed to write taxonomy terms"));

    taxo(&tmp)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("No terms"));
}

#[test]
fn test_unknown_user_may_not_import() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join(".taxo/team.yaml"), ROSTER).unwrap();
    write_csv(&tmp, "categories.csv", SAMPLE);

    taxo(&tmp)
        .args(["import", "categories.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not identify the current user"));
}
