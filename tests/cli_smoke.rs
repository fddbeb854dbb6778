//! Integration tests for the `ruledesk` binary.
//!
//! Every test runs in its own temp directory via `--cwd`, with
//! `RULEDESK_CONFIG` pointing at a config file inside it so the user's own
//! configuration is never read.

mod common;

use std::path::Path;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use ruledesk::table::Grid;

use common::{pricing_grid, write_table};

/// A scratch workspace with an empty config file.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        dir.child("config.toml").touch().unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn ruledesk(&self) -> Command {
        let mut cmd = Command::cargo_bin("ruledesk").unwrap();
        cmd.env("RULEDESK_CONFIG", self.path().join("config.toml"))
            .env_remove("RULEDESK_REPO_DIR")
            .env_remove("RUST_LOG")
            .arg("--cwd")
            .arg(self.path());
        cmd
    }

    /// Configure a local folder holding `rules/Pricing.xlsx`.
    fn with_local_tables(self) -> Self {
        let tables = self.path().join("tables");
        write_table(&tables, "Pricing.xlsx", &pricing_grid());
        self.ruledesk()
            .args(["repo", "set-local", "--path", "tables"])
            .assert()
            .success();
        self
    }
}

#[test]
fn help_describes_the_tool() {
    let ws = Workspace::new();
    ws.ruledesk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("decision tables"));
}

#[test]
fn version_flag_works() {
    let ws = Workspace::new();
    ws.ruledesk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ruledesk"));
}

#[test]
fn unconfigured_repository_is_reported() {
    let ws = Workspace::new();
    ws.ruledesk()
        .args(["repo", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository not configured"));

    ws.ruledesk()
        .args(["table", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Repository not configured"));
}

#[test]
fn local_folder_lifecycle() {
    let ws = Workspace::new().with_local_tables();

    ws.ruledesk()
        .args(["repo", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("type:   local folder"))
        .stdout(predicate::str::contains("name:   tables"));

    ws.ruledesk()
        .args(["table", "list"])
        .assert()
        .success()
        .stdout(predicate::eq("Pricing.xlsx\n"));

    ws.ruledesk()
        .args(["repo", "folders"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/rules"));

    ws.ruledesk()
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to sync"));

    ws.ruledesk().args(["repo", "clear"]).assert().success();
    ws.ruledesk()
        .args(["repo", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository not configured"));
}

#[test]
fn show_prints_labels_with_indices() {
    let ws = Workspace::new().with_local_tables();
    ws.ruledesk()
        .args(["table", "show", "Pricing.xlsx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0:NAME"))
        .stdout(predicate::str::contains("3:ACTION"))
        .stdout(predicate::str::contains("senior"));
}

#[test]
fn show_json_is_machine_readable() {
    let ws = Workspace::new().with_local_tables();
    let output = ws
        .ruledesk()
        .args(["table", "show", "Pricing.xlsx", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let table: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(table["columnLabels"][2], "CONDITION2");
    assert_eq!(table["rows"].as_array().map(Vec::len), Some(3));
}

#[test]
fn column_edits_are_saved() {
    let ws = Workspace::new().with_local_tables();

    ws.ruledesk()
        .args(["table", "add-column", "Pricing.xlsx", "--kind", "condition"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CONDITION3"));

    ws.ruledesk()
        .args(["table", "delete-column", "Pricing.xlsx", "1"])
        .assert()
        .success();

    ws.ruledesk()
        .args(["table", "show", "Pricing.xlsx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1:CONDITION2"))
        .stdout(predicate::str::contains("2:CONDITION3"));
}

#[test]
fn name_column_cannot_be_deleted() {
    let ws = Workspace::new().with_local_tables();
    ws.ruledesk()
        .args(["table", "delete-column", "Pricing.xlsx", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME column cannot be deleted"));
}

#[test]
fn set_rows_replaces_rules() {
    let ws = Workspace::new().with_local_tables();
    ws.dir
        .child("rows.json")
        .write_str(
            r#"[{"name": "vip", "values": [
                {"kind": "number", "value": 21.0},
                {"kind": "string", "value": "platinum"},
                {"kind": "number", "value": 30.0}
            ]}]"#,
        )
        .unwrap();

    ws.ruledesk()
        .args(["table", "set-rows", "Pricing.xlsx", "rows.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 rule(s)"));

    ws.ruledesk()
        .args(["table", "show", "Pricing.xlsx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vip"))
        .stdout(predicate::str::contains("senior").not());
}

#[test]
fn validate_accepts_and_rejects() {
    let ws = Workspace::new().with_local_tables();
    ws.ruledesk()
        .args(["table", "validate", "Pricing.xlsx"])
        .assert()
        .success();

    write_table(
        &ws.path().join("tables"),
        "Notes.xlsx",
        &Grid::from_rows(vec![vec!["just notes".into()]]),
    );
    ws.ruledesk()
        .args(["table", "validate", "Notes.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid decision table"))
        .stderr(predicate::str::contains("missing NAME, CONDITION, ACTION"));

    ws.dir
        .child("tables/rules/Text.xlsx")
        .write_str("not a workbook")
        .unwrap();
    ws.ruledesk()
        .args(["table", "validate", "Text.xlsx"])
        .assert()
        .failure();
}

#[test]
fn table_paths_must_stay_inside_rules_folder() {
    let ws = Workspace::new().with_local_tables();
    ws.ruledesk()
        .args(["table", "show", "../Pricing.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a file name inside the rules folder"));

    ws.ruledesk()
        .args(["table", "show", "Missing.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn local_folder_cannot_publish() {
    let ws = Workspace::new().with_local_tables();
    ws.ruledesk()
        .args(["publish", "Pricing.xlsx", "-m", "change"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Publishing needs a git repository"));
}

#[test]
fn branch_name_follows_the_naming_scheme() {
    let ws = Workspace::new();
    ws.ruledesk()
        .args([
            "repo",
            "set",
            "--url",
            "https://github.com/acme/pricing.git",
            "--branch",
            "main",
        ])
        .assert()
        .success();

    ws.ruledesk()
        .args(["branch-name", "Pricing.xlsx"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^PRI_Pri_\d{12}\n$").unwrap());

    ws.ruledesk()
        .args(["repo", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not synced)"));
}

#[test]
fn invalid_branch_is_rejected_at_configuration() {
    let ws = Workspace::new();
    ws.ruledesk()
        .args([
            "repo",
            "set",
            "--url",
            "https://github.com/acme/pricing.git",
            "--branch",
            "bad..name",
        ])
        .assert()
        .failure();
    ws.dir
        .child(".ruledesk/repository.toml")
        .assert(predicate::path::missing());
}

#[test]
fn url_ending_in_dot_segment_is_rejected() {
    let ws = Workspace::new();
    ws.ruledesk()
        .args(["repo", "set", "--url", "git@host:org/..", "--branch", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot derive a folder name"));
    ws.dir
        .child(".ruledesk/repository.toml")
        .assert(predicate::path::missing());
}

#[test]
fn quiet_suppresses_chatter_but_not_results() {
    let ws = Workspace::new().with_local_tables();
    ws.ruledesk()
        .args(["--quiet", "table", "add-column", "Pricing.xlsx", "--kind", "action"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    ws.ruledesk()
        .args(["--quiet", "table", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pricing.xlsx"));
}

#[test]
fn completion_generates_script() {
    let ws = Workspace::new();
    ws.ruledesk()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ruledesk"));
}

#[test]
fn unknown_config_keys_are_rejected() {
    let ws = Workspace::new();
    ws.dir
        .child("config.toml")
        .write_str("colour = \"blue\"\n")
        .unwrap();
    ws.ruledesk()
        .args(["repo", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}
