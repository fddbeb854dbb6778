//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use ruledesk::table::{CellValue, Grid, Workbook};

/// A two-condition pricing table with three rules.
pub fn pricing_grid() -> Grid {
    Grid::from_rows(vec![
        vec!["Pricing rules".into()],
        vec![],
        vec![
            "NAME".into(),
            "CONDITION".into(),
            "CONDITION2".into(),
            "ACTION".into(),
        ],
        vec![
            CellValue::Blank,
            "customer.getAge() >= $param".into(),
            "customer.getTier() == \"$param\"".into(),
            "customer.setDiscount($param);".into(),
        ],
        vec!["senior".into(), 65.0.into(), "gold".into(), 20.0.into()],
        vec!["adult".into(), 18.0.into(), "silver".into(), 10.0.into()],
        vec![],
        vec!["child".into(), 0.0.into(), "none".into(), 0.0.into()],
    ])
}

/// Write `grid` as a one-sheet workbook under `dir/rules/`.
pub fn write_table(dir: &Path, file: &str, grid: &Grid) -> PathBuf {
    let rules = dir.join("rules");
    std::fs::create_dir_all(&rules).expect("failed to create rules dir");
    let path = rules.join(file);
    Workbook::from(grid.clone())
        .store(&path)
        .expect("failed to write table");
    path
}

/// The table sheet of the workbook at `path`.
pub fn read_grid(path: &Path) -> Grid {
    Workbook::load(path)
        .expect("failed to read table")
        .table_sheet()
        .clone()
}

/// Whether a usable `git` binary is on PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// Run a git command in `dir`, panicking on failure. Returns trimmed stdout.
pub fn run_git(dir: &Path, args: &[&str]) -> String {
    run_git_with_env(dir, args, &[])
}

/// Like [`run_git`] with extra environment variables.
pub fn run_git_with_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(env.iter().copied())
        .output()
        .expect("git command failed to start");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Give a repository a committer identity.
pub fn configure_identity(dir: &Path) {
    run_git(dir, &["config", "user.email", "rules@example.com"]);
    run_git(dir, &["config", "user.name", "Rules Editor"]);
}

/// Committer and author date of the seed commit.
pub const SEED_DATE: &str = "2024-01-02T03:04:05+00:00";

/// A bare remote whose `main` branch holds `rules/Pricing.xlsx`.
///
/// The seed commit is dated [`SEED_DATE`], so anything committed during a
/// test is newer.
pub struct TestRemote {
    dir: TempDir,
}

impl TestRemote {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let seed = dir.path().join("seed");
        std::fs::create_dir_all(&seed).unwrap();

        run_git(&seed, &["init"]);
        run_git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        configure_identity(&seed);
        write_table(&seed, "Pricing.xlsx", &pricing_grid());
        run_git(&seed, &["add", "rules"]);
        run_git_with_env(
            &seed,
            &["commit", "-m", "Seed pricing rules"],
            &[
                ("GIT_AUTHOR_DATE", SEED_DATE),
                ("GIT_COMMITTER_DATE", SEED_DATE),
            ],
        );
        run_git(
            dir.path(),
            &["clone", "--bare", "seed", "pricing.git"],
        );

        Self { dir }
    }

    /// URL of the bare remote (a local path).
    pub fn url(&self) -> String {
        self.bare().to_string_lossy().into_owned()
    }

    pub fn bare(&self) -> PathBuf {
        self.dir.path().join("pricing.git")
    }

    /// Scratch directory next to the remote.
    pub fn scratch(&self) -> &Path {
        self.dir.path()
    }

    /// Whether the remote has `branch`.
    pub fn has_branch(&self, branch: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("refs/heads/{}", branch))
            .current_dir(self.bare())
            .output()
            .is_ok_and(|o| o.status.success())
    }

    /// Table sheet of the workbook at `path` on the remote's `branch`.
    pub fn table_at(&self, branch: &str, path: &str) -> Grid {
        let output = Command::new("git")
            .args(["cat-file", "blob"])
            .arg(format!("{}:{}", branch, path))
            .current_dir(self.bare())
            .output()
            .expect("git command failed to start");
        assert!(
            output.status.success(),
            "{}:{} not on remote: {}",
            branch,
            path,
            String::from_utf8_lossy(&output.stderr)
        );

        let copy = self
            .dir
            .path()
            .join(format!("{}.xlsx", branch.replace('/', "_")));
        std::fs::write(&copy, &output.stdout).expect("failed to write workbook copy");
        read_grid(&copy)
    }
}
