//! End-to-end runs of the berth binary

use serial_test::serial;
use std::fs;

use berth::cancel::CancelToken;

use super::helpers::*;

#[test]
#[serial]
fn test_add_and_list_quiet() {
    let env = TestEnv::new();

    let output = env.berth(&["worktree", "add", "feat/x"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("feat/x"));

    let output = env.berth(&["worktree", "list", "-q"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "feat/x");
}

#[test]
#[serial]
fn test_list_json() {
    let env = TestEnv::new();
    env.orchestrator()
        .create_worktree("feat/x", "", &CancelToken::new())
        .unwrap();

    let output = env.berth(&["worktree", "list", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "feat/x");
    assert_eq!(rows[0]["branch"], "feat/x");
    assert_eq!(rows[0]["status"], "healthy");
}

#[test]
#[serial]
fn test_list_warns_about_stale_entries() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let mut paths = Vec::new();
    for name in ["a", "b", "c", "d"] {
        paths.push(orchestrator.create_worktree(name, "", &cancel).unwrap());
    }
    fs::remove_dir_all(&paths[1]).unwrap();
    orchestrator.git().worktrees().remove("c").unwrap();
    fs::remove_dir_all(&paths[3]).unwrap();
    orchestrator.git().worktrees().remove("d").unwrap();

    let output = env.berth(&["worktree", "list"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    for status in ["healthy", "dir missing", "git missing", "dir missing, git missing"] {
        assert!(out.contains(status), "missing {status} in:\n{out}");
    }
    assert!(stderr(&output).contains("1 stale entry is prunable"));
}

#[test]
#[serial]
fn test_prune_twice_exits_zero() {
    let env = TestEnv::new();
    let path = env
        .orchestrator()
        .create_worktree("x", "", &CancelToken::new())
        .unwrap();
    fs::remove_dir_all(&path).unwrap();
    git(&["worktree", "prune"], env.repo_path());

    let first = env.berth(&["worktree", "prune"]);
    assert!(first.status.success(), "{}", stderr(&first));
    assert!(stdout(&first).contains("Pruned 1 of 1"));

    let second = env.berth(&["worktree", "prune"]);
    assert!(second.status.success(), "{}", stderr(&second));
    assert!(stdout(&second).contains("No stale worktrees"));
}

#[test]
#[serial]
fn test_remove_unmerged_with_delete_branch() {
    let env = TestEnv::new();
    let path = env
        .orchestrator()
        .create_worktree("wip", "", &CancelToken::new())
        .unwrap();
    commit_file(&path, "wip.txt", "unmerged");

    let output = env.berth(&["worktree", "remove", "--delete-branch", "wip"]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("not merged"), "{}", stderr(&output));
    assert!(!path.exists());
    assert!(!env.is_registered("wip"));
    assert!(branch_exists(env.repo_path(), "wip"));
}

#[test]
#[serial]
fn test_remove_counts_worktree_when_branch_is_checked_out() {
    let env = TestEnv::new();
    let path = env
        .orchestrator()
        .create_worktree("wip", "", &CancelToken::new())
        .unwrap();
    git(&["checkout", "--detach"], &path);
    git(&["checkout", "wip"], env.repo_path());

    let output = env.berth(&["worktree", "remove", "--delete-branch", "wip"]);

    assert!(!output.status.success());
    assert!(stdout(&output).contains("Removed 1 of 1"), "{}", stdout(&output));
    assert!(stderr(&output).contains("checked out"), "{}", stderr(&output));
    assert!(!path.exists());
    assert!(!env.is_registered("wip"));
    assert!(branch_exists(env.repo_path(), "wip"));
}

#[test]
#[serial]
fn test_remove_batch_reports_partial_failure() {
    let env = TestEnv::new();
    env.orchestrator()
        .create_worktree("real", "", &CancelToken::new())
        .unwrap();

    let output = env.berth(&["worktree", "remove", "real", "ghost"]);

    assert!(!output.status.success());
    assert!(stdout(&output).contains("Removed 1 of 2"));
    assert!(stderr(&output).contains("ghost"));
    assert!(!env.is_registered("real"));
}

#[test]
#[serial]
fn test_outside_repository_fails() {
    let env = TestEnv::new();
    let outside = tempfile::tempdir().unwrap();

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_berth"))
        .args(["worktree", "list"])
        .current_dir(outside.path())
        .env(berth::config::CONFIG_DIR_ENV, env.config.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("not a git repository"));
}
