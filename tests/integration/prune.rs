//! Pruning stale registry entries

use serial_test::serial;
use std::fs;

use berth::cancel::CancelToken;

use super::helpers::*;

#[test]
#[serial]
fn test_prune_is_idempotent() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let path = orchestrator.create_worktree("x", "", &cancel).unwrap();
    fs::remove_dir_all(&path).unwrap();
    git(&["worktree", "prune"], env.repo_path());

    let first = orchestrator.prune_stale_worktrees(false, &cancel).unwrap();
    assert_eq!(first.removed, vec!["x"]);
    assert!(first.aggregate_error().is_none());
    assert!(!env.is_registered("x"));

    let second = orchestrator.prune_stale_worktrees(false, &cancel).unwrap();
    assert!(second.candidates.is_empty());
    assert!(second.aggregate_error().is_none());
}

#[test]
#[serial]
fn test_prune_only_touches_stale_entries() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let healthy = orchestrator.create_worktree("healthy", "", &cancel).unwrap();
    let dir_missing = orchestrator.create_worktree("dir-missing", "", &cancel).unwrap();
    let git_missing = orchestrator.create_worktree("git-missing", "", &cancel).unwrap();
    let broken = orchestrator.create_worktree("broken", "", &cancel).unwrap();
    let stale = orchestrator.create_worktree("stale", "", &cancel).unwrap();

    fs::remove_dir_all(&dir_missing).unwrap();
    orchestrator.git().worktrees().remove("git-missing").unwrap();
    fs::write(broken.join(".git"), "garbage\n").unwrap();
    fs::remove_dir_all(&stale).unwrap();
    orchestrator.git().worktrees().remove("stale").unwrap();

    let report = orchestrator.prune_stale_worktrees(false, &cancel).unwrap();
    assert_eq!(report.removed, vec!["stale"]);

    let remaining: Vec<String> = orchestrator
        .registry()
        .project(orchestrator.project())
        .list_worktrees()
        .unwrap()
        .iter()
        .map(|h| h.name().to_string())
        .collect();
    assert_eq!(remaining, vec!["broken", "dir-missing", "git-missing", "healthy"]);
    assert!(healthy.exists());
    assert!(git_missing.exists());
}

#[test]
#[serial]
fn test_prune_dry_run() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let path = orchestrator.create_worktree("x", "", &cancel).unwrap();
    fs::remove_dir_all(&path).unwrap();
    orchestrator.git().worktrees().remove("x").unwrap();
    let before = env.registry_yaml();

    let report = orchestrator.prune_stale_worktrees(true, &cancel).unwrap();
    assert_eq!(report.candidates, vec!["x"]);
    assert!(report.removed.is_empty());
    assert_eq!(env.registry_yaml(), before);
}
