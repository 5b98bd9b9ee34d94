//! Worktree removal: safety checks and branch handling

use serial_test::serial;
use std::fs;

use berth::cancel::CancelToken;
use berth::error::ErrorKind;
use berth::orchestrator::{BranchOutcome, RemoveOptions};
use berth::workspace::WorktreeDirProvider;

use super::helpers::*;

#[test]
#[serial]
fn test_remove_clears_all_three_and_keeps_branch() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let path = orchestrator.create_worktree("feat/x", "", &cancel).unwrap();

    orchestrator
        .remove_worktree("feat/x", RemoveOptions::default(), &cancel)
        .expect("Failed to remove worktree");

    assert!(!path.exists());
    assert!(!orchestrator
        .git()
        .worktrees()
        .list()
        .unwrap()
        .contains(&"feat-x".to_string()));
    assert!(!env.is_registered("feat/x"));
    assert!(branch_exists(env.repo_path(), "feat/x"));
}

#[test]
#[serial]
fn test_remove_unmerged_with_delete_branch_warns() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let path = orchestrator.create_worktree("wip", "", &cancel).unwrap();
    commit_file(&path, "wip.txt", "not merged anywhere");

    let options = RemoveOptions {
        force: false,
        delete_branch: true,
    };
    let outcome = orchestrator.remove_worktree("wip", options, &cancel).unwrap();

    assert_eq!(outcome.branch, Some(BranchOutcome::NotMerged));
    assert!(!path.exists());
    assert!(!orchestrator.git().worktrees().exists("wip").unwrap());
    assert!(!env.is_registered("wip"));
    assert!(branch_exists(env.repo_path(), "wip"));
}

#[test]
#[serial]
fn test_remove_merged_with_delete_branch() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    orchestrator.create_worktree("done", "", &cancel).unwrap();
    git(&["config", "branch.done.description", "finished"], env.repo_path());

    let options = RemoveOptions {
        force: false,
        delete_branch: true,
    };
    let outcome = orchestrator.remove_worktree("done", options, &cancel).unwrap();

    assert_eq!(outcome.branch, Some(BranchOutcome::Deleted));
    assert!(!branch_exists(env.repo_path(), "done"));
    let config = git(&["config", "--local", "--list"], env.repo_path());
    assert!(!config.contains("branch.done."));
}

#[test]
#[serial]
fn test_remove_refuses_uncommitted_changes() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let path = orchestrator.create_worktree("wip", "", &cancel).unwrap();
    fs::write(path.join("README.md"), "edited\n").unwrap();

    let err = orchestrator
        .remove_worktree("wip", RemoveOptions::default(), &cancel)
        .unwrap_err();

    assert!(err.is(ErrorKind::Refused));
    assert!(err.to_string().contains("--force"));
    assert!(path.exists());
    assert!(orchestrator.git().worktrees().exists("wip").unwrap());
    assert!(env.is_registered("wip"));
}

#[test]
#[serial]
fn test_force_removes_invalid_worktree() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let path = orchestrator.create_worktree("broken", "", &cancel).unwrap();
    fs::write(path.join(".git"), "not a git link\n").unwrap();

    let err = orchestrator
        .remove_worktree("broken", RemoveOptions::default(), &cancel)
        .unwrap_err();
    assert!(err.is(ErrorKind::Refused));

    let forced = RemoveOptions {
        force: true,
        delete_branch: false,
    };
    orchestrator.remove_worktree("broken", forced, &cancel).unwrap();
    assert!(!path.exists());
    assert!(!orchestrator.git().worktrees().exists("broken").unwrap());
    assert!(!env.is_registered("broken"));
}

#[test]
#[serial]
fn test_remove_unregistered_name() {
    let env = TestEnv::new();
    let err = env
        .orchestrator()
        .remove_worktree("nope", RemoveOptions::default(), &CancelToken::new())
        .unwrap_err();
    assert!(err.is(ErrorKind::WorktreeNotRegistered));
}

#[test]
#[serial]
fn test_same_name_can_be_recreated_after_remove() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let first = orchestrator.create_worktree("again", "", &cancel).unwrap();
    orchestrator
        .remove_worktree("again", RemoveOptions::default(), &cancel)
        .unwrap();

    let second = orchestrator.create_worktree("again", "", &cancel).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        orchestrator.dirs().get_dir("again").unwrap(),
        second
    );
}
