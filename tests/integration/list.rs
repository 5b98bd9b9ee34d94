//! Listing: health vocabulary and read-only behavior

use serial_test::serial;
use std::fs;

use berth::cancel::CancelToken;
use berth::orchestrator::WorktreeListing;

use super::helpers::*;

fn status_of<'a>(listings: &'a [WorktreeListing], name: &str) -> &'a str {
    &listings
        .iter()
        .find(|l| l.name == name)
        .unwrap_or_else(|| panic!("{name} not listed"))
        .status
}

#[test]
#[serial]
fn test_list_mixed_health() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    let mut paths = Vec::new();
    for name in ["a", "b", "c", "d"] {
        paths.push(orchestrator.create_worktree(name, "", &cancel).unwrap());
    }

    // b: directory deleted by hand
    fs::remove_dir_all(&paths[1]).unwrap();
    // c: git metadata removed behind berth's back
    orchestrator.git().worktrees().remove("c").unwrap();
    // d: both gone
    fs::remove_dir_all(&paths[3]).unwrap();
    orchestrator.git().worktrees().remove("d").unwrap();
    let registry_before = env.registry_yaml();

    let listings = orchestrator.list_worktrees().unwrap();

    assert_eq!(listings.len(), 4);
    assert_eq!(status_of(&listings, "a"), "healthy");
    assert_eq!(status_of(&listings, "b"), "dir missing");
    assert_eq!(status_of(&listings, "c"), "git missing");
    assert_eq!(status_of(&listings, "d"), "dir missing, git missing");
    assert_eq!(listings.iter().filter(|l| l.prunable).count(), 1);
    assert_eq!(env.registry_yaml(), registry_before);
}

#[test]
#[serial]
fn test_list_preserves_canonical_name() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    orchestrator
        .create_worktree("feat/x", "", &CancelToken::new())
        .unwrap();

    let listings = orchestrator.list_worktrees().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].name, "feat/x");
    assert_eq!(listings[0].branch, "feat/x");
    assert_eq!(
        listings[0].path.file_name().and_then(|n| n.to_str()),
        Some("feat-x")
    );
    let head = git(&["rev-parse", "HEAD"], env.repo_path());
    assert_eq!(listings[0].head.as_deref(), Some(&head[..7]));
}

#[test]
#[serial]
fn test_list_flags_corrupt_worktree_as_error() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let path = orchestrator
        .create_worktree("broken", "", &CancelToken::new())
        .unwrap();
    fs::write(path.join(".git"), "garbage\n").unwrap();

    let listings = orchestrator.list_worktrees().unwrap();
    assert!(status_of(&listings, "broken").starts_with("error: "));
    assert!(!listings[0].prunable);
}

#[test]
#[serial]
fn test_list_reports_orphan_metadata() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let cancel = CancelToken::new();
    orchestrator.create_worktree("tracked", "", &cancel).unwrap();
    orchestrator.create_worktree("forgotten", "", &cancel).unwrap();

    orchestrator
        .registry()
        .project(orchestrator.project())
        .delete_worktree("forgotten", &cancel)
        .unwrap();

    let listings = orchestrator.list_worktrees().unwrap();
    assert_eq!(listings.len(), 2);
    let orphan = listings.iter().find(|l| l.orphan).unwrap();
    assert_eq!(orphan.name, "forgotten");
    assert!(orphan.status.starts_with("error: "));
    assert!(!orphan.prunable);
}
