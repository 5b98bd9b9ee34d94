//! Registry file compatibility and corruption handling

use serial_test::serial;
use std::fs;

use berth::cancel::CancelToken;
use berth::config::Config;
use berth::error::ErrorKind;
use berth::orchestrator::{RemoveOptions, WorktreeOrchestrator};
use berth::workspace::WorktreeDirProvider;

use super::helpers::*;

/// Write a registry holding the discovered project with `worktrees_yaml`
/// as its worktrees block.
fn seed_registry(env: &TestEnv, extra_project_keys: &str, worktrees_yaml: &str) {
    let project = env.orchestrator().project().clone();
    let yaml = format!(
        "schema: 2\nprojects:\n  {slug}:\n    name: {name}\n    root: {root}\n{extra_project_keys}    worktrees:\n{worktrees_yaml}",
        slug = project.slug,
        name = project.name,
        root = project.root.display(),
    );
    fs::write(env.registry_path(), yaml).unwrap();
}

#[test]
#[serial]
fn test_legacy_entry_is_read_and_rewritten_structured() {
    let env = TestEnv::new();
    seed_registry(&env, "    image: ubuntu:24.04\n", "      feat/x: feat-x\n");
    let orchestrator = env.orchestrator();

    let listings = orchestrator.list_worktrees().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].name, "feat/x");
    assert_eq!(listings[0].branch, "feat/x");
    assert_eq!(listings[0].status, "dir missing, git missing");
    assert!(listings[0].path.ends_with("worktrees/feat-x"));

    let path = orchestrator
        .create_worktree("feat/x", "", &CancelToken::new())
        .unwrap();

    let yaml = env.registry_yaml();
    assert!(!yaml.contains("feat/x: feat-x"), "{yaml}");
    assert!(yaml.contains(&format!("path: {}", path.display())), "{yaml}");
    assert!(yaml.contains("branch: feat/x"), "{yaml}");
    assert!(yaml.contains("image: ubuntu:24.04"), "{yaml}");
    assert!(yaml.contains("schema: 2"), "{yaml}");
}

#[test]
#[serial]
fn test_unknown_worktree_keys_survive_rewrite() {
    let env = TestEnv::new();
    seed_registry(
        &env,
        "",
        "      old:\n        path: /nowhere/old\n        branch: old\n        owner: agent-3\n",
    );
    let orchestrator = env.orchestrator();

    orchestrator
        .create_worktree("new", "", &CancelToken::new())
        .unwrap();

    let yaml = env.registry_yaml();
    assert!(yaml.contains("owner: agent-3"), "{yaml}");
    assert!(env.is_registered("new"));
}

#[test]
#[serial]
fn test_corrupt_registry_is_reported_not_cleared() {
    let env = TestEnv::new();
    let garbage = "projects:\n  broken: [unterminated\n";
    fs::write(env.registry_path(), garbage).unwrap();

    let config = Config::with_root(env.config.path()).unwrap();
    let err = WorktreeOrchestrator::discover(env.repo_path(), config).unwrap_err();

    assert!(err.is(ErrorKind::RegistryCorrupt));
    assert_eq!(fs::read_to_string(env.registry_path()).unwrap(), garbage);
}

#[test]
#[serial]
fn test_unexpected_worktree_shape_is_corrupt() {
    let env = TestEnv::new();
    seed_registry(&env, "", "      weird: [1, 2, 3]\n");

    let config = Config::with_root(env.config.path()).unwrap();
    let err = WorktreeOrchestrator::discover(env.repo_path(), config).unwrap_err();
    assert!(err.is(ErrorKind::RegistryCorrupt));
}

#[test]
#[serial]
fn test_legacy_slug_differing_from_name_is_honoured() {
    let env = TestEnv::new();
    let orchestrator = env.orchestrator();
    let path = orchestrator.dirs().worktrees_root().join("legacy-dir");
    git(
        &["worktree", "add", "-b", "feat/x", &path.to_string_lossy()],
        env.repo_path(),
    );
    seed_registry(&env, "", "      feat/x: legacy-dir\n");

    let listings = orchestrator.list_worktrees().unwrap();
    assert_eq!(listings.len(), 1, "{listings:?}");
    assert_eq!(listings[0].name, "feat/x");
    assert_eq!(listings[0].status, "healthy");
    assert!(!listings[0].orphan);

    let cancel = CancelToken::new();
    let report = orchestrator.prune_stale_worktrees(false, &cancel).unwrap();
    assert!(report.candidates.is_empty());
    assert!(env.is_registered("feat/x"));

    let again = orchestrator.create_worktree("feat/x", "", &cancel).unwrap();
    assert_eq!(again, path);
    assert!(!orchestrator.dirs().worktrees_root().join("feat-x").exists());

    orchestrator
        .remove_worktree("feat/x", RemoveOptions::default(), &cancel)
        .unwrap();
    assert!(!path.exists());
    assert!(!orchestrator.git().worktrees().exists("legacy-dir").unwrap());
    assert!(!env.is_registered("feat/x"));
}
