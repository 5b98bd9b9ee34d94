//! On-disk shape of the registry file
//!
//! ```yaml
//! projects:
//!   <project-slug>:
//!     name: <display>
//!     root: <absolute path>
//!     worktrees:
//!       <worktree-name>:
//!         path: <absolute path>
//!         branch: <branch name>
//! ```
//!
//! A worktree value may also be the legacy compact form
//! `<worktree-name>: <slug>`. Unknown keys at every level are kept in the
//! `extra` maps so a rewrite does not drop them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Keys this version does not understand, preserved verbatim.
pub type Extra = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: BTreeMap<String, ProjectEntry>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub root: PathBuf,
    #[serde(default, deserialize_with = "null_as_default")]
    pub worktrees: BTreeMap<String, WorktreeRecord>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Persisted record of one worktree.
///
/// Always written in the structured form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWorktree")]
pub struct WorktreeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Slug carried by the legacy string form until the path is derived
    #[serde(skip)]
    pub legacy_slug: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWorktree {
    Legacy(String),
    Structured(StructuredWorktree),
}

#[derive(Deserialize)]
struct StructuredWorktree {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(flatten)]
    extra: Extra,
}

impl From<RawWorktree> for WorktreeRecord {
    fn from(raw: RawWorktree) -> Self {
        match raw {
            RawWorktree::Legacy(slug) => WorktreeRecord {
                legacy_slug: Some(slug),
                ..Default::default()
            },
            RawWorktree::Structured(s) => WorktreeRecord {
                path: s.path,
                branch: s.branch,
                legacy_slug: None,
                extra: s.extra,
            },
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
