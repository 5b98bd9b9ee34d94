//! Worktree commands
//! Usage: berth worktree [add|list|prune|remove]

mod add;
mod context;
mod list;
mod prune;
mod remove;

pub use add::add;
pub use list::list;
pub use prune::prune;
pub use remove::remove;
