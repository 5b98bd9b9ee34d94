//! Durable project → worktrees mapping

pub mod handle;
pub mod health;
pub mod schema;
pub mod store;

pub use handle::{ProjectHandle, WorktreeEntry, WorktreeHandle};
pub use health::{HealthProbe, HealthState, WorktreeHealth};
pub use schema::{ProjectEntry, RegistryFile, WorktreeRecord};
pub use store::Registry;
