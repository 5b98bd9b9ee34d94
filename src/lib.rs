pub mod cancel;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod logging;
pub mod orchestrator;
pub mod project;
pub mod registry;
pub mod slug;
pub mod workspace;
