//! BrainGuard - records cognitive patterns spotted in a user's requests and
//! recalls them by kind, time window and semantic similarity.

pub mod command;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod host;
pub mod logging;
pub mod paths;
pub mod patterns;
pub mod prompt;
pub mod storage;
pub mod testing;
pub mod tool;

// Re-export commonly used types
pub use config::Config;
pub use error::GuardError;
pub use patterns::PatternEngine;
pub use storage::{NewPattern, PatternKind, PatternRecord};
