//! # Session Store
//!
//! Persists a guide conversation (message log and user context) through a
//! key-value [`SessionStore`], and drives the pipeline for each exchange.

pub mod config;
pub mod directory;
pub mod error;
pub mod manager;
pub mod storage;
pub mod structs;

// Re-exports
pub use config::GuideConfig;
pub use directory::SessionDirectory;
pub use error::{Result, SessionError};
pub use manager::ChatSession;
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore, CONTEXT_KEY, MESSAGES_KEY};
pub use structs::{
    Exchange, SessionListing, SessionOptions, SessionStats, SessionSummary, SessionsOverview,
};
