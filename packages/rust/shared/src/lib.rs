//! Shared types, error model, and configuration for FileBot.
//!
//! This crate is the foundation depended on by all other FileBot crates.
//! It provides:
//! - [`FileBotError`]: the unified error type
//! - Domain types ([`Turn`], [`DirectoryEntry`], [`SearchHit`], [`Session`], [`Query`])
//! - Configuration ([`AppConfig`], config loading, session construction)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ChatConfig, ExplorerConfig, FileMode, ServiceConfig, SessionConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, load_session,
    require_credential, validate_config,
};
pub use error::{FileBotError, Result};
pub use types::{
    ConversationId, DirectoryEntry, DownloadLink, FilePreview, NodeKind, Query, ResultItem,
    ResultList, SearchHit, Selection, Session, Speaker, Turn, TurnContent,
};
