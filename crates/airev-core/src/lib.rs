//! Core types, configuration, and error handling for airev.
//!
//! This crate provides the shared foundation used by the other airev crates:
//! - [`AirevError`] — unified error type using `thiserror`
//! - [`AirevConfig`] — configuration loaded from `.airev.toml`
//! - Shared types: [`RepoRef`], [`PullRequestRef`], [`IssueComment`],
//!   [`ReviewOutcome`], [`LlmErrorPolicy`]

mod config;
mod error;
mod types;

pub use config::{AirevConfig, GitHubConfig, LlmConfig, ReviewConfig, DEFAULT_MARKER};
pub use error::AirevError;
pub use types::{
    parse_pr_number, IssueComment, LlmErrorPolicy, PullRequestRef, RepoRef, ReviewOutcome,
};

/// A convenience `Result` type for airev operations.
pub type Result<T> = std::result::Result<T, AirevError>;
