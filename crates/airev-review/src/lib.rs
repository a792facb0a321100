//! Review generation and publishing for airev.
//!
//! Provides the workflow steps: diff loading, the completion-service client
//! and prompt, review generation, the GitHub comment client, and the
//! update-or-create comment publisher.

pub mod diff;
pub mod generator;
pub mod github;
pub mod llm;
pub mod prompt;
pub mod publish;
pub mod workflow;
