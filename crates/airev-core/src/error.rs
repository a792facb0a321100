use std::path::PathBuf;

/// Errors that can occur while producing and publishing a review.
///
/// Library crates use this type directly; the binary crate converts to
/// `miette` diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use airev_core::AirevError;
///
/// let err = AirevError::Config("PR_NUMBER not set".into());
/// assert!(err.to_string().contains("PR_NUMBER"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AirevError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(airev::config))]
    Config(String),

    /// The diff file to review does not exist.
    #[error("PR diff file not found: {}", .0.display())]
    #[diagnostic(
        code(airev::missing_input),
        help("write the pull request diff to this path, or pass --diff-file")
    )]
    MissingInput(PathBuf),

    /// Completion service call or response error.
    #[error("LLM error: {0}")]
    #[diagnostic(code(airev::llm))]
    Llm(String),

    /// Source-hosting API failure.
    #[error("GitHub error: {0}")]
    #[diagnostic(
        code(airev::github),
        help("check that GITHUB_TOKEN can write issue comments on the repository")
    )]
    GitHub(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
