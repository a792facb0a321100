use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AirevError;
use crate::Result;
use crate::types::{parse_pr_number, LlmErrorPolicy, PullRequestRef, RepoRef};

/// Sentinel embedded in the review comment so later runs can find it.
pub const DEFAULT_MARKER: &str = "<!-- AI-REVIEW-COMMENT -->";

/// Top-level configuration, optionally loaded from `.airev.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
/// The binary applies the first two layers on top of a value built here.
///
/// # Examples
///
/// ```
/// use airev_core::AirevConfig;
///
/// let config = AirevConfig::default();
/// assert_eq!(config.llm.model, "gpt-4o");
/// assert_eq!(config.review.diff_path.to_str(), Some("pr.diff"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirevConfig {
    /// Completion service settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Source-hosting settings and the target pull request.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Review input and comment settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl AirevConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AirevError::Io`] if the file cannot be read, or
    /// [`AirevError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`AirevError::Toml`] if parsing fails, or
    /// [`AirevError::Config`] if a value is rejected by
    /// [`ReviewConfig::validate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use airev_core::AirevConfig;
    ///
    /// let toml = r#"
    /// [review]
    /// heading = "Robot Review"
    /// "#;
    /// let config = AirevConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.review.heading, "Robot Review");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.review.validate()?;
        Ok(config)
    }

    /// Resolve the pull request to comment on.
    ///
    /// # Errors
    ///
    /// Returns [`AirevError::Config`] if the repository or PR number is
    /// missing or malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use airev_core::AirevConfig;
    ///
    /// let mut config = AirevConfig::default();
    /// config.github.repository = Some("octocat/hello-world".into());
    /// config.github.pr_number = Some("7".into());
    /// let pr = config.pull_request().unwrap();
    /// assert_eq!(pr.number, 7);
    /// ```
    pub fn pull_request(&self) -> Result<PullRequestRef> {
        let repository = self.github.repository.as_deref().ok_or_else(|| {
            AirevError::Config(
                "GITHUB_REPOSITORY not set. Pass --repository or set GITHUB_REPOSITORY".into(),
            )
        })?;
        let number = self.github.pr_number.as_deref().ok_or_else(|| {
            AirevError::Config("PR_NUMBER not set. Pass --pr or set PR_NUMBER".into())
        })?;
        Ok(PullRequestRef {
            repo: repository.parse::<RepoRef>()?,
            number: parse_pr_number(number)?,
        })
    }
}

/// Completion service configuration.
///
/// # Examples
///
/// ```
/// use airev_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4o");
/// assert_eq!(config.timeout_secs, 120);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the completion service.
    pub api_key: Option<String>,
    /// Custom base URL for API requests (default: `https://api.openai.com`).
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Source-hosting configuration.
///
/// `repository` and `pr_number` are kept as raw strings so that a malformed
/// environment value is reported by [`AirevConfig::pull_request`] rather
/// than at parse time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Authentication token for the hosting API.
    pub token: Option<String>,
    /// Target repository as `owner/repo`.
    pub repository: Option<String>,
    /// Target pull request number.
    pub pr_number: Option<String>,
    /// Custom API base URL, for GitHub Enterprise.
    pub api_url: Option<String>,
}

/// Review input and comment settings.
///
/// # Examples
///
/// ```
/// use airev_core::{LlmErrorPolicy, ReviewConfig};
///
/// let config = ReviewConfig::default();
/// assert_eq!(config.marker, "<!-- AI-REVIEW-COMMENT -->");
/// assert_eq!(config.heading, "AI Code Review");
/// assert_eq!(config.on_llm_error, LlmErrorPolicy::Comment);
/// assert!(config.instructions.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Path of the diff to review, relative to the working directory.
    #[serde(default = "default_diff_path")]
    pub diff_path: PathBuf,
    /// Sentinel identifying the review comment across runs.
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Markdown heading rendered above the review text.
    #[serde(default = "default_heading")]
    pub heading: String,
    /// Replacement for the built-in review rubric.
    pub instructions: Option<String>,
    /// Behavior when the completion call fails.
    #[serde(default)]
    pub on_llm_error: LlmErrorPolicy,
}

fn default_diff_path() -> PathBuf {
    PathBuf::from("pr.diff")
}

fn default_marker() -> String {
    DEFAULT_MARKER.into()
}

fn default_heading() -> String {
    "AI Code Review".into()
}

impl ReviewConfig {
    /// Check values that deserialization alone cannot rule out.
    ///
    /// A blank marker would match every comment on the pull request, so the
    /// publisher would overwrite whichever comment happened to be listed first.
    ///
    /// # Errors
    ///
    /// Returns [`AirevError::Config`] if `marker` is empty or whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use airev_core::ReviewConfig;
    ///
    /// assert!(ReviewConfig::default().validate().is_ok());
    /// let blank = ReviewConfig { marker: " ".into(), ..ReviewConfig::default() };
    /// assert!(blank.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.marker.trim().is_empty() {
            return Err(AirevError::Config("review.marker must not be blank".into()));
        }
        Ok(())
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            diff_path: default_diff_path(),
            marker: default_marker(),
            heading: default_heading(),
            instructions: None,
            on_llm_error: LlmErrorPolicy::default(),
        }
    }
}
