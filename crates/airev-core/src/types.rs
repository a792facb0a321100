use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AirevError;

/// A hosted repository identified by owner and name.
///
/// # Examples
///
/// ```
/// use airev_core::RepoRef;
///
/// let repo: RepoRef = "octocat/hello-world".parse().unwrap();
/// assert_eq!(repo.owner, "octocat");
/// assert_eq!(repo.name, "hello-world");
/// assert_eq!(repo.to_string(), "octocat/hello-world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Account or organization that owns the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = AirevError;

    /// Parse an `owner/repo` string, splitting on the first `/`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((owner, name)) = s.trim().split_once('/') else {
            return Err(AirevError::Config(format!(
                "invalid repository '{s}', expected owner/repo"
            )));
        };
        if owner.is_empty() || name.is_empty() {
            return Err(AirevError::Config(format!(
                "invalid repository '{s}', expected owner/repo"
            )));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A pull request within a repository.
///
/// # Examples
///
/// ```
/// use airev_core::PullRequestRef;
///
/// let pr = PullRequestRef {
///     repo: "octocat/hello-world".parse().unwrap(),
///     number: 42,
/// };
/// assert_eq!(pr.to_string(), "octocat/hello-world#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Repository the pull request belongs to.
    pub repo: RepoRef,
    /// Pull request (issue) number.
    pub number: u64,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

/// Parse a pull request number as given by the environment.
///
/// # Errors
///
/// Returns [`AirevError::Config`] unless `s` is a positive integer.
///
/// # Examples
///
/// ```
/// use airev_core::parse_pr_number;
///
/// assert_eq!(parse_pr_number("17").unwrap(), 17);
/// assert!(parse_pr_number("0").is_err());
/// assert!(parse_pr_number("abc").is_err());
/// ```
pub fn parse_pr_number(s: &str) -> Result<u64, AirevError> {
    match s.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AirevError::Config(format!("invalid PR number: {s}"))),
    }
}

/// A comment on a pull request's conversation thread.
///
/// The record is owned by the hosting service; only the fields the
/// publisher needs are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Comment identifier assigned by the hosting service.
    pub id: u64,
    /// Comment body, absent for comments the API returns without one.
    pub body: Option<String>,
}

impl IssueComment {
    /// Returns `true` if the comment body contains `marker`.
    ///
    /// # Examples
    ///
    /// ```
    /// use airev_core::IssueComment;
    ///
    /// let c = IssueComment { id: 1, body: Some("<!-- x -->\nhi".into()) };
    /// assert!(c.has_marker("<!-- x -->"));
    /// let empty = IssueComment { id: 2, body: None };
    /// assert!(!empty.has_marker("<!-- x -->"));
    /// ```
    pub fn has_marker(&self, marker: &str) -> bool {
        self.body.as_deref().is_some_and(|b| b.contains(marker))
    }
}

/// Result of asking the completion service for a review.
///
/// Generation never aborts the run by itself; the caller decides what a
/// [`ReviewOutcome::Failed`] means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The service produced review text (or the fallback when it returned none).
    Generated(String),
    /// The call failed; holds a human-readable description of the failure.
    Failed(String),
}

impl ReviewOutcome {
    /// Text to publish for this outcome.
    ///
    /// A failure renders as an in-band error message.
    ///
    /// # Examples
    ///
    /// ```
    /// use airev_core::ReviewOutcome;
    ///
    /// let ok = ReviewOutcome::Generated("LGTM".into());
    /// assert_eq!(ok.comment_text(), "LGTM");
    ///
    /// let failed = ReviewOutcome::Failed("timeout".into());
    /// assert_eq!(failed.comment_text(), "Error generating AI review: timeout");
    /// ```
    pub fn comment_text(&self) -> String {
        match self {
            ReviewOutcome::Generated(text) => text.clone(),
            ReviewOutcome::Failed(cause) => format!("Error generating AI review: {cause}"),
        }
    }

    /// Returns `true` if generation failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, ReviewOutcome::Failed(_))
    }
}

/// What to do when the completion service call fails.
///
/// # Examples
///
/// ```
/// use airev_core::LlmErrorPolicy;
///
/// assert_eq!("abort".parse::<LlmErrorPolicy>().unwrap(), LlmErrorPolicy::Abort);
/// assert_eq!(LlmErrorPolicy::default(), LlmErrorPolicy::Comment);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmErrorPolicy {
    /// Post the failure message as the review comment and finish normally.
    #[default]
    Comment,
    /// Fail the run without touching the pull request.
    Abort,
}

impl fmt::Display for LlmErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmErrorPolicy::Comment => write!(f, "comment"),
            LlmErrorPolicy::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for LlmErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comment" => Ok(LlmErrorPolicy::Comment),
            "abort" => Ok(LlmErrorPolicy::Abort),
            other => Err(format!("unknown LLM error policy: {other}")),
        }
    }
}
