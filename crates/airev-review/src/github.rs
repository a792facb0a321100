use airev_core::{AirevError, GitHubConfig, IssueComment, PullRequestRef, RepoRef};
use async_trait::async_trait;
use octocrab::models::CommentId;

/// Comment operations on a pull request's conversation thread.
///
/// Implemented by [`GitHubClient`] for real runs; tests substitute fakes.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Fetch one page of comments on the pull request.
    async fn list_comments(&self, pr: &PullRequestRef) -> Result<Vec<IssueComment>, AirevError>;

    /// Replace the body of an existing comment.
    async fn update_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, AirevError>;

    /// Add a new comment to the pull request.
    async fn create_comment(
        &self,
        pr: &PullRequestRef,
        body: &str,
    ) -> Result<IssueComment, AirevError>;
}

/// Comments requested per listing call.
const COMMENTS_PER_PAGE: u8 = 100;

/// GitHub client for the issue comments API.
///
/// Pull request conversation comments are issue comments, so the issue
/// endpoints are used with the PR number.
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
}

impl GitHubClient {
    /// Create a client from the configured token and optional API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AirevError::Config`] if no token is configured or the API
    /// URL is invalid, or [`AirevError::GitHub`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use airev_core::GitHubConfig;
    /// use airev_review::github::GitHubClient;
    ///
    /// let config = GitHubConfig {
    ///     token: Some("ghp_xxxx".into()),
    ///     ..GitHubConfig::default()
    /// };
    /// let client = GitHubClient::new(&config).unwrap();
    /// ```
    pub fn new(config: &GitHubConfig) -> Result<Self, AirevError> {
        let token = config.token.clone().ok_or_else(|| {
            AirevError::Config(
                "GITHUB_TOKEN not set. Pass --github-token or set GITHUB_TOKEN env var".into(),
            )
        })?;

        let mut builder = octocrab::Octocrab::builder().personal_token(token);
        if let Some(api_url) = &config.api_url {
            builder = builder
                .base_uri(api_url.as_str())
                .map_err(|e| AirevError::Config(format!("invalid GitHub API URL: {e}")))?;
        }

        let octocrab = builder
            .build()
            .map_err(|e| AirevError::GitHub(format!("failed to create GitHub client: {e}")))?;

        Ok(Self { octocrab })
    }
}

fn to_issue_comment(comment: octocrab::models::issues::Comment) -> IssueComment {
    IssueComment {
        id: comment.id.0,
        body: comment.body,
    }
}

#[async_trait]
impl CommentStore for GitHubClient {
    async fn list_comments(&self, pr: &PullRequestRef) -> Result<Vec<IssueComment>, AirevError> {
        let page = self
            .octocrab
            .issues(&pr.repo.owner, &pr.repo.name)
            .list_comments(pr.number)
            .per_page(COMMENTS_PER_PAGE)
            .send()
            .await
            .map_err(|e| AirevError::GitHub(format!("failed to list comments on {pr}: {e}")))?;

        Ok(page.items.into_iter().map(to_issue_comment).collect())
    }

    async fn update_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, AirevError> {
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .update_comment(CommentId(comment_id), body)
            .await
            .map(to_issue_comment)
            .map_err(|e| {
                AirevError::GitHub(format!(
                    "failed to update comment {comment_id} in {repo}: {e}"
                ))
            })
    }

    async fn create_comment(
        &self,
        pr: &PullRequestRef,
        body: &str,
    ) -> Result<IssueComment, AirevError> {
        self.octocrab
            .issues(&pr.repo.owner, &pr.repo.name)
            .create_comment(pr.number, body)
            .await
            .map(to_issue_comment)
            .map_err(|e| AirevError::GitHub(format!("failed to create comment on {pr}: {e}")))
    }
}
