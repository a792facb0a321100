use airev_core::{AirevError, IssueComment, PullRequestRef};
use serde::Serialize;
use tracing::{error, info};

use crate::github::CommentStore;

/// How the review comment reached the pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "action", content = "commentId")]
pub enum PublishOutcome {
    /// An existing marked comment was overwritten.
    Updated(u64),
    /// No marked comment existed, so a new one was created.
    Created(u64),
}

impl PublishOutcome {
    /// Identifier of the comment that now holds the review.
    pub fn comment_id(self) -> u64 {
        match self {
            PublishOutcome::Updated(id) | PublishOutcome::Created(id) => id,
        }
    }
}

/// Render the full comment body: marker, heading, then the review text.
///
/// # Examples
///
/// ```
/// use airev_review::publish::render_comment_body;
///
/// let body = render_comment_body("<!-- m -->", "AI Code Review", "LGTM");
/// assert_eq!(body, "<!-- m -->\n## AI Code Review\n\nLGTM\n");
/// ```
pub fn render_comment_body(marker: &str, heading: &str, review: &str) -> String {
    format!("{marker}\n## {heading}\n\n{review}\n")
}

/// Return the first comment whose body contains `marker`.
///
/// A blank marker matches nothing, since every body contains it.
pub fn find_marked_comment<'a>(
    comments: &'a [IssueComment],
    marker: &str,
) -> Option<&'a IssueComment> {
    if marker.trim().is_empty() {
        return None;
    }
    comments.iter().find(|c| c.has_marker(marker))
}

/// Make `body` the content of the pull request's marked comment.
///
/// Updates the first comment containing `marker` in place, or creates a new
/// comment when none exists. Exactly one mutating call is made.
///
/// The lookup and the write are not atomic: two concurrent runs against the
/// same pull request can both miss and each create a comment.
///
/// # Errors
///
/// Returns [`AirevError::GitHub`] if listing, updating, or creating fails.
pub async fn publish_review(
    store: &dyn CommentStore,
    pr: &PullRequestRef,
    marker: &str,
    body: &str,
) -> Result<PublishOutcome, AirevError> {
    upsert(store, pr, marker, body).await.inspect_err(|e| {
        error!(error = %e, pr = %pr, "Error posting/updating review");
    })
}

async fn upsert(
    store: &dyn CommentStore,
    pr: &PullRequestRef,
    marker: &str,
    body: &str,
) -> Result<PublishOutcome, AirevError> {
    let comments = store.list_comments(pr).await?;

    if let Some(existing) = find_marked_comment(&comments, marker) {
        let updated = store.update_comment(&pr.repo, existing.id, body).await?;
        info!(comment_id = updated.id, "Updated existing AI review comment");
        return Ok(PublishOutcome::Updated(updated.id));
    }

    let created = store.create_comment(pr, body).await?;
    info!(comment_id = created.id, "Created new AI review comment");
    Ok(PublishOutcome::Created(created.id))
}
