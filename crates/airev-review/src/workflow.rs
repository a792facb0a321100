use std::sync::Arc;

use airev_core::{AirevError, LlmErrorPolicy, PullRequestRef, ReviewConfig, ReviewOutcome};
use serde::Serialize;
use tracing::info;

use crate::diff::load_diff;
use crate::generator::generate_review;
use crate::github::CommentStore;
use crate::llm::CompletionService;
use crate::prompt::build_instructions;
use crate::publish::{publish_review, render_comment_body, PublishOutcome};

/// Where the rendered review goes.
pub enum Destination {
    /// Update or create the marked comment on a pull request.
    PullRequest {
        /// Comment API for the hosting service.
        store: Arc<dyn CommentStore>,
        /// Pull request to comment on.
        pr: PullRequestRef,
    },
    /// Render the comment without contacting the hosting service.
    DryRun,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum RunOutcome {
    /// The diff was empty; nothing was generated or posted.
    NoChanges,
    /// The review comment was written to the pull request.
    #[serde(rename_all = "camelCase")]
    Published {
        /// Whether the comment was updated or created.
        outcome: PublishOutcome,
        /// `true` if the posted text is a generation error message.
        review_failed: bool,
    },
    /// Dry run: the body that would have been posted.
    #[serde(rename_all = "camelCase")]
    Rendered {
        /// Full comment body including marker and heading.
        body: String,
        /// `true` if the rendered text is a generation error message.
        review_failed: bool,
    },
}

/// Loads the diff, generates a review, and publishes it, in that order.
///
/// All collaborators and settings are passed in, so the same workflow runs
/// against real services or test fakes.
pub struct ReviewWorkflow {
    llm: Arc<dyn CompletionService>,
    destination: Destination,
    config: ReviewConfig,
}

impl ReviewWorkflow {
    /// Create a workflow from its collaborators and review settings.
    pub fn new(
        llm: Arc<dyn CompletionService>,
        destination: Destination,
        config: ReviewConfig,
    ) -> Self {
        Self {
            llm,
            destination,
            config,
        }
    }

    /// Run the workflow once.
    ///
    /// An empty or whitespace-only diff finishes with [`RunOutcome::NoChanges`]
    /// without any network call. A failed completion call is posted as the
    /// review unless the policy is [`LlmErrorPolicy::Abort`].
    ///
    /// # Errors
    ///
    /// Returns [`AirevError::Config`] if the review settings are invalid,
    /// [`AirevError::MissingInput`] if the diff file does not exist,
    /// [`AirevError::Llm`] if generation failed under the abort policy, or
    /// [`AirevError::GitHub`] if the comment cannot be listed or written.
    pub async fn run(&self) -> Result<RunOutcome, AirevError> {
        self.config.validate()?;

        let Some(diff) = load_diff(&self.config.diff_path)? else {
            info!("No changes to review");
            return Ok(RunOutcome::NoChanges);
        };

        let instructions = build_instructions(self.config.instructions.as_deref());
        let review = generate_review(self.llm.as_ref(), &instructions, &diff).await;
        let review_failed = review.is_failed();

        if let ReviewOutcome::Failed(cause) = &review {
            if self.config.on_llm_error == LlmErrorPolicy::Abort {
                return Err(AirevError::Llm(cause.clone()));
            }
        }

        let body = render_comment_body(
            &self.config.marker,
            &self.config.heading,
            &review.comment_text(),
        );

        match &self.destination {
            Destination::PullRequest { store, pr } => {
                info!(pr = %pr, "Posting/updating review comment...");
                let outcome =
                    publish_review(store.as_ref(), pr, &self.config.marker, &body).await?;
                Ok(RunOutcome::Published {
                    outcome,
                    review_failed,
                })
            }
            Destination::DryRun => Ok(RunOutcome::Rendered {
                body,
                review_failed,
            }),
        }
    }
}
