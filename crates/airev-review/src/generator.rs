use airev_core::{AirevError, ReviewOutcome};
use tracing::{debug, info, warn};

use crate::llm::CompletionService;

/// Text used when the service answers without any output.
pub const FALLBACK_REVIEW: &str = "Unable to generate review.";

/// Ask `service` to review `diff` under `instructions`.
///
/// Never fails: a call error becomes [`ReviewOutcome::Failed`] carrying the
/// bare cause (without the `LLM error:` prefix of [`AirevError::Llm`]), and
/// an empty answer becomes [`FALLBACK_REVIEW`].
pub async fn generate_review(
    service: &dyn CompletionService,
    instructions: &str,
    diff: &str,
) -> ReviewOutcome {
    info!(model = service.model(), "Getting AI review...");
    match service.complete(instructions, diff).await {
        Ok(Some(text)) => {
            debug!(chars = text.len(), "AI review generated");
            ReviewOutcome::Generated(text)
        }
        Ok(None) => {
            warn!("completion service returned no text");
            ReviewOutcome::Generated(FALLBACK_REVIEW.to_string())
        }
        Err(e) => {
            warn!(error = %e, "Error calling completion service");
            let cause = match e {
                AirevError::Llm(msg) => msg,
                other => other.to_string(),
            };
            ReviewOutcome::Failed(cause)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Canned(Result<Option<String>, String>);

    #[async_trait]
    impl CompletionService for Canned {
        fn model(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            _instructions: &str,
            _input: &str,
        ) -> Result<Option<String>, AirevError> {
            self.0.clone().map_err(AirevError::Llm)
        }
    }

    #[tokio::test]
    async fn text_is_passed_through() {
        let svc = Canned(Ok(Some("1. Looks fine".into())));
        let outcome = generate_review(&svc, "rubric", "+x").await;
        assert_eq!(outcome, ReviewOutcome::Generated("1. Looks fine".into()));
    }

    #[tokio::test]
    async fn empty_answer_uses_fallback() {
        let svc = Canned(Ok(None));
        let outcome = generate_review(&svc, "rubric", "+x").await;
        assert_eq!(outcome, ReviewOutcome::Generated(FALLBACK_REVIEW.into()));
    }

    #[tokio::test]
    async fn failure_is_captured_not_raised() {
        let svc = Canned(Err("401 Unauthorized".into()));
        let outcome = generate_review(&svc, "rubric", "+x").await;
        match outcome {
            ReviewOutcome::Failed(msg) => assert!(msg.contains("401 Unauthorized")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_cause_has_no_error_prefix() {
        let svc = Canned(Err("request failed: connection reset".into()));
        let outcome = generate_review(&svc, "rubric", "+x").await;
        assert_eq!(
            outcome,
            ReviewOutcome::Failed("request failed: connection reset".into())
        );
        assert_eq!(
            outcome.comment_text(),
            "Error generating AI review: request failed: connection reset"
        );
    }
}
