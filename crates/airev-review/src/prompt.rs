const REVIEW_INSTRUCTIONS: &str = "\
You are an expert senior code reviewer that reviews pull requests across different \
languages and frameworks performing a thorough pull-request level code review.
Given the PR diff below, produce:
- A short summary of what changed in the PR and stick to the facts.
- Potential bugs, logic flaws, typos, incorrect resource usage or edge cases introduced.
- Security concerns.
- Suggestions for improvements (performance, style, tests) and best practices.
- Provide comments and suggestions ONLY if there is something to improve; if the \
changes look good, say so briefly.
- Write the comment in GitHub Markdown format.
- Keep the review actionable, numbered, and include exact file paths and line snippets \
when relevant.";

/// Build the instruction text sent alongside the diff.
///
/// `custom` replaces the built-in rubric when set.
///
/// # Examples
///
/// ```
/// use airev_review::prompt::build_instructions;
///
/// let prompt = build_instructions(None);
/// assert!(prompt.contains("Security concerns"));
///
/// let custom = build_instructions(Some("Check for SQL injection only."));
/// assert_eq!(custom, "Check for SQL injection only.");
/// ```
pub fn build_instructions(custom: Option<&str>) -> String {
    match custom {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => REVIEW_INSTRUCTIONS.to_string(),
    }
}
