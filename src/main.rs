use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use airev_core::{AirevConfig, LlmErrorPolicy};
use airev_review::github::GitHubClient;
use airev_review::llm::LlmClient;
use airev_review::workflow::{Destination, ReviewWorkflow, RunOutcome};

#[derive(Parser)]
#[command(
    name = "airev",
    version,
    about = "Post an AI code review as a pull request comment",
    long_about = "Reads a pull request diff, asks a language model to review it, and keeps a\n\
                   single marked review comment on the pull request up to date.\n\n\
                   Examples:\n  \
                     git diff origin/main... > pr.diff && airev review   Review and post\n  \
                     airev review --dry-run                            Print the comment instead\n  \
                     airev init                                        Create .airev.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .airev.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Review a diff and post or update the review comment
    #[command(long_about = "Review a diff and post or update the review comment.\n\n\
        Reads the diff file (default: pr.diff). An empty diff exits successfully without\n\
        calling any service. The review comment is found by its marker and updated in\n\
        place; if there is none, a new comment is created.\n\n\
        Examples:\n  airev review\n  airev review --diff-file changes.diff --pr 12\n  airev review --dry-run --model gpt-4o-mini")]
    Review(ReviewArgs),
    /// Create a default .airev.toml configuration file
    #[command(long_about = "Create a default .airev.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .airev.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
struct ReviewArgs {
    /// Diff file to review (default: pr.diff)
    #[arg(long, env = "AIREV_DIFF_FILE")]
    diff_file: Option<PathBuf>,

    /// Target repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Pull request number
    #[arg(long, env = "PR_NUMBER")]
    pr: Option<String>,

    /// GitHub token used to read and write comments
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL")]
    github_api_url: Option<String>,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Completion service base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    llm_base_url: Option<String>,

    /// Model used to generate the review
    #[arg(long, env = "AIREV_MODEL")]
    model: Option<String>,

    /// Print the rendered comment instead of posting it
    #[arg(long)]
    dry_run: bool,

    /// Fail the run instead of posting the error when review generation fails
    #[arg(long)]
    fail_on_llm_error: bool,

    /// Print the run outcome as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl ReviewArgs {
    /// Layer flags and environment values over the file configuration.
    fn apply(&self, config: &mut AirevConfig) {
        if let Some(path) = &self.diff_file {
            config.review.diff_path = path.clone();
        }
        if let Some(repository) = &self.repository {
            config.github.repository = Some(repository.clone());
        }
        if let Some(pr) = &self.pr {
            config.github.pr_number = Some(pr.clone());
        }
        if let Some(token) = &self.github_token {
            config.github.token = Some(token.clone());
        }
        if let Some(url) = &self.github_api_url {
            config.github.api_url = Some(url.clone());
        }
        if let Some(key) = &self.openai_api_key {
            config.llm.api_key = Some(key.clone());
        }
        if let Some(url) = &self.llm_base_url {
            config.llm.base_url = Some(url.clone());
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if self.fail_on_llm_error {
            config.review.on_llm_error = LlmErrorPolicy::Abort;
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# airev configuration
# Values here are overridden by environment variables and command-line flags.

[llm]
# model = "gpt-4o"
# base_url = "https://api.openai.com"
# timeout_secs = 120

[github]
# api_url = "https://api.github.com"

[review]
# diff_path = "pr.diff"
# marker = "<!-- AI-REVIEW-COMMENT -->"
# heading = "AI Code Review"
# on_llm_error = "comment"   # or "abort"
# instructions = """
# Replace the built-in review rubric with your own instructions.
# """
"#;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AirevConfig> {
    let config = match path {
        Some(path) => AirevConfig::from_file(path)?,
        None => {
            let default_path = std::path::Path::new(".airev.toml");
            if default_path.exists() {
                AirevConfig::from_file(default_path)?
            } else {
                AirevConfig::default()
            }
        }
    };
    Ok(config)
}

async fn run_review(args: &ReviewArgs, mut config: AirevConfig) -> Result<()> {
    args.apply(&mut config);

    if config.llm.api_key.is_none() && config.llm.base_url.is_none() {
        miette::bail!("OPENAI_API_KEY not set. Pass --openai-api-key or set OPENAI_API_KEY");
    }
    let llm = Arc::new(LlmClient::new(&config.llm)?);

    let destination = if args.dry_run {
        Destination::DryRun
    } else {
        let pr = config.pull_request()?;
        let store = Arc::new(GitHubClient::new(&config.github)?);
        Destination::PullRequest { store, pr }
    };

    let workflow = ReviewWorkflow::new(llm, destination, config.review);
    let outcome = workflow.run().await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).into_diagnostic()?
        );
    } else if let RunOutcome::Rendered { body, .. } = &outcome {
        print!("{body}");
    }

    if !matches!(outcome, RunOutcome::NoChanges) {
        info!("AI review completed successfully!");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Review(ref args) => {
            let config = load_config(cli.config.as_ref())?;
            run_review(args, config).await?;
        }
        Command::Init => {
            let path = std::path::Path::new(".airev.toml");
            if path.exists() {
                miette::bail!(".airev.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .airev.toml with default configuration");
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "airev", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_config_template_parses() {
        let config = AirevConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn flags_override_file_config() {
        let cli = Cli::try_parse_from([
            "airev",
            "review",
            "--repository",
            "octocat/hello-world",
            "--pr",
            "9",
            "--model",
            "gpt-4o-mini",
            "--diff-file",
            "changes.diff",
            "--fail-on-llm-error",
        ])
        .unwrap();
        let Command::Review(args) = cli.command else {
            panic!("expected review command");
        };

        let mut config = AirevConfig::default();
        args.apply(&mut config);

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.review.diff_path, PathBuf::from("changes.diff"));
        assert_eq!(config.review.on_llm_error, LlmErrorPolicy::Abort);
        let pr = config.pull_request().unwrap();
        assert_eq!(pr.to_string(), "octocat/hello-world#9");
    }
}
