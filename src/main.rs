use std::error::Error;
use std::io::Read;

use llm_gateway::{AzureOpenAiService, CompletionConfig};
use pr_reviewer::prompt::PromptConfig;
use pr_reviewer::{CommentSink, ReviewOptions, review_change_request};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file.
    // Fails if .env file not found, not readable or invalid.
    dotenvy::dotenv()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = CompletionConfig::from_env()?;
    let service = AzureOpenAiService::new(config)?;

    let pr_number = std::env::var("PR_NUMBER").unwrap_or_else(|_| "0".to_string());
    let diff = read_diff()?;

    let options = ReviewOptions {
        token_max: env_opt("REVIEW_TOKEN_MAX"),
        temperature: env_opt("REVIEW_TEMPERATURE"),
        prompt: PromptConfig {
            instructions_override: env_opt("REVIEW_PROMPT"),
            additional_instructions: env_opt("REVIEW_ADDITIONAL_PROMPTS")
                .map(|v| v.lines().map(str::to_string).collect())
                .unwrap_or_default(),
        },
        pacing: Default::default(),
    };

    let mut sink = CommentSink::DryRun;
    let summary = review_change_request(&service, &diff, &pr_number, &options, &mut sink).await?;

    tracing::info!(
        sections = summary.chunk_count,
        with_feedback = summary.sections_with_feedback,
        usage = %summary.usage,
        "review run complete"
    );

    Ok(())
}

/// Optional env knob: unset or blank means "not configured".
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Reads the diff from `DIFF_FILE` when set, otherwise from stdin.
/// Obtaining the diff (version-control interaction) stays outside the core.
fn read_diff() -> Result<String, Box<dyn Error>> {
    if let Some(path) = env_opt("DIFF_FILE") {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
