//! RagChat binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing (stderr, so stdout stays with the transcript)
//! 3. Build the HTTP transport and inject it into the conversation controller
//! 4. Answer a single question, or run the interactive session

mod cli;
mod command;
mod render;
mod repl;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use ragchat_chat::{ConversationController, SubmitOutcome};
use ragchat_client::RagClient;
use ragchat_core::config::RagChatConfig;

use cli::CliArgs;

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so its log level applies; the outcome is
    // reported once the subscriber is up.
    let config_file = args.resolve_config_path();
    let loaded = config_file
        .exists()
        .then(|| RagChatConfig::load(&config_file));
    let mut config = match loaded {
        Some(Ok(ref c)) => c.clone(),
        _ => RagChatConfig::default(),
    };
    args.apply_overrides(&mut config);

    init_tracing(&config.general.log_level);
    tracing::info!("Starting RagChat v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Some(Ok(_)) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(Err(e)) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::debug!(path = %config_file.display(), "No config file, using defaults"),
    }

    // Transport + controller.
    let client = RagClient::from_config(&config.backend)?;
    tracing::info!(base_url = %config.backend.base_url, "RAG backend configured");
    let controller = Arc::new(ConversationController::new(Arc::new(client), &config.chat));

    if let Some(question) = args.question {
        let outcome = controller.submit(&question).await;
        return Ok(match outcome {
            SubmitOutcome::Answered(reply) => {
                println!("{}", render::message(&reply));
                ExitCode::SUCCESS
            }
            SubmitOutcome::Failed(reply) => {
                eprintln!("{}", render::message(&reply));
                ExitCode::FAILURE
            }
            SubmitOutcome::Skipped(_) => {
                eprintln!("{}", render::error("Nothing to ask: the question is empty."));
                ExitCode::FAILURE
            }
        });
    }

    repl::run(controller).await?;
    Ok(ExitCode::SUCCESS)
}
