//! Interactive terminal session.
//!
//! Reads lines from stdin, dispatches slash commands to the controller and
//! sends everything else as a question. Questions run on a spawned task so
//! commands keep working while an answer is pending.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use ragchat_chat::{ConversationController, SkipReason, SubmitOutcome};

use crate::command::{Command, HELP};
use crate::render;

/// Run until `/quit` or end of input.
pub async fn run(controller: Arc<ConversationController>) -> std::io::Result<()> {
    for msg in controller.transcript() {
        println!("{}\n", render::message(&msg));
    }
    println!(
        "{}",
        render::notice(&format!(
            "Backend: {}. Type /help for commands.",
            controller.base_url()
        ))
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Vec<JoinHandle<()>> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Ask(question) => {
                if question.trim().is_empty() {
                    continue;
                }
                pending.retain(|handle| !handle.is_finished());
                pending.push(ask(Arc::clone(&controller), question));
            }
            Command::Help => println!("{}", HELP),
            Command::Clear => {
                controller.clear_conversation();
                for msg in controller.transcript() {
                    println!("{}\n", render::message(&msg));
                }
            }
            Command::ClearContext => {
                controller.clear_context();
                println!("{}", render::notice("Context cleared."));
            }
            Command::Context(None) => println!("{}", render::parameters(&controller.parameters())),
            Command::Context(Some(text)) => {
                controller.set_context(text);
                println!("{}", render::notice("Context updated."));
            }
            Command::Model(None) => println!("model: {}", controller.parameters().model),
            Command::Model(Some(name)) => match controller.set_model(&name) {
                Ok(()) => println!("{}", render::notice(&format!("Model set to {}.", name))),
                Err(e) => println!("{}", render::error(&e.to_string())),
            },
            Command::Temperature(value) => match controller.set_temperature(value) {
                Ok(stored) => {
                    println!("{}", render::notice(&format!("Temperature set to {}.", stored)))
                }
                Err(e) => println!("{}", render::error(&e.to_string())),
            },
            Command::Models => match controller.available_models().await {
                Ok(models) => println!("{}", render::models(&models)),
                Err(e) => println!("{}", render::error(&e.to_string())),
            },
            Command::Health => match controller.backend_health().await {
                Ok(health) => println!("{}", render::health(&health)),
                Err(e) => println!("{}", render::error(&e.to_string())),
            },
            Command::Params => println!("{}", render::parameters(&controller.parameters())),
            Command::Quit => break,
            Command::Invalid(reason) => println!("{}", render::error(&reason)),
        }
    }

    if pending.iter().any(|handle| !handle.is_finished()) {
        println!("{}", render::notice("Waiting for the pending answer..."));
    }
    for handle in pending {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Question task failed");
        }
    }
    Ok(())
}

/// Submit `question` in the background and print whatever it appends.
fn ask(controller: Arc<ConversationController>, question: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        match controller.submit(&question).await {
            SubmitOutcome::Skipped(SkipReason::RequestInFlight) => println!(
                "{}",
                render::notice("Still waiting for the previous answer; try again shortly.")
            ),
            SubmitOutcome::Skipped(SkipReason::EmptyInput) => {}
            SubmitOutcome::Answered(reply) | SubmitOutcome::Failed(reply) => {
                println!("\n{}\n", render::message(&reply))
            }
        }
    })
}
