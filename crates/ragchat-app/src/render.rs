//! Terminal rendering of transcript messages and parameters.

use chrono::Local;
use colored::Colorize;

use ragchat_core::types::{HealthResponse, Message, ModelsResponse, Parameters, Source};

/// Longest source snippet shown, in characters.
const SNIPPET_CHARS: usize = 160;

/// Render one transcript entry: header line, content, then sources.
pub fn message(msg: &Message) -> String {
    let author = if msg.is_user {
        "You".bold().cyan()
    } else {
        "Assistant".bold().green()
    };

    let mut meta = vec![msg
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string()];
    if let Some(ref model) = msg.model {
        meta.push(model.clone());
    }
    if let Some(temperature) = msg.temperature {
        meta.push(format!("t={}", temperature));
    }
    if let Some(ms) = msg.processing_time_ms {
        meta.push(format_duration(ms));
    }

    let mut out = format!("{} {}\n{}", author, meta.join(" · ").dimmed(), msg.content);

    let sources = msg.sources();
    if !sources.is_empty() {
        out.push_str(&format!("\n{}", "Sources:".bold()));
        for (i, source) in sources.iter().enumerate() {
            out.push('\n');
            out.push_str(&self::source(i + 1, source));
        }
    }
    out
}

/// Render a numbered citation with a truncated snippet.
pub fn source(index: usize, source: &Source) -> String {
    format!(
        "  [{}] {} {}\n      {}",
        index,
        source.title.yellow(),
        format!("(score {:.2})", source.score).dimmed(),
        truncate(&source.content, SNIPPET_CHARS)
    )
}

pub fn parameters(params: &Parameters) -> String {
    let context = if params.context.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        params.context.clone()
    };
    format!(
        "model: {}\ntemperature: {}\ncontext: {}",
        params.model, params.temperature, context
    )
}

pub fn models(models: &ModelsResponse) -> String {
    models
        .models
        .iter()
        .map(|m| {
            if *m == models.default {
                format!("  {} {}", m, "(default)".dimmed())
            } else {
                format!("  {}", m)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn health(health: &HealthResponse) -> String {
    let status = if health.is_healthy() {
        health.status.green()
    } else {
        health.status.red()
    };
    if health.service.is_empty() {
        format!("backend: {}", status)
    } else {
        format!("{}: {}", health.service, status)
    }
}

pub fn notice(text: &str) -> String {
    text.dimmed().to_string()
}

pub fn error(text: &str) -> String {
    text.red().to_string()
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{} ms", ms)
    } else {
        format!("{:.1} s", ms as f64 / 1000.0)
    }
}

/// Cut `text` to at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}
