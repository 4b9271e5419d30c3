use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use crate::cli::ChatArgs;
use crate::config::CliConfig;
use crate::output::OutputFormat;
use crate::output::json::print_json;
use chatbench_core::{
    HttpTransport, PresetClient, SessionController, SessionEvent, SessionStatus,
};
use chatbench_models::{GenerationParameters, Message};

pub async fn run(
    server_url: &str,
    config: &CliConfig,
    args: ChatArgs,
    format: OutputFormat,
) -> Result<()> {
    let mut params = match args.preset.as_deref().or(config.default_preset.as_deref()) {
        Some(name) => {
            PresetClient::new(server_url)
                .find(name)
                .await
                .ok_or_else(|| anyhow!("Preset not found: {}", name))?
                .params
        }
        None => GenerationParameters::default(),
    };
    args.params.apply(&mut params);
    params.validate()?;

    let mut prior = match &args.transcript {
        Some(path) => load_messages(path)?,
        None => Vec::new(),
    };
    let message = match args.message {
        Some(message) => message,
        None => read_stdin()?,
    };
    if message.trim().is_empty() {
        bail!("Nothing to send: the message is empty");
    }
    prior.push(Message::user(message));

    let controller = SessionController::new(Arc::new(HttpTransport::new(server_url)));
    let printer = (!format.is_json()).then(|| spawn_printer(&controller));

    let session = controller.start_with(prior, params);
    tokio::pin!(session);
    let result = tokio::select! {
        result = &mut session => result,
        _ = tokio::signal::ctrl_c() => {
            if let Err(e) = controller.abort_session().await {
                tracing::debug!(error = %e, "Nothing to abort");
            }
            session.await
        }
    };

    if let Some(printer) = printer {
        if result.is_ok() {
            let _ = printer.await;
        } else {
            printer.abort();
        }
        println!();
    }
    let outcome = result?;

    if let Some(path) = &args.save {
        save_messages(path, &controller.messages())?;
    }

    if format.is_json() {
        return print_json(&json!({
            "status": outcome.status,
            "content": outcome.content,
            "chunks": outcome.chunks,
            "messages": controller.messages(),
        }));
    }

    if outcome.status == SessionStatus::Aborted {
        eprintln!("{}", "[aborted]".yellow());
    }
    if let Some(path) = &args.save {
        eprintln!("{} {}", "Transcript saved to".dimmed(), path.display());
    }
    Ok(())
}

/// Print chunks as they arrive until the session ends.
fn spawn_printer(controller: &SessionController) -> tokio::task::JoinHandle<()> {
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        let mut stdout = io::stdout();
        loop {
            match events.recv().await {
                Ok(SessionEvent::Chunk { text, .. }) => {
                    let _ = write!(stdout, "{text}");
                    let _ = stdout.flush();
                }
                Ok(SessionEvent::Started { .. }) => {}
                Ok(_) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Output fell behind the stream");
                }
            }
        }
    })
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read message from stdin")?;
    Ok(input)
}

/// Read a transcript file, keeping only the conversation rows.
pub fn load_messages(path: &Path) -> Result<Vec<Message>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript {}", path.display()))?;
    let messages: Vec<Message> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse transcript {}", path.display()))?;
    Ok(chatbench_core::Transcript::from_messages(messages).conversation())
}

pub fn save_messages(path: &Path, messages: &[Message]) -> Result<()> {
    let content = serde_json::to_string_pretty(messages)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write transcript {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn saved_transcript_loads_without_system_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.json");
        let messages = vec![
            Message::system("be nice"),
            Message::user("Hi"),
            Message::assistant("Hello!"),
        ];

        save_messages(&path, &messages).unwrap();
        let loaded = load_messages(&path).unwrap();

        assert_eq!(loaded, messages[1..].to_vec());
    }

    #[test]
    fn malformed_transcript_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.json");
        std::fs::write(&path, "{\"role\": \"user\"}").unwrap();

        let err = load_messages(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse transcript"));
    }
}
