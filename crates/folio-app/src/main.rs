//! Folio application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Build the response engine (rule table + knowledge profile)
//! 3. Attach the hosted inference delegate
//! 4. Answer a single `--ask` message, or run the interactive chat loop

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use folio_chat::suggestions::VISIBLE_SUGGESTIONS;
use folio_chat::{suggestions, ChatError, ChatSession, InferenceDelegate, ResponseEngine};
use folio_core::types::{DelegateMode, Role};
use folio_core::FolioConfig;

use crate::cli::CliArgs;

const HELP: &str = "Commands: /mode [pattern|inference], /suggest, /history, /export, /help, /quit";

/// What the chat loop should do with one input line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Help,
    Suggest,
    History,
    Export,
    Mode(Option<DelegateMode>),
    Unknown(String),
    Message(String),
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Message(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    match parts.next().unwrap_or_default() {
        "quit" | "exit" => Command::Quit,
        "help" => Command::Help,
        "suggest" => Command::Suggest,
        "history" => Command::History,
        "export" => Command::Export,
        "mode" => match parts.next() {
            None => Command::Mode(None),
            Some(arg) => match arg.parse::<DelegateMode>() {
                Ok(mode) => Command::Mode(Some(mode)),
                Err(e) => Command::Unknown(e),
            },
        },
        other => Command::Unknown(format!("unknown command '/{}'", other)),
    }
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "folio",
    }
}

async fn write_line<W: AsyncWriteExt + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

/// Interactive chat loop over stdin/stdout.
async fn chat_loop(mut session: ChatSession) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(greeting) = session.transcript().last() {
        write_line(&mut out, &format!("folio> {}", greeting.content)).await?;
    }
    for question in suggestions(VISIBLE_SUGGESTIONS) {
        write_line(&mut out, &format!("  try: {}", question)).await?;
    }
    write_line(&mut out, HELP).await?;

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Help => write_line(&mut out, HELP).await?,
            Command::Suggest => {
                for question in suggestions(usize::MAX) {
                    write_line(&mut out, &format!("  try: {}", question)).await?;
                }
            }
            Command::History => {
                for turn in session.transcript().turns() {
                    let stamp = turn.timestamp.format("%H:%M:%S");
                    let text = format!("[{}] {}> {}", stamp, speaker(turn.role), turn.content);
                    write_line(&mut out, &text).await?;
                }
            }
            Command::Export => {
                write_line(&mut out, &session.transcript().to_json()?).await?;
            }
            Command::Mode(requested) => {
                let mode = match requested {
                    Some(mode) => {
                        session.set_mode(mode);
                        mode
                    }
                    None => session.toggle_mode(),
                };
                write_line(&mut out, &format!("mode: {}", mode)).await?;
            }
            Command::Unknown(reason) => write_line(&mut out, &reason).await?,
            Command::Message(text) => match session.send(&text).await {
                Ok(turn) => {
                    let reply = format!("folio> {}", turn.content);
                    write_line(&mut out, &reply).await?;
                }
                Err(ChatError::EmptyMessage) => {}
                Err(e) => write_line(&mut out, &format!("error: {}", e)).await?,
            },
        }
    }

    tracing::info!(turns = session.transcript().len(), "Chat session ended");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = FolioConfig::load_or_default(&config_file);
    args.apply(&mut config);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Folio v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), mode = %config.chat.mode, "Configuration loaded");

    // Engine. The delegate is always attached so the mode can be toggled at
    // runtime; pattern mode never calls it.
    let delegate = InferenceDelegate::new(&config.inference);
    tracing::info!(endpoint = %delegate.endpoint(), "Inference delegate ready");
    let engine = ResponseEngine::from_config(&config)?.with_delegate(Arc::new(delegate));

    let mut session = ChatSession::from_config(engine, &config.chat);

    if let Some(ref message) = args.ask {
        let turn = session.send(message).await?;
        println!("{}", turn.content);
        return Ok(());
    }

    chat_loop(session).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_message() {
        assert_eq!(
            parse_command("tell me about aws"),
            Command::Message("tell me about aws".to_string())
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("  /exit "), Command::Quit);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/suggest"), Command::Suggest);
        assert_eq!(parse_command("/history"), Command::History);
        assert_eq!(parse_command("/export"), Command::Export);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_command("/mode"), Command::Mode(None));
        assert_eq!(
            parse_command("/mode inference"),
            Command::Mode(Some(DelegateMode::Inference))
        );
        assert!(matches!(parse_command("/mode webllm"), Command::Unknown(_)));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_command("/dance"),
            Command::Unknown("unknown command '/dance'".to_string())
        );
        assert!(matches!(parse_command("/"), Command::Unknown(_)));
    }

    #[test]
    fn test_speaker_labels() {
        assert_eq!(speaker(Role::User), "you");
        assert_eq!(speaker(Role::Assistant), "folio");
    }
}
