//! Line-oriented chat loop for a terminal.

use std::io::{self, Write};

use aerosense_core::chat::{ChatClient, ChatSession, TurnOutcome};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::ReplyPrinter;
use crate::interrupt;

const EXIT_COMMANDS: [&str; 2] = ["/exit", "/quit"];

/// Runs the chat loop until EOF or `/exit`.
///
/// Ctrl+C while a reply streams cancels that reply; the partial text stays
/// in the conversation.
pub async fn run_interactive_chat(client: ChatClient, greeting: Option<&str>) -> Result<()> {
    let mut session = ChatSession::new(client, greeting);
    let mut stdout = io::stdout();
    if let Some(text) = greeting {
        writeln!(stdout, "{text}").context("write greeting")?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(stdout, "> ")
            .and_then(|()| stdout.flush())
            .context("write prompt")?;

        let Some(line) = lines.next_line().await.context("read input")? else {
            writeln!(stdout).context("write newline")?;
            break;
        };
        let input = line.trim();
        if EXIT_COMMANDS.contains(&input) {
            break;
        }
        if input.is_empty() {
            continue;
        }

        let turn = interrupt::begin_turn();
        let mut printer = ReplyPrinter::new(io::stdout());
        let result = session
            .submit(&line, turn.token(), |update| {
                printer.print(&update.fragment, turn.token());
            })
            .await;
        drop(turn);
        printer.finish().context("write reply to stdout")?;

        match result {
            Ok(TurnOutcome::Completed { .. } | TurnOutcome::Skipped) => {}
            Ok(TurnOutcome::Cancelled { .. }) => {
                writeln!(stdout, "[cancelled]").context("write cancel marker")?;
            }
            Err(err) => {
                tracing::debug!(kind = %err.kind, %err, "chat turn failed");
                eprintln!("{}", err.notification());
            }
        }
    }

    Ok(())
}
