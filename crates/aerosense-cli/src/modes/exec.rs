//! One-shot mode: send a single prompt and stream the reply to stdout.

use std::io;

use aerosense_core::chat::{ChatClient, ChatSession, TurnOutcome};
use anyhow::{Context, Result};

use super::ReplyPrinter;
use crate::interrupt::{self, InterruptedError};

/// Sends `prompt` and prints reply fragments as they arrive.
///
/// Failures carry the user-facing notification as their outermost context.
/// A closed stdout stops the turn and is reported as the failure.
pub async fn run_exec(prompt: &str, client: ChatClient, greeting: Option<&str>) -> Result<()> {
    let mut session = ChatSession::new(client, greeting);
    let turn = interrupt::begin_turn();

    let mut printer = ReplyPrinter::new(io::stdout());
    let result = session
        .submit(prompt, turn.token(), |update| {
            printer.print(&update.fragment, turn.token());
        })
        .await;
    printer.finish().context("write reply to stdout")?;

    match result {
        Ok(TurnOutcome::Completed { .. }) => Ok(()),
        Ok(TurnOutcome::Cancelled { .. }) => Err(InterruptedError.into()),
        Ok(TurnOutcome::Skipped) => anyhow::bail!("Prompt is empty"),
        Err(err) => {
            let notification = err.notification();
            Err(anyhow::Error::new(err).context(notification))
        }
    }
}
