//! One conversation: transcript ownership and the per-turn streaming loop.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use super::assembler::AssistantUpdate;
use super::client::ChatClient;
use super::error::ChatResult;
use super::message::Transcript;

/// Lifecycle of the most recent turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No turn submitted yet
    #[default]
    Idle,
    /// Request sent, waiting for the response status
    Requesting,
    /// Reply is streaming into the transcript
    Streaming,
    /// Sentinel seen or body ended
    Finished,
    /// Request rejected or body failed mid-stream
    Failed,
    /// Caller cancelled the turn
    Cancelled,
}

/// Result of a turn that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The reply streamed to completion.
    Completed { reply: String },
    /// The caller cancelled; `partial` is what arrived before that.
    Cancelled { partial: String },
    /// Blank input; nothing was sent.
    Skipped,
}

/// A conversation with the assistant.
///
/// `submit` borrows the session mutably, so a second turn cannot start while
/// one is streaming.
pub struct ChatSession {
    client: ChatClient,
    transcript: Transcript,
    state: SessionState,
}

impl ChatSession {
    /// Creates a session, optionally opening with an assistant greeting.
    pub fn new(client: ChatClient, greeting: Option<&str>) -> Self {
        let transcript = match greeting {
            Some(text) if !text.trim().is_empty() => Transcript::with_greeting(text),
            _ => Transcript::new(),
        };
        Self::with_transcript(client, transcript)
    }

    pub fn with_transcript(client: ChatClient, transcript: Transcript) -> Self {
        Self {
            client,
            transcript,
            state: SessionState::Idle,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Sends `input` as a user turn and streams the reply into the transcript.
    ///
    /// `on_update` runs after each fragment is mirrored into the transcript.
    /// Cancelling `cancel` stops reading; text received so far is kept.
    ///
    /// # Errors
    /// Returns the request-level or transport `ChatError`. The user message
    /// and any partial reply stay in the transcript.
    pub async fn submit<F>(
        &mut self,
        input: &str,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> ChatResult<TurnOutcome>
    where
        F: FnMut(&AssistantUpdate),
    {
        if input.trim().is_empty() {
            return Ok(TurnOutcome::Skipped);
        }

        self.transcript.push_user(input);
        self.state = SessionState::Requesting;

        let request = self.client.send_stream(self.transcript.messages());
        let mut updates = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                self.state = SessionState::Cancelled;
                return Ok(TurnOutcome::Cancelled { partial: String::new() });
            }
            result = request => match result {
                Ok(updates) => updates,
                Err(err) => {
                    self.state = SessionState::Failed;
                    return Err(err);
                }
            },
        };

        self.state = SessionState::Streaming;
        let mut reply = String::new();
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!(chars = reply.len(), "chat turn cancelled");
                    self.state = SessionState::Cancelled;
                    return Ok(TurnOutcome::Cancelled { partial: reply });
                }
                next = updates.next() => next,
            };

            match next {
                Some(Ok(update)) => {
                    self.transcript.extend_assistant(&update.fragment);
                    on_update(&update);
                    reply = update.text;
                }
                Some(Err(err)) => {
                    tracing::warn!(%err, "chat stream failed");
                    self.state = SessionState::Failed;
                    return Err(err);
                }
                None => break,
            }
        }

        tracing::info!(chars = reply.len(), "chat turn completed");
        self.state = SessionState::Finished;
        Ok(TurnOutcome::Completed { reply })
    }
}
