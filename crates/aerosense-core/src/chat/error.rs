//! Request-level and transport failures of a chat turn.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of chat failures surfaced to the caller.
///
/// Malformed individual event lines are not errors; the assembler skips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatErrorKind {
    /// HTTP 429 on the initial request
    RateLimited,
    /// HTTP 402 on the initial request
    PaymentRequired,
    /// Any other non-2xx status, or the request could not be sent
    Failed,
    /// The response body failed after streaming began
    Transport,
}

impl ChatErrorKind {
    /// Single user-visible line describing this failure.
    pub fn notification(self) -> &'static str {
        match self {
            ChatErrorKind::RateLimited => "Rate limits exceeded, please try again later.",
            ChatErrorKind::PaymentRequired => "Payment required. Please add credits to continue.",
            ChatErrorKind::Failed | ChatErrorKind::Transport => {
                "Failed to send message. Please try again."
            }
        }
    }

    fn from_status(status: u16) -> Self {
        match status {
            429 => ChatErrorKind::RateLimited,
            402 => ChatErrorKind::PaymentRequired,
            _ => ChatErrorKind::Failed,
        }
    }
}

impl fmt::Display for ChatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatErrorKind::RateLimited => write!(f, "rate_limited"),
            ChatErrorKind::PaymentRequired => write!(f, "payment_required"),
            ChatErrorKind::Failed => write!(f, "failed"),
            ChatErrorKind::Transport => write!(f, "transport"),
        }
    }
}

/// Structured chat failure with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatError {
    /// Error category
    pub kind: ChatErrorKind,
    /// One-line summary for logs
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Classifies a non-2xx response status.
    pub fn http_status(status: u16, body: &str) -> Self {
        let kind = ChatErrorKind::from_status(status);
        if body.trim().is_empty() {
            return Self::new(kind, format!("HTTP {status}"));
        }

        let message = match error_message_from_body(body) {
            Some(msg) => format!("HTTP {status}: {msg}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind,
            message,
            details: Some(body.to_string()),
        }
    }

    /// Creates a failure for a request that never produced a response.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Failed, message)
    }

    /// Creates a mid-stream transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Transport, message)
    }

    pub fn notification(&self) -> &'static str {
        self.kind.notification()
    }
}

/// Pulls a readable message out of `{"error": "..."}` or `{"error": {"message": "..."}}`.
fn error_message_from_body(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    let error = json.get("error")?;
    error
        .as_str()
        .or_else(|| error.get("message").and_then(|v| v.as_str()))
        .map(str::to_string)
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ChatError {}

/// Result type for chat operations.
pub type ChatResult<T> = std::result::Result<T, ChatError>;
