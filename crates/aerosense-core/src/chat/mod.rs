//! Conversational assistant: transcript, stream assembly, and the chat client.

mod assembler;
mod client;
mod error;
pub mod frame;
mod message;
mod session;
mod stream;
mod utf8;

pub use assembler::{AssistantUpdate, StreamAssembler};
pub use client::{CHAT_PATH, ChatClient, ChatClientConfig, USER_AGENT};
pub use error::{ChatError, ChatErrorKind, ChatResult};
pub use frame::Frame;
pub use message::{DEFAULT_GREETING, Message, Role, Transcript};
pub use session::{ChatSession, SessionState, TurnOutcome};
pub use stream::{AssistantStream, UpdateStream};
pub use utf8::Utf8Decoder;
