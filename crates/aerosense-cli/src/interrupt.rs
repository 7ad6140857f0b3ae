//! Ctrl+C handling: cancels the reply in flight, or exits when idle.

use std::sync::Mutex;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

static ACTIVE_TURN: Mutex<Option<CancellationToken>> = Mutex::new(None);

#[derive(Debug)]
pub struct InterruptedError;

impl std::fmt::Display for InterruptedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interrupted")
    }
}

impl std::error::Error for InterruptedError {}

/// Installs the Ctrl+C handler.
///
/// The first Ctrl+C during a reply cancels that reply. Ctrl+C with no reply
/// in flight, or a second Ctrl+C, exits with status 130.
pub fn init() -> Result<()> {
    ctrlc::set_handler(trigger_ctrl_c).context("set Ctrl+C handler")
}

fn trigger_ctrl_c() {
    let active = ACTIVE_TURN.lock().ok().and_then(|guard| guard.clone());
    match active {
        Some(token) if !token.is_cancelled() => token.cancel(),
        _ => std::process::exit(130),
    }
}

/// Registers a cancellation token for the turn about to start.
///
/// The token is unregistered when the returned guard drops.
pub fn begin_turn() -> TurnGuard {
    let token = CancellationToken::new();
    if let Ok(mut guard) = ACTIVE_TURN.lock() {
        *guard = Some(token.clone());
    }
    TurnGuard { token }
}

pub struct TurnGuard {
    token: CancellationToken,
}

impl TurnGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if let Ok(mut guard) = ACTIVE_TURN.lock() {
            *guard = None;
        }
    }
}
