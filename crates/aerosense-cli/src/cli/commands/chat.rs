//! Chat command handler.

use std::io::{IsTerminal, Read};

use aerosense_core::config::{ChatOverrides, Config};
use anyhow::{Context, Result};

use super::exec;
use crate::modes;

pub async fn run(config: &Config, overrides: &ChatOverrides) -> Result<()> {
    // If stdin is piped, run exec mode instead
    if !std::io::stdin().is_terminal() {
        let mut prompt = String::new();
        std::io::stdin().lock().read_to_string(&mut prompt)?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            anyhow::bail!("No input provided via pipe");
        }
        return exec::run(prompt, config, overrides).await;
    }

    let client = super::build_client(config, overrides)?;
    modes::run_interactive_chat(client, config.greeting())
        .await
        .context("interactive chat failed")
}
