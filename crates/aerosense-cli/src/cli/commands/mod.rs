pub mod chat;
pub mod config;
pub mod exec;
pub mod replay;

use aerosense_core::chat::ChatClient;
use aerosense_core::config::{ChatOverrides, Config};
use anyhow::{Context, Result};

fn build_client(config: &Config, overrides: &ChatOverrides) -> Result<ChatClient> {
    let client_config = config
        .chat_client_config(overrides)
        .context("resolve chat backend")?;
    Ok(ChatClient::new(client_config))
}
