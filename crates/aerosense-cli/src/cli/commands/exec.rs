//! Exec command handler.

use aerosense_core::config::{ChatOverrides, Config};
use anyhow::Result;

use crate::modes;

pub async fn run(prompt: &str, config: &Config, overrides: &ChatOverrides) -> Result<()> {
    let client = super::build_client(config, overrides)?;
    modes::exec::run_exec(prompt, client, config.greeting()).await
}
