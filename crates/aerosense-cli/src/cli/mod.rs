//! CLI entry and dispatch.

use std::path::PathBuf;

use aerosense_core::config::{self, ChatOverrides};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::interrupt;

mod commands;

#[derive(Parser)]
#[command(name = "aerosense")]
#[command(version)]
#[command(about = "AeroSense fleet assistant in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Chat backend base URL (overrides AEROSENSE_BASE_URL and config)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Bearer key for the chat backend (overrides config and AEROSENSE_API_KEY)
    #[arg(long, global = true, value_name = "KEY")]
    api_key: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start an interactive chat (default)
    Chat,
    /// Send one prompt and print the reply
    Exec {
        /// The prompt to send to the assistant
        #[arg(short, long)]
        prompt: String,
    },
    /// Assemble a captured event-stream body offline
    Replay {
        /// File holding the raw response body
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Feed the body in chunks of this many bytes (default: whole file)
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<usize>,

        /// Print the running text after every update
        #[arg(long)]
        updates: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Create a default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    interrupt::init()?;

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        base_url,
        api_key,
    } = cli;
    let overrides = ChatOverrides { base_url, api_key };

    // default to chat mode
    match command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = load_config()?;
            commands::chat::run(&config, &overrides).await
        }
        Commands::Exec { prompt } => {
            let config = load_config()?;
            commands::exec::run(&prompt, &config, &overrides).await
        }
        Commands::Replay {
            file,
            chunk_size,
            updates,
        } => {
            init_logging(config::Config::DEFAULT_LOG_LEVEL);
            commands::replay::run(&file, chunk_size, updates)
        }
        Commands::Config { command } => {
            init_logging(config::Config::DEFAULT_LOG_LEVEL);
            match command {
                ConfigCommands::Path => {
                    commands::config::path();
                    Ok(())
                }
                ConfigCommands::Init => commands::config::init(),
            }
        }
    }
}

/// Loads config for commands that talk to the backend, then starts logging
/// with its level.
fn load_config() -> Result<config::Config> {
    let config = config::Config::load().context("load config")?;
    init_logging(&config.log_level);
    Ok(config)
}

/// Logs go to stderr so stdout carries only the reply.
///
/// `AEROSENSE_LOG` wins over `level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(config::LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(config::Config::DEFAULT_LOG_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
