//! Replay command handler: runs a captured response body through the assembler.

use std::fs;
use std::path::Path;

use aerosense_core::chat::StreamAssembler;
use anyhow::{Context, Result};

pub fn run(file: &Path, chunk_size: Option<usize>, show_updates: bool) -> Result<()> {
    let body = fs::read(file).with_context(|| format!("read {}", file.display()))?;
    let chunk_size = match chunk_size {
        Some(0) => anyhow::bail!("--chunk-size must be at least 1"),
        Some(n) => n,
        None => body.len().max(1),
    };

    let mut assembler = StreamAssembler::new();
    let mut updates = Vec::new();
    for chunk in body.chunks(chunk_size) {
        updates.extend(assembler.push(chunk));
        if assembler.saw_done() {
            break;
        }
    }
    updates.extend(assembler.finish());

    tracing::debug!(
        bytes = body.len(),
        chunk_size,
        updates = updates.len(),
        done = assembler.saw_done(),
        "replay finished"
    );

    if show_updates {
        for update in &updates {
            println!("{}", update.text);
        }
    } else {
        println!("{}", assembler.text());
    }
    Ok(())
}
