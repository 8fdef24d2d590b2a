use crate::core::edits::CellEdit;
use crate::core::trigger::{decode_push, TriggerError, TriggerMessage};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Keeps a Performance Max spreadsheet and Google Ads in sync.
#[derive(Debug, Parser)]
#[command(name = "pmax-sheet-sync", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute one message directly, e.g. `UPLOAD` or `REFRESH_ASSETS`.
    Run { message: String },

    /// Execute a Pub/Sub push envelope read from a file (`-` for stdin).
    Event { file: PathBuf },

    /// Publish a message to the configured topic.
    Publish { message: String },

    /// Pull the configured subscription and handle messages until stopped.
    Listen {
        /// Messages per pull, between 1 and 1000.
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=1000))]
        max_messages: u32,
    },

    /// Process one cell edit.
    Edit {
        #[arg(long)]
        sheet: String,
        /// 1-based sheet row.
        #[arg(long)]
        row: usize,
        /// 1-based column.
        #[arg(long)]
        column: usize,
        #[arg(long, default_value = "")]
        old_value: String,
        #[arg(long)]
        value: String,
    },
}

impl Command {
    /// Message for the commands that handle one message in-process.
    pub async fn message(&self) -> anyhow::Result<Option<TriggerMessage>> {
        let message = match self {
            Command::Run { message } => TriggerMessage::parse(message)?,
            Command::Event { file } => {
                let body = read_event(file).await?;
                decode_push(&body).context("Invalid push envelope")?
            }
            Command::Edit {
                sheet,
                row,
                column,
                old_value,
                value,
            } => TriggerMessage::Edit(CellEdit {
                sheet: sheet.clone(),
                row: *row,
                column: *column,
                old_value: old_value.clone(),
                new_value: value.clone(),
                row_values: None,
            }),
            Command::Publish { .. } | Command::Listen { .. } => return Ok(None),
        };
        Ok(Some(message))
    }
}

/// Validates a message before it is published and returns its wire form.
pub fn publishable(message: &str) -> Result<String, TriggerError> {
    TriggerMessage::parse(message)?.encode()
}

async fn read_event(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        tokio::io::stdin().read_to_string(&mut body).await?;
        return Ok(body);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
