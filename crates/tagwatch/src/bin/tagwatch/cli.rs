//! CLI definitions for tagwatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "tagwatch",
    version,
    about = "OPC UA process-value monitor",
    infer_subcommands = true,
    after_help = "Examples:\n  tagwatch                              # interactive monitor\n  tagwatch monitor --source loopback    # monitor against the echo driver\n  tagwatch write --tag Voltage 230      # one-shot manual write\n  tagwatch list --json                  # sweep once, dump the tag table"
)]
pub struct Cli {
    /// Show verbose logging (RUST_LOG overrides).
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Configuration file (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive terminal UI with periodic polling (the default).
    Monitor {
        /// Server endpoint override.
        #[arg(long)]
        endpoint: Option<String>,
        /// Poll interval override in milliseconds.
        #[arg(long)]
        interval: Option<u64>,
        /// Data-source driver override (simulated, loopback).
        #[arg(long)]
        source: Option<String>,
    },
    /// Run one sweep and print the tag table.
    List {
        /// Server endpoint override.
        #[arg(long)]
        endpoint: Option<String>,
        /// Data-source driver override.
        #[arg(long)]
        source: Option<String>,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Run one sweep and print a single tag.
    Read {
        /// Tag name.
        tag: String,
        /// Server endpoint override.
        #[arg(long)]
        endpoint: Option<String>,
        /// Data-source driver override.
        #[arg(long)]
        source: Option<String>,
        /// Emit JSON instead of a line.
        #[arg(long)]
        json: bool,
    },
    /// Write a value to a tag (puts it into WRITTEN mode).
    Write {
        /// Tag name.
        #[arg(long)]
        tag: String,
        /// New value (decimal).
        value: String,
        /// Server endpoint override.
        #[arg(long)]
        endpoint: Option<String>,
        /// Data-source driver override.
        #[arg(long)]
        source: Option<String>,
    },
    /// Validate a configuration file.
    Validate,
}
