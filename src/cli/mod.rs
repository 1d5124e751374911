// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod classify;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Frame classifier smoke-run CLI
#[derive(Parser, Debug)]
#[command(name = "frame-classifier")]
#[command(version)]
#[command(about = "Classify image frames with a pretrained AlexNet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify image files in order, one output line per frame
    Classify(classify::ClassifyArgs),

    /// Print the resolved configuration as TOML
    ShowConfig(classify::ConfigArgs),
}

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Classify(args) => classify::classify_frames(args),
        Commands::ShowConfig(args) => classify::show_config(args),
    }
}
