//! Command-line interface for Foodgram

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Foodgram - recipe sharing service
#[derive(Parser)]
#[command(name = "foodgram")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Load ingredients from a JSON array of {name, measurement_unit}
    ImportIngredients {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Create a tag
    AddTag {
        #[arg(long)]
        name: String,
        /// Hex color such as #E26C2D
        #[arg(long)]
        color: String,
        #[arg(long)]
        slug: String,
    },
}

pub use commands::*;
