//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};
use contacts_core::TabKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Data directory holding contacts and settings
    #[arg(short, long)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the contents of one tab
    List {
        /// Tab to print; defaults to the configured default tab
        #[arg(short, long)]
        tab: Option<TabKind>,
        /// Only show entries matching this query
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Import contacts from a path, file:// or content:// locator
    Import {
        locator: String,
    },
    /// Export contacts to a file
    Export {
        /// Destination file
        output: PathBuf,
        /// Leave out contacts from this source (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,
    },
    /// Show settings and contact store status
    Status,
    /// Start an interactive browsing session
    Interactive {
        /// Locator to import once the session has started
        #[arg(short, long)]
        open: Option<String>,
    },
}
