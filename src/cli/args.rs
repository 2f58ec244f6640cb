//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Inspect hierarchical cluster forests stored as line-delimited JSON
#[derive(Parser, Debug)]
#[command(name = "clustree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Period for weights and sentiment (overrides config)
    #[arg(short, long, global = true)]
    pub period: Option<String>,

    /// Config file (TOML)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize levels and roots
    Info {
        /// Record file (one JSON object per line)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show forest as tree
    Tree {
        /// Record file (one JSON object per line)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// List root clusters
    Roots {
        /// Record file (one JSON object per line)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// List leaf clusters
    Leaves {
        /// Record file (one JSON object per line)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show details of one cluster
    Node {
        /// Record file (one JSON object per line)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Level of the cluster
        #[arg(allow_negative_numbers = true)]
        level: i64,
        /// Cluster id within the level
        #[arg(allow_negative_numbers = true)]
        level_id: i64,
    },

    /// Show effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
