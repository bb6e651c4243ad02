use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "paramtree")]
#[command(about = "Inspect categorized parameter trees")]
#[command(version)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.paramtree)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Order {
    /// Depth-first, pre-order
    Dfs,
    /// Breadth-first, level order
    Bfs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render every root of a layout as a tree
    Tree {
        /// Layout file (TOML)
        layout: PathBuf,

        /// Print the snapshot as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Show the ancestor chain of a category
    Ancestors {
        /// Layout file (TOML)
        layout: PathBuf,

        /// Category key
        key: String,
    },

    /// Show the items visible from a category (closest wins)
    Resolve {
        /// Layout file (TOML)
        layout: PathBuf,

        /// Category key
        key: String,

        /// Only list active items
        #[arg(long)]
        active_only: bool,
    },

    /// Search categories below a starting point
    Search {
        /// Layout file (TOML)
        layout: PathBuf,

        /// Start from this category key (default: every root)
        #[arg(long)]
        from: Option<String>,

        /// Traversal order (default: from config)
        #[arg(long, value_enum)]
        order: Option<Order>,

        /// Label must contain this text
        #[arg(long)]
        label: Option<String>,

        /// Description must contain this text
        #[arg(long)]
        description: Option<String>,

        /// Only root categories
        #[arg(long, conflicts_with = "leaves")]
        roots: bool,

        /// Only leaf categories
        #[arg(long)]
        leaves: bool,

        /// Category must hold an item with this label
        #[arg(long, value_name = "ITEM")]
        has_item: Option<String>,
    },

    /// Build a layout and report whether it is valid
    Check {
        /// Layout file (TOML)
        layout: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., values.allowed)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., values.allowed)
        key: String,

        /// Value to set (e.g., "text,number" or "[text, number]")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}
