mod commands;

pub use commands::*;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "context-bank")]
#[command(about = "Keep a file-based project context store in sync with its repositories")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Map nested repositories under the current directory
    context-bank hierarchy --save

    # Run every maintenance task for one project of a multi-project store
    context-bank --project api all

    # Score the store and print the report as JSON
    context-bank health --json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository (or scan) root
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Project inside a multi-project store
    #[arg(long, global = true)]
    pub project: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect nested repositories and their context stores
    Hierarchy {
        /// Write hierarchy.json
        #[arg(long)]
        save: bool,

        /// Explicit output path for --save
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the map as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write hierarchy links into child context stores
    Link,

    /// Discover reusable code patterns
    ScanPatterns,

    /// Extract issue/solution pairs from the progress log
    ExtractPitfalls,

    /// Mine decisions from version-control history
    ExtractDecisions,

    /// Score store freshness and completeness
    Health {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the store's directory layout
    Validate {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run every maintenance task
    All,

    /// List projects of a multi-project store
    ListProjects,

    /// Append a pattern to the shared patterns document
    Promote {
        /// Section title
        kind: String,

        /// Section content
        content: String,
    },
}
