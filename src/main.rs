mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "context_bank=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let root = cli.root.as_path();
    let project = cli.project.as_deref();

    match cli.command {
        Commands::Hierarchy { save, output, json } => {
            cli::hierarchy(root, save, output, json)?;
        }
        Commands::Link => {
            cli::link(root)?;
        }
        Commands::ScanPatterns => {
            cli::scan_patterns(root, project)?;
        }
        Commands::ExtractPitfalls => {
            cli::extract_pitfalls(root, project)?;
        }
        Commands::ExtractDecisions => {
            cli::extract_decisions(root, project)?;
        }
        Commands::Health { json } => {
            cli::health(root, project, json)?;
        }
        Commands::Validate { json } => {
            cli::validate(root, project, json)?;
        }
        Commands::All => {
            cli::run_all(root, project)?;
        }
        Commands::ListProjects => {
            cli::list_projects(root)?;
        }
        Commands::Promote { kind, content } => {
            cli::promote(root, project, &kind, &content)?;
        }
    }

    Ok(())
}
