//! `flowdeck`: manage, inspect and run flows from the terminal.

mod commands;

use clap::{Parser, Subcommand};
use flowdeck_client::{ClientConfig, HttpFlowService, Workbench};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file read before `FLOWDECK__*` environment variables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the block catalog by category
    Blocks,
    /// List stored flows
    List,
    /// Print a flow's nodes, edges and problems
    Show { id: String },
    /// Store a new flow, empty or from a graph file
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Graph model JSON to store
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a flow
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Run a stored flow and print a summary
    Run { id: String },
    /// Generate a flow from a description of what it should do
    Magic {
        #[arg(required = true, num_args = 1..)]
        goal: Vec<String>,
    },
    /// List flow templates
    Templates,
    /// Copy a template into a new flow
    ImportTemplate { id: String },
    /// Check a graph file against the built-in blocks and config schemas
    Validate { file: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, commands::Failure> {
    if let Command::Validate { file } = &cli.command {
        return commands::validate(file);
    }

    let config = match cli.config.as_deref() {
        Some(path) => ClientConfig::load(Some(path))?,
        None => ClientConfig::from_env()?,
    };
    tracing::debug!(base_url = %config.base_url, "Loaded configuration");
    let service = HttpFlowService::new(&config)?;
    let mut workbench = Workbench::new(Arc::new(service));

    match cli.command {
        Command::Blocks => commands::blocks(&mut workbench).await,
        Command::List => commands::list(&workbench).await,
        Command::Show { id } => commands::show(&mut workbench, &id).await,
        Command::Create {
            name,
            description,
            file,
        } => commands::create(&mut workbench, &name, &description, file.as_deref()).await,
        Command::Delete { id, yes } => commands::delete(&workbench, &id, yes).await,
        Command::Run { id } => commands::run(&workbench, &id).await,
        Command::Magic { goal } => commands::magic(&mut workbench, &goal.join(" ")).await,
        Command::Templates => commands::templates(&workbench).await,
        Command::ImportTemplate { id } => commands::import_template(&mut workbench, &id).await,
        Command::Validate { file } => commands::validate(&file),
    }
}
