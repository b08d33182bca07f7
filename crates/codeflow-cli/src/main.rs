//! Codeflow CLI - Command-line interface for Codeflow
//!
//! Builds architecture graphs from symbol index snapshots and renders
//! them as Mermaid flowcharts or JSON.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{BuildOptions, OutputFormat};

#[derive(Parser)]
#[command(name = "codeflow")]
#[command(author = "Codeflow Contributors")]
#[command(version)]
#[command(about = "Architecture graphs for dependency-injection codebases", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Codeflow in the current directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Build the architecture graph from an index snapshot
    Build {
        /// Index snapshot (JSON)
        snapshot: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Mermaid)]
        format: OutputFormat,

        /// Write the graph to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (defaults to .codeflow/config.json when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Keep test classes in the output
        #[arg(long)]
        show_tests: bool,

        /// Keep configuration classes in the output
        #[arg(long)]
        show_config: bool,
    },

    /// List the resolved component markers
    Markers {
        /// Index snapshot (JSON)
        snapshot: PathBuf,

        /// Config file (defaults to .codeflow/config.json when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show graph statistics
    Status {
        /// Index snapshot (JSON)
        snapshot: PathBuf,

        /// Config file (defaults to .codeflow/config.json when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Build {
            snapshot,
            format,
            output,
            config,
            show_tests,
            show_config,
        } => commands::build(
            &snapshot,
            &BuildOptions {
                format,
                output,
                config,
                show_tests,
                show_config,
            },
        ),
        Commands::Markers { snapshot, config } => commands::markers(&snapshot, config.as_deref()),
        Commands::Status { snapshot, config } => commands::status(&snapshot, config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
