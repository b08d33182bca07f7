//! CLI command implementations.

use clap::ValueEnum;
use codeflow_core::MemoryIndex;
use codeflow_graph::{
    finalize, GraphBuilder, GraphRenderer, JsonRenderer, MermaidRenderer, ScanConfig, CONFIG_DIR,
    CONFIG_FILE,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Rendered graph format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Mermaid,
    Json,
}

/// Flags for the `build` command.
#[derive(Debug)]
pub struct BuildOptions {
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub show_tests: bool,
    pub show_config: bool,
}

/// Initialize Codeflow in a directory.
pub fn init(path: &Path) -> Result<()> {
    let codeflow_dir = path.join(CONFIG_DIR);
    let config_path = codeflow_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(&codeflow_dir)?;
    ScanConfig::default().save(&config_path)?;

    println!("{} Initialized Codeflow in {}", "✓".green(), path.display());
    println!("  Edit {} to change markers", config_path.display().to_string().cyan());

    Ok(())
}

/// Build the graph and render it.
pub fn build(snapshot: &Path, options: &BuildOptions) -> Result<()> {
    let mut config = load_config(options.config.as_deref())?;
    config.show_tests |= options.show_tests;
    config.show_config |= options.show_config;

    let index = load_index(snapshot)?;

    let result = GraphBuilder::new(&index, &config).build();
    let rendered = finalize(&result.graph, &config);

    let text = match options.format {
        OutputFormat::Mermaid => MermaidRenderer::new().render(&rendered)?,
        OutputFormat::Json => JsonRenderer.render(&rendered)?,
    };

    eprintln!(
        "{} Built graph: {} components, {} placeholders, {} shown in {}ms",
        "✓".green(),
        result.candidates.to_string().cyan(),
        result.placeholders.to_string().cyan(),
        rendered.nodes.len().to_string().cyan(),
        result.duration_ms
    );
    if result.markers.is_empty() {
        eprintln!(
            "{} Root marker {} not found in snapshot",
            "⚠".yellow(),
            config.root_marker.yellow()
        );
    }

    match options.output.as_deref() {
        Some(path) => {
            fs::write(path, text)?;
            eprintln!("{} Wrote {}", "✓".green(), path.display());
        }
        None => print!("{}", text),
    }

    Ok(())
}

/// List the resolved markers.
pub fn markers(snapshot: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let index = load_index(snapshot)?;

    let result = GraphBuilder::new(&index, &config).build();

    if result.markers.is_empty() {
        println!("No markers found for {}", config.root_marker);
        return Ok(());
    }

    println!("Found {} markers:\n", result.markers.len());
    for (position, marker) in result.markers.iter().enumerate() {
        let tag = if position == 0 { "root" } else { "meta" };
        println!("  {} {}", tag.yellow(), marker.cyan());
    }

    Ok(())
}

/// Show graph statistics.
pub fn status(snapshot: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let index = load_index(snapshot)?;

    let result = GraphBuilder::new(&index, &config).build();
    let stats = result.graph.stats();

    println!("{}", "Codeflow Status".cyan().bold());
    println!();
    println!("  {} {}", "Types:".dimmed(), index.type_count());
    println!("  {} {}", "Markers:".dimmed(), result.markers.len());
    println!("  {} {}", "Nodes:".dimmed(), stats.node_count);
    println!("  {} {}", "Components:".dimmed(), stats.components);
    println!("  {} {}", "Placeholders:".dimmed(), stats.placeholders);
    println!("  {} {}", "Edges:".dimmed(), stats.edge_count);
    println!("  {} {}", "Entry points:".dimmed(), result.entry_points);

    if !stats.roles.is_empty() {
        println!();
        for (role, count) in &stats.roles {
            println!("  {} {}", format!("{}:", role).dimmed(), count);
        }
    }

    Ok(())
}

fn load_index(snapshot: &Path) -> Result<MemoryIndex> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Loading {}...", snapshot.display()));

    let index = MemoryIndex::load(snapshot);

    spinner.finish_and_clear();
    Ok(index?)
}

/// Explicit config file, else the project config, else defaults.
fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    let config = match path {
        Some(path) => {
            debug!("Loading config {}", path.display());
            ScanConfig::load(path)?
        }
        None => ScanConfig::discover(std::env::current_dir()?)?,
    };
    Ok(config)
}
