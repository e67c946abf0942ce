//! costplan CLI - Project Costing Engine
//!
//! Command-line interface for costing, planning and spreadsheet exchange.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use costplan_core::{CostplanConfig, Project, ProjectBundle, Renderer};
use costplan_engine::{top_items, CostSnapshot, TopItem};
use costplan_render::{planning_text, summary_text, top_items_text, ExcelExporter};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "costplan")]
#[command(author, version, about = "Project costing engine", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./costplan.toml when present)
    #[arg(long, value_name = "FILE", global = true, env = "COSTPLAN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Cost and margin summary
    Summary {
        /// Project bundle (JSON) or spreadsheet
        #[arg(value_name = "BUNDLE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Margin rate override (0.15 = 15%)
        #[arg(long, value_name = "RATE")]
        margin_rate: Option<f64>,
    },

    /// Effort planning per scope and profile
    Planning {
        /// Project bundle (JSON) or spreadsheet
        #[arg(value_name = "BUNDLE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Most expensive items
    Top {
        /// Project bundle (JSON) or spreadsheet
        #[arg(value_name = "BUNDLE")]
        file: PathBuf,

        /// Number of items to list
        #[arg(short = 'n', long, default_value_t = costplan_engine::TOP_ITEMS)]
        count: usize,
    },

    /// Export a project to an Excel workbook
    Export {
        /// Project bundle (JSON)
        #[arg(value_name = "BUNDLE")]
        file: PathBuf,

        /// Output workbook path
        #[arg(short, long)]
        output: PathBuf,

        /// Write values instead of formulas
        #[arg(long)]
        static_values: bool,
    },

    /// Import a spreadsheet or bundle into a JSON bundle
    Import {
        /// Spreadsheet (xlsx, xls, ods) or bundle (json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output bundle path
        #[arg(short, long)]
        output: PathBuf,

        /// Project name (defaults to the file name)
        #[arg(long)]
        project_name: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Summary {
            file,
            format,
            margin_rate,
        } => {
            let mut project = load_project(&file, config.as_ref())?;
            if let Some(rate) = margin_rate {
                if !rate.is_finite() {
                    bail!("Margin rate must be a finite number");
                }
                project.settings.margin_rate = rate;
            }
            let snapshot = CostSnapshot::compute(&project);
            match format {
                OutputFormat::Text => print!("{}", summary_text(&snapshot)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            }
        }
        Commands::Planning { file, format } => {
            let project = load_project(&file, config.as_ref())?;
            let snapshot = CostSnapshot::compute(&project);
            match format {
                OutputFormat::Text => {
                    print!("{}", planning_text(&snapshot.planning, project.settings.start_date));
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&snapshot.planning)?);
                }
            }
        }
        Commands::Top { file, count } => {
            let project = load_project(&file, config.as_ref())?;
            let top: Vec<TopItem> = top_items(&project.items, &project.profiles, count)
                .iter()
                .map(TopItem::from)
                .collect();
            print!("{}", top_items_text(&top, &project.settings.currency));
        }
        Commands::Export {
            file,
            output,
            static_values,
        } => {
            let project = load_project(&file, config.as_ref())?;
            let mut exporter = ExcelExporter::new();
            if static_values {
                exporter = exporter.static_values();
            }
            let bytes = exporter
                .render(&project)
                .context("Failed to render workbook")?;
            std::fs::write(&output, bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Exported: {}", output.display());
        }
        Commands::Import {
            file,
            output,
            project_name,
        } => {
            let mut project = costplan_import::parse_file(&file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            if let Some(name) = project_name {
                project.settings.project_name = name;
            }
            ProjectBundle::from_project(&project)
                .write(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(items = project.items.len(), profiles = project.profiles.len(), "imported");
            println!(
                "Imported {} items, {} profiles: {}",
                project.items.len(),
                project.profiles.len(),
                output.display()
            );
        }
    }

    Ok(())
}

/// Load the explicit config file, or `costplan.toml` from the working directory
fn load_config(path: Option<&Path>) -> Result<Option<CostplanConfig>> {
    if let Some(path) = path {
        let config = CostplanConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        return Ok(Some(config));
    }
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config = CostplanConfig::discover(&cwd).context("Failed to load costplan.toml")?;
    if config.is_some() {
        debug!(dir = %cwd.display(), "using discovered config");
    }
    Ok(config)
}

/// Load a project and apply config overrides to its settings
fn load_project(path: &Path, config: Option<&CostplanConfig>) -> Result<Project> {
    let mut project = costplan_import::parse_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    if let Some(config) = config {
        project.settings = config.apply(&project.settings);
    }
    debug!(
        project = %project.name(),
        items = project.items.len(),
        profiles = project.profiles.len(),
        "loaded project"
    );
    Ok(project)
}
