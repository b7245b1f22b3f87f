//! # xsdgraph
//!
//! Command-line front end: loads `xsdgraph.yaml`, compiles the type graph
//! and writes the artifact.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use xsdgraph::config::{Config, OverrideSource};
use xsdgraph_codegen::{OutputFormat, render};

#[derive(Parser)]
#[command(name = "xsdgraph")]
#[command(about = "Compile XSD/WSDL service definitions into a JSON type graph")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "xsdgraph.yaml")]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the graph and write it out
    Generate {
        #[command(flatten)]
        inputs: Inputs,

        /// Output file path (standard output when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json, yaml or rust
        #[arg(short, long, value_parser = parse_format)]
        format: Option<OutputFormat>,
    },

    /// Compile the graph and report diagnostics without writing it
    Check {
        #[command(flatten)]
        inputs: Inputs,
    },
}

/// Input paths that override the configuration file.
#[derive(Args)]
struct Inputs {
    /// Schema document, in load order (repeatable)
    #[arg(short, long = "schema")]
    schemas: Vec<PathBuf>,

    /// WSDL document
    #[arg(short, long)]
    wsdl: Option<PathBuf>,

    /// Override table YAML file
    #[arg(long)]
    overrides: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            inputs,
            output,
            format,
        } => {
            let mut config = load_config(&cli.config, &inputs)?;
            if let Some(path) = output {
                config.output.path = Some(absolute(&path)?);
            }
            if let Some(format) = format {
                config.output.format = format;
            }

            let graph = config.compile()?;
            let rendered = render(&graph, config.output.format, &config.artifact_options())?;
            match config.output_path() {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "wrote type graph");
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Check { inputs } => {
            let config = load_config(&cli.config, &inputs)?;
            let graph = config.compile()?;
            for diagnostic in &graph.diagnostics {
                println!("warning: {diagnostic}");
            }
            println!(
                "{} types, {} elements, {} operations, {} diagnostics",
                graph.types.len(),
                graph.elements.len(),
                graph.operations.len(),
                graph.diagnostics.len()
            );
        }
    }

    Ok(())
}

/// Loads the configuration file, or starts from command-line inputs alone
/// when it does not exist and schemas were given.
fn load_config(path: &Path, inputs: &Inputs) -> anyhow::Result<Config> {
    let mut config = if path.exists() || inputs.schemas.is_empty() {
        Config::load(path).with_context(|| format!("failed to load {}", path.display()))?
    } else {
        Config::from_yaml("schemas: []\n", std::env::current_dir()?)?
    };

    if !inputs.schemas.is_empty() {
        config.schemas = inputs
            .schemas
            .iter()
            .map(|p| absolute(p))
            .collect::<anyhow::Result<_>>()?;
    }
    if let Some(wsdl) = &inputs.wsdl {
        config.wsdl = Some(absolute(wsdl)?);
    }
    if let Some(overrides) = &inputs.overrides {
        config.overrides = Some(OverrideSource::Path(absolute(overrides)?));
    }
    Ok(config)
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    value.parse().map_err(|e: xsdgraph_codegen::CodegenError| e.to_string())
}

/// Command-line paths are relative to the working directory.
fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}
