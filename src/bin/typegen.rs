//! Schema Typegen CLI
//!
//! Generates the TypeScript declaration file from a project's schemas and
//! checks a committed file for drift.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_typegen::{compile, loader, CompileOutput, TypegenConfig};
use similar::TextDiff;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-typegen")]
#[command(about = "Generate TypeScript declarations from CMS schemas")]
struct Cli {
    /// Explicit config file, layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Log every naming and mapping decision
    #[arg(short, long)]
    verbose: bool,

    /// Read descriptors from a host dump instead of the project tree
    #[arg(long)]
    dump: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the schemas and write the declaration file
    Generate {
        /// Runtime environment; generation only runs in accepted environments
        #[arg(long, env = "NODE_ENV", default_value = "development")]
        environment: String,

        /// Write here instead of the configured output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile the schemas and diff against the existing declaration file
    Check {
        /// Compare against this file instead of the configured output path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match TypegenConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if cli.verbose {
        config.generator.verbose_logs = true;
    }
    if let Some(dump) = &cli.dump {
        config.sources.dump = Some(dump.clone());
    }

    let default_directive = if config.generator.verbose_logs { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    match run(cli.command, config) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(command: Commands, config: TypegenConfig) -> anyhow::Result<i32> {
    match command {
        Commands::Generate { environment, output } => {
            if !config.generator.accepts_environment(&environment) {
                info!(
                    environment = %environment,
                    accepted = ?config.generator.accepted_environments,
                    "Skipping generation outside accepted environments"
                );
                return Ok(0);
            }

            let result = compile_project(&config)?;
            let path = output.unwrap_or(config.output.path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, &result.document)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!(
                "✅ Wrote {} types to {} ({})",
                result.schemas.len(),
                path.display(),
                result.fingerprint
            );
            Ok(0)
        }

        Commands::Check { file } => {
            let result = compile_project(&config)?;
            let path = file.unwrap_or(config.output.path);
            let existing = read_existing(&path)?;

            if existing == result.document {
                println!("✅ {} is up to date", path.display());
                return Ok(0);
            }

            let diff = TextDiff::from_lines(&existing, &result.document);
            print!(
                "{}",
                diff.unified_diff()
                    .context_radius(3)
                    .header(&path.display().to_string(), "generated")
            );
            println!("❌ {} is out of date", path.display());
            Ok(1)
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(0)
        }
    }
}

fn compile_project(config: &TypegenConfig) -> anyhow::Result<CompileOutput> {
    let sources = loader::load_from_project(&config.sources)?;
    let output = compile(&sources, &config.generator).context("Failed to compile schemas")?;
    Ok(output)
}

/// Contents of the current declaration file; a missing file reads as empty
fn read_existing(path: &Path) -> anyhow::Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}
