//! Schema Compatibility CLI
//!
//! Compares schema revisions, bumps versions and lints schemas against the
//! supported keyword subset.
//!
//! Usage:
//!   schema-compat compare old.json new.json --diff
//!   schema-compat validate ./schemas
//!   schema-compat bump article@v1.2.0 minor

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use familiar_schema_compat::metadata::{schema_version, strip_version_metadata};
use familiar_schema_compat::{
    bump_version, normalize, ChangeLevel, CompatibilityChecker, EngineConfig, Metadata, SchemaVersion,
    SubsetValidator,
};
use serde_json::{json, Value};
use similar::{ChangeTag, TextDiff};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "schema-compat")]
#[command(about = "Check schema compatibility, bump versions and lint content schemas")]
struct Cli {
    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two schema revisions
    Compare {
        /// Previous revision (JSON)
        old: PathBuf,
        /// Candidate revision (JSON)
        new: PathBuf,
        /// Schema slug (defaults to the slug in the schema metadata)
        #[arg(short, long)]
        slug: Option<String>,
        /// Accept breaking changes
        #[arg(long)]
        allow_breaking: bool,
        /// Print a line diff of the normalized schemas
        #[arg(long)]
        diff: bool,
    },

    /// Print the normalized form of a schema
    Normalize {
        file: PathBuf,
    },

    /// Lint a schema file, or every *.json file under a directory
    Validate {
        path: PathBuf,
    },

    /// Bump a version identifier
    Bump {
        /// Version (e.g. article@v1.2.0)
        version: String,
        /// none, patch, minor or major
        level: String,
    },

    /// Show the effective configuration
    Config {
        /// Write it to this file instead
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match EngineConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, &config) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(command: Commands, config: &EngineConfig) -> Result<bool> {
    let format = config.output.format;

    match command {
        Commands::Compare {
            old,
            new,
            slug,
            allow_breaking,
            diff,
        } => {
            let old_schema = normalize(&read_json(&old)?);
            let new_schema = normalize(&read_json(&new)?);

            let slug = slug
                .or_else(|| non_empty(Metadata::extract(&new_schema).slug))
                .or_else(|| non_empty(Metadata::extract(&old_schema).slug))
                .context("no slug given and none found in schema metadata")?;

            let result = CompatibilityChecker::new().check(&old_schema, &new_schema);
            let current = schema_version(&old_schema)
                .with_context(|| format!("reading version of {}", old.display()))?
                .unwrap_or_else(|| SchemaVersion::initial(slug.as_str()));

            let next = result.next_version(&current)?;

            let report = json!({
                "slug": slug,
                "summary": result.summary(),
                "current_version": current,
                "next_version": next,
                "result": result,
            });
            println!("{}", format.render(&report)?);

            if diff {
                print_diff(&old_schema, &new_schema)?;
            }

            if let Err(e) = result.ensure_accepted(&slug, allow_breaking || config.compatibility.allow_breaking_changes) {
                eprintln!("❌ {}", e);
                return Ok(false);
            }
            Ok(true)
        }

        Commands::Normalize { file } => {
            let schema = read_json(&file)?;
            println!("{}", format.render(&normalize(&schema))?);
            Ok(true)
        }

        Commands::Validate { path } => {
            let files = collect_schema_files(&path)?;
            let validator = SubsetValidator::new();
            let mut clean = true;

            for file in &files {
                let schema = normalize(&read_json(file)?);
                let result = validator.lint(&file.display().to_string(), &schema);
                if result.is_clean() {
                    println!("✅ {}", result.schema_id);
                } else {
                    clean = false;
                    println!("❌ {} - {} violation(s)", result.schema_id, result.errors.len());
                    for error in &result.errors {
                        println!("   └─ [{}] {} at {}", error.code, error.message, error.path);
                    }
                }
            }

            println!();
            println!("{} schema(s) checked", files.len());
            Ok(clean)
        }

        Commands::Bump { version, level } => {
            let level: ChangeLevel = level.parse()?;
            println!("{}", bump_version(&version, level)?);
            Ok(true)
        }

        Commands::Config { write } => {
            match write {
                Some(path) => {
                    config
                        .save(&path)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("✅ Configuration written to {}", path.display());
                }
                None => print!("{}", config.to_toml()?),
            }
            Ok(true)
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn collect_schema_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", path.display()))?;
        if entry.file_type().is_file() && entry.path().extension().map_or(false, |ext| ext == "json") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn print_diff(old: &Value, new: &Value) -> Result<()> {
    let old_text = serde_json::to_string_pretty(&strip_version_metadata(old))?;
    let new_text = serde_json::to_string_pretty(&strip_version_metadata(new))?;

    let diff = TextDiff::from_lines(&old_text, &new_text);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        print!("{}{}", sign, change);
    }
    Ok(())
}
