//! RKG CLI - Command-line interface
//!
//! Usage:
//!   rkg analyze <files..> [--seed-skills a,b] [--groups PEOPLE,SKILLS] [--evidence] [--json]
//!   rkg export <files..> --output graph.json
//!   rkg skills

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rkg_core::{AppConfig, EntityGroup, LoggingConfig};
use rkg_extractor::{Analysis, ExtractionEngine};

#[derive(Parser)]
#[command(name = "rkg")]
#[command(about = "Resume knowledge graph extractor")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities and relationships from documents
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Print supporting sentences for each edge
        #[arg(long)]
        evidence: bool,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the entity graph as JSON
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Destination file
        #[arg(short, long, default_value = "graph.json")]
        output: PathBuf,
    },
    /// Print the configured seed skills
    Skills,
}

#[derive(Args)]
struct InputArgs {
    /// Documents to analyze (.pdf, .txt, .md); their texts are merged
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Comma-separated seed skills replacing the configured list
    #[arg(long, value_delimiter = ',')]
    seed_skills: Vec<String>,

    /// Comma-separated entity groups to keep
    #[arg(long, value_delimiter = ',')]
    groups: Vec<EntityGroup>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Analyze {
            input,
            evidence,
            json,
        } => {
            let analysis = run_analysis(config, &input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis, evidence);
            }
        }
        Commands::Export { input, output } => {
            let analysis = run_analysis(config, &input)?;
            let graph = analysis.graph();
            std::fs::write(&output, graph.to_json_pretty()?)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(
                path = %output.display(),
                nodes = graph.nodes.len(),
                edges = graph.edges.len(),
                "Graph exported"
            );
            println!("Wrote {} nodes, {} edges to {}", graph.nodes.len(), graph.edges.len(), output.display());
        }
        Commands::Skills => {
            for skill in &config.extraction.seed_skills {
                println!("{skill}");
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Logs go to stderr so stdout stays clean for JSON output
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_analysis(mut config: AppConfig, input: &InputArgs) -> anyhow::Result<Analysis> {
    if !input.seed_skills.is_empty() {
        config.extraction.seed_skills = input.seed_skills.clone();
    }

    let mut texts = Vec::with_capacity(input.files.len());
    for path in &input.files {
        let text = rkg_parser::extract_text_from_path(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if text.trim().is_empty() {
            warn!(file = %path.display(), "No text extracted");
        }
        texts.push(text);
    }
    let text = rkg_parser::merge_texts(&texts);

    let engine = ExtractionEngine::from_config(&config).context("failed to load models")?;
    let analysis = if input.groups.is_empty() {
        engine.analyze(&text)?
    } else {
        engine.analyze_with_groups(&text, &input.groups)?
    };
    Ok(analysis)
}

fn print_analysis(analysis: &Analysis, with_evidence: bool) {
    for (group, values) in analysis.entities.iter() {
        if values.is_empty() {
            continue;
        }
        println!("{group} ({})", values.len());
        for value in values {
            println!("  {value}");
        }
    }

    if analysis.edges.is_empty() {
        println!("\nNo relationships found");
        return;
    }

    println!("\nRelationships ({})", analysis.edges.len());
    for edge in &analysis.edges {
        println!("  {} --{}--> {}", edge.source, edge.relation, edge.target);
    }

    if with_evidence {
        println!("\nEvidence");
        for record in &analysis.evidence {
            println!(
                "  {} --{}--> {} [{} sentence(s)]",
                record.source, record.relation, record.target, record.count
            );
            for example in &record.examples {
                println!("    \"{example}\"");
            }
        }
    }
}
