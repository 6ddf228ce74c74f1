use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ward_core::{resolve_id, AlertFilter, Config, FilterCriteria, PipelineSnapshot, ResourceType};
use ward_dbt::SnapshotLoader;
use ward_engine::{generate_graph, GraphOptions, GraphRequest, GraphView};

/// Ward - lineage and health views for dbt pipelines
#[derive(Parser)]
#[command(name = "ward")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ward.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the lineage graph, either in full or around one model
    Graph {
        /// Focus on one entity (entity id, unique_id or short name)
        #[arg(short, long)]
        model: Option<String>,

        /// Only keep entities of this resource type (model, source, seed)
        #[arg(short = 't', long = "type")]
        resource_type: Option<ResourceType>,

        /// Only keep entities with this alert (anomaly, schema_change, failed_test)
        #[arg(short, long)]
        alerts: Option<AlertFilter>,

        /// Include entities that are not flagged as monitored
        #[arg(long)]
        all_nodes: bool,

        #[command(flatten)]
        artifacts: ArtifactArgs,

        /// Write the graph as JSON instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the entities offered for focusing
    Search {
        /// Only list entities whose id contains this text
        query: Option<String>,

        /// Include entities that are not flagged as monitored
        #[arg(long)]
        all_nodes: bool,

        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
}

/// Artifact path overrides shared by every command
#[derive(clap::Args)]
struct ArtifactArgs {
    /// Path to dbt manifest.json (default from config)
    #[arg(short = 'f', long)]
    manifest: Option<PathBuf>,

    /// Path to the monitoring export (default from config)
    #[arg(long)]
    monitoring: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(root = %config.project_root.display(), "configuration loaded");

    match cli.command {
        Commands::Graph {
            model,
            resource_type,
            alerts,
            all_nodes,
            artifacts,
            output,
        } => {
            let criteria = build_criteria(&config, resource_type, alerts, all_nodes);
            graph_command(&config, &artifacts, model.as_deref(), criteria, output.as_deref())
        }
        Commands::Search {
            query,
            all_nodes,
            artifacts,
        } => {
            let criteria = build_criteria(&config, None, None, all_nodes);
            search_command(&config, &artifacts, query.as_deref(), criteria)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Explicit path, then discovery, then defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()));
    }

    match Config::discover()? {
        Some(config) => Ok(config),
        None => {
            tracing::debug!("no config file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn build_criteria(
    config: &Config,
    resource_type: Option<ResourceType>,
    alert: Option<AlertFilter>,
    all_nodes: bool,
) -> FilterCriteria {
    FilterCriteria {
        resource_type,
        alert,
        monitored_only: config.graph.monitored_only && !all_nodes,
    }
}

fn load_snapshot(config: &Config, artifacts: &ArtifactArgs) -> Result<PipelineSnapshot> {
    let manifest = artifacts
        .manifest
        .clone()
        .unwrap_or_else(|| config.manifest_path());
    let monitoring = artifacts
        .monitoring
        .clone()
        .unwrap_or_else(|| config.monitoring_path());

    if !manifest.exists() {
        return Err(anyhow::anyhow!(
            "Manifest not found at {}. Run 'dbt compile' or 'dbt build' first.",
            manifest.display()
        ));
    }

    tracing::info!(manifest = %manifest.display(), monitoring = %monitoring.display(), "loading artifacts");

    SnapshotLoader::from_paths(&manifest, Some(monitoring.as_path())).context("Failed to load pipeline snapshot")
}

/// Graph command - build and print or export a lineage view
fn graph_command(
    config: &Config,
    artifacts: &ArtifactArgs,
    model: Option<&str>,
    criteria: FilterCriteria,
    output: Option<&Path>,
) -> Result<()> {
    let snapshot = load_snapshot(config, artifacts)?;

    let request = match model {
        Some(model) => GraphRequest::focused(resolve_focus(&snapshot, model)?),
        None => GraphRequest::full(criteria),
    };

    let view = generate_graph(&snapshot, &request, &GraphOptions::from(&config.graph));

    match output {
        Some(path) => {
            std::fs::write(path, view.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} nodes, {} edges to {}",
                "Wrote".green(),
                view.nodes.len(),
                view.edges.len(),
                path.display()
            );
        }
        None => print_graph(&view, request.focus.as_deref()),
    }

    Ok(())
}

/// Search command - list focusable entities
fn search_command(
    config: &Config,
    artifacts: &ArtifactArgs,
    query: Option<&str>,
    criteria: FilterCriteria,
) -> Result<()> {
    let snapshot = load_snapshot(config, artifacts)?;
    let view = generate_graph(&snapshot, &GraphRequest::full(criteria), &GraphOptions::from(&config.graph));

    let matches: Vec<_> = view
        .options
        .iter()
        .filter(|option| query.map_or(true, |q| option.label.contains(q)))
        .collect();

    if matches.is_empty() {
        println!("{}", "No matching entities".yellow());
        return Ok(());
    }

    for option in matches {
        println!("{}", option.label);
    }

    Ok(())
}

/// Map user input to a snapshot label
///
/// Accepts an entity id, a dbt unique_id or a short entity name.
fn resolve_focus(snapshot: &PipelineSnapshot, model: &str) -> Result<String> {
    if snapshot.raw_ref(model).is_some() {
        return Ok(model.to_string());
    }

    if let Some(entity) = snapshot.entity(model) {
        return Ok(resolve_id(entity).to_string());
    }

    let mut candidates = snapshot
        .known_nodes
        .iter()
        .filter(|known| snapshot.entity(&known.raw_ref).is_some_and(|e| e.name == model));

    match (candidates.next(), candidates.next()) {
        (Some(known), None) => Ok(known.label.clone()),
        (Some(first), Some(second)) => Err(anyhow::anyhow!(
            "'{}' is ambiguous ({}, {}, ...). Use the full entity id.",
            model,
            first.label,
            second.label
        )),
        (None, _) => Err(anyhow::anyhow!(
            "Model '{}' not found in manifest. Try 'ward search' to list entity ids.",
            model
        )),
    }
}

fn print_graph(view: &GraphView, focus: Option<&str>) {
    println!("\n{}", "=".repeat(60).bright_blue());
    match focus {
        Some(focus) => println!("{} {}", "Lineage for".bold().bright_blue(), focus.green()),
        None => println!("{}", "Pipeline Lineage".bold().bright_blue()),
    }
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    if view.is_empty() {
        println!("{}", "No entities match the current filters".yellow());
        println!();
        return;
    }

    println!("{} {}", "Nodes:".bold(), view.nodes.len());
    for node in &view.nodes {
        let mut markers = Vec::new();
        if node.signals.has_anomaly {
            markers.push("anomaly".red().to_string());
        }
        if node.signals.has_schema_change {
            markers.push("schema change".yellow().to_string());
        }
        if node.signals.has_failed_test {
            markers.push("failed test".red().bold().to_string());
        }

        let markers = if markers.is_empty() {
            String::new()
        } else {
            format!(" [{}]", markers.join(", "))
        };

        println!(
            "  {:>3}. {} ({}){}",
            node.render_index.get(),
            node.label.green(),
            node.resource_type,
            markers
        );
    }

    println!();
    println!("{} {}", "Edges:".bold(), view.edges.len());
    for edge in &view.edges {
        let source = view.node_at(edge.source).map_or("?", |n| n.label.as_str());
        let target = view.node_at(edge.target).map_or("?", |n| n.label.as_str());
        println!("  {} {} {}", source, "->".dimmed(), target);
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
