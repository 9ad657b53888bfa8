//! reactnet CLI
//!
//! - `convert`: KGML pathway → reaction statements (+ optional graph JSON)
//! - `inspect`: entry/relation counts of a KGML file, no catalog access
//!
//! Logs go to stderr (`RUST_LOG`, default `info`) so reactions written to
//! stdout stay pipeable.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use reactnet_graph::{
    convert, EntityCatalog, FamilyOntology, GroundingCache, RetryPolicy, SourcePathway,
};
use reactnet_ingest_kegg::{read_kgml, BundleCatalog, FamilyTable};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;

use config::ReactnetConfig;

#[derive(Parser)]
#[command(name = "reactnet")]
#[command(author, version, about = "Rewrite KEGG pathways into reaction networks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a KGML pathway into ordered reaction statements.
    Convert(ConvertArgs),

    /// Summarize a KGML pathway (entry kinds, relation classes).
    Inspect {
        /// Input KGML file
        input: PathBuf,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// Input KGML file
    input: PathBuf,

    /// KEGG flat-file bundle(s) used to name genes and compounds (repeatable).
    #[arg(long)]
    catalog: Vec<PathBuf>,

    /// Resolve identifiers against the KEGG REST API instead of bundles.
    #[arg(long)]
    rest: bool,

    /// FamPlex `relations.csv` for family renaming.
    #[arg(long)]
    famplex: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output reactions file (default: stdout).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Write the rewritten graph as JSON.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Catalog batch size.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Catalog attempts per batch.
    #[arg(long)]
    retries: Option<u32>,

    /// Delay between catalog attempts in milliseconds.
    #[arg(long)]
    retry_delay_ms: Option<u64>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => cmd_convert(args),
        Commands::Inspect { input } => cmd_inspect(&input),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_convert(args: ConvertArgs) -> Result<()> {
    let mut config = ReactnetConfig::load_or_default(args.config.as_deref())?;
    if let Some(batch_size) = args.batch_size {
        config.catalog.batch_size = batch_size;
    }
    if let Some(attempts) = args.retries {
        config.catalog.retry.attempts = attempts;
    }
    if let Some(delay_ms) = args.retry_delay_ms {
        config.catalog.retry = RetryPolicy::new(
            config.catalog.retry.attempts,
            Duration::from_millis(delay_ms),
        );
    }
    if let Some(table) = args.famplex.clone() {
        config.family.table = Some(table);
    }
    tracing::debug!(?config, "effective configuration");

    eprintln!("{} {}", "Converting".green().bold(), args.input.display());
    let pathway = load_pathway(&args.input)?;

    let catalog = open_catalog(&args, &config)?;
    let family = match &config.family.table {
        Some(path) => Some(
            FamilyTable::load(path)
                .with_context(|| format!("failed to load family table {}", path.display()))?,
        ),
        None => None,
    };

    let mut cache = GroundingCache::new();
    let conversion = convert(
        &pathway,
        &mut cache,
        catalog.as_ref(),
        family.as_ref().map(|f| f as &dyn FamilyOntology),
        &config.build_options(),
    )
    .with_context(|| format!("failed to convert {}", args.input.display()))?;

    let rendered = conversion.reactions.render();
    match &args.out {
        Some(out) => {
            write_file(out, &rendered)?;
            eprintln!(
                "  {} {} ({} statements)",
                "→".cyan(),
                out.display(),
                conversion.reactions.len()
            );
        }
        None => print!("{rendered}"),
    }

    if let Some(graph_out) = &args.graph {
        let json = serde_json::to_string_pretty(&conversion.rewritten.to_export())?;
        write_file(graph_out, &json)?;
        eprintln!("  {} {}", "→".cyan(), graph_out.display());
    }

    eprintln!(
        "  {} {} nodes, {} edges ({} removed), {} catalog lookups",
        "→".yellow(),
        conversion.rewritten.node_count(),
        conversion.rewritten.edge_count(),
        conversion.removed_edges.len(),
        cache.lookups()
    );
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<()> {
    let pathway = load_pathway(input)?;
    println!(
        "{} {} ({})",
        "Pathway".green().bold(),
        pathway.name,
        pathway.title
    );

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in &pathway.entries {
        *kinds.entry(entry.kind.as_str()).or_default() += 1;
    }
    println!("  {} {} entries", "→".cyan(), pathway.entries.len());
    for (kind, count) in &kinds {
        println!("      {kind:<12} {count}");
    }

    let mut classes: BTreeMap<&str, usize> = BTreeMap::new();
    for relation in &pathway.relations {
        *classes.entry(relation.class.kgml_name()).or_default() += 1;
    }
    println!("  {} {} relations", "→".cyan(), pathway.relations.len());
    for (class, count) in &classes {
        println!("      {class:<12} {count}");
    }
    Ok(())
}

fn load_pathway(path: &Path) -> Result<SourcePathway> {
    read_kgml(path).with_context(|| format!("failed to load pathway {}", path.display()))
}

fn open_catalog(args: &ConvertArgs, config: &ReactnetConfig) -> Result<Box<dyn EntityCatalog>> {
    if args.rest {
        return rest_catalog(config);
    }
    if args.catalog.is_empty() {
        bail!("no entity catalog: pass --catalog <flat-file> (repeatable) or --rest");
    }
    let mut catalog = BundleCatalog::new().with_batch_size(config.catalog.batch_size);
    for path in &args.catalog {
        let added = catalog.add_file(path)?;
        eprintln!("  {} {} ({added} records)", "catalog".dimmed(), path.display());
    }
    Ok(Box::new(catalog))
}

#[cfg(feature = "rest")]
fn rest_catalog(config: &ReactnetConfig) -> Result<Box<dyn EntityCatalog>> {
    let catalog = reactnet_ingest_kegg::RestCatalog::new(
        config.catalog.rest_base_url.clone(),
        config.catalog.batch_size,
    )?;
    Ok(Box::new(catalog))
}

#[cfg(not(feature = "rest"))]
fn rest_catalog(_config: &ReactnetConfig) -> Result<Box<dyn EntityCatalog>> {
    bail!("--rest requires reactnet to be built with the `rest` feature")
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
