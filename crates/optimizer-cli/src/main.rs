//! Cloud Cost Optimizer CLI
//!
//! Runs the report engine against an exported inventory snapshot and
//! renders the savings-annotated tables, or inspects the report catalog.

mod config;
mod output;
mod provider;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use optimizer_lib::aggregate::Aggregator;
use optimizer_lib::report::RunScope;

/// Cloud Cost Optimizer CLI
#[derive(Parser)]
#[command(name = "costopt")]
#[command(author, version, about = "CLI for the cloud cost optimizer", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run reports against an inventory snapshot
    Run {
        /// Path to the inventory snapshot JSON file
        #[arg(long, short)]
        input: PathBuf,

        /// Account id for placeholder rows (env: COSTOPT_ACCOUNT)
        #[arg(long)]
        account: Option<String>,

        /// Region to analyze (env: COSTOPT_REGION)
        #[arg(long)]
        region: Option<String>,

        /// Only run the named reports (comma-separated)
        #[arg(long)]
        reports: Option<String>,

        /// Metric lookback period in days (7, 14 or 30)
        #[arg(long)]
        lookback: Option<String>,
    },

    /// List the available reports
    List,

    /// Show one report's metadata and schema
    Describe {
        /// Report name, as shown by `list`
        name: String,
    },
}

/// Row for the report catalog table
#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Title")]
    title: &'static str,
    #[tabled(rename = "Domain")]
    domain: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            account,
            region,
            reports,
            lookback,
        } => run_reports(&input, account, region, reports, lookback, cli.format).await,
        Commands::List => list_reports(cli.format),
        Commands::Describe { name } => describe_report(&name),
    }
}

async fn run_reports(
    input: &std::path::Path,
    account: Option<String>,
    region: Option<String>,
    reports: Option<String>,
    lookback: Option<String>,
    format: output::OutputFormat,
) -> Result<()> {
    let defaults = config::CliConfig::load()?;
    let account = account.unwrap_or(defaults.account);
    let region = region.unwrap_or(defaults.region);

    let aggregator = select_reports(Aggregator::with_default_reports(), reports.as_deref())?;
    let client = Arc::new(provider::SnapshotProvider::load(input)?);

    let mut scope = RunScope::new(account, vec![region]);
    if let Some(lookback) = lookback {
        scope.params.set("lookback_period", lookback);
    }

    let outputs = aggregator.run(client, &scope).await?;
    tracing::info!(reports = outputs.len(), "run complete");

    match format {
        output::OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outputs)?);
        }
        output::OutputFormat::Table => {
            for report in &outputs {
                output::print_report(report);
            }
            let total: f64 = outputs
                .iter()
                .filter(|o| o.display_savings)
                .map(|o| o.savings)
                .sum();
            println!();
            output::print_success(&format!(
                "Total estimated monthly savings: {}",
                output::format_currency(total)
            ));
        }
    }
    Ok(())
}

/// Restrict the registry to a comma-separated report name filter
fn select_reports(aggregator: Aggregator, filter: Option<&str>) -> Result<Aggregator> {
    let Some(filter) = filter else {
        return Ok(aggregator);
    };
    let wanted: HashSet<&str> = filter.split(',').map(str::trim).collect();
    let known: HashSet<&str> = aggregator.reports().iter().map(|r| r.name()).collect();
    for name in &wanted {
        if !known.contains(name) {
            bail!("unknown report `{name}` (see `costopt list`)");
        }
    }

    let mut selected = Aggregator::new();
    for report in aggregator.reports() {
        if wanted.contains(report.name()) {
            selected.register(report.clone());
        }
    }
    Ok(selected)
}

fn list_reports(format: output::OutputFormat) -> Result<()> {
    let aggregator = Aggregator::with_default_reports();

    match format {
        output::OutputFormat::Json => {
            let catalog: Vec<serde_json::Value> = aggregator
                .reports()
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "name": r.name(),
                        "title": r.title(),
                        "domain": r.domain().label(),
                        "description": r.description(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        output::OutputFormat::Table => {
            let rows: Vec<CatalogRow> = aggregator
                .reports()
                .iter()
                .map(|r| CatalogRow {
                    name: r.name(),
                    title: r.title(),
                    domain: r.domain().label(),
                    description: r.description(),
                })
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
    Ok(())
}

fn describe_report(name: &str) -> Result<()> {
    let aggregator = Aggregator::with_default_reports();
    let Some(report) = aggregator.reports().iter().find(|r| r.name() == name) else {
        output::print_error(&format!("unknown report `{name}`"));
        bail!("unknown report `{name}` (see `costopt list`)");
    };

    println!("{}", report.title());
    println!("  name:        {}", report.name());
    println!("  domain:      {}", report.domain().label());
    println!("  authors:     {}", report.authors().join(", "));
    println!("  docs:        {}", report.html_link());
    println!("  description: {}", report.description());
    println!("  columns:");
    for column in report.required_columns() {
        println!("    - {column}");
    }
    let parameters = report.parameters();
    if !parameters.is_empty() {
        println!("  parameters:");
        for spec in parameters {
            println!(
                "    - {} (default {}, allowed {:?})",
                spec.name, spec.default, spec.allowed
            );
        }
    }
    Ok(())
}
