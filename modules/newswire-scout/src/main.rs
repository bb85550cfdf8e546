use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use newswire_archive::{dedupe, Archive, FileSuggester, Gatherer, SourceCatalog};
use newswire_common::{load_config, AppConfig, FileConfig, GatherResult, NewswireError};
use newswire_scout::{render_digest, MarkdownReportWriter, ReportOutcome, ReportWriter};

#[derive(Parser)]
#[command(name = "newswire", about = "Gather, deduplicate and digest fragrance industry news")]
struct Cli {
    /// Path to config TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file of suggested sources to append to the catalog
    #[arg(long)]
    suggestions: Option<PathBuf>,

    /// Override the search lookback window, in days
    #[arg(long)]
    lookback_days: Option<u32>,

    /// Also write the gathered articles and errors as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Gather and print the digest without writing a report
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive("newswire=info".parse()?);
    if cli.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Newswire starting...");

    let config = AppConfig::from_env();
    let file_config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| NewswireError::Config(format!("{e:#}")))?,
        None => FileConfig::default(),
    };

    let mut catalog = SourceCatalog::from_config(&file_config.catalog);
    if let Some(path) = &cli.suggestions {
        catalog.extend_from(&FileSuggester::new(path)).await;
    }
    info!(sources = catalog.len(), "Catalog ready");

    let archive = Arc::new(Archive::new(&config, &file_config)?);
    let lookback_days = cli.lookback_days.unwrap_or(file_config.search.lookback_days);

    let outcome = run(&cli, &file_config, &catalog, Arc::clone(&archive), lookback_days).await;
    archive.shutdown().await;

    if let Err(e) = &outcome {
        match e.downcast_ref::<NewswireError>() {
            Some(err) if err.is_run_fatal() => error!(error = %err, "Run aborted"),
            _ => error!(error = %e, "Run failed"),
        }
    }
    outcome
}

async fn run(
    cli: &Cli,
    file_config: &FileConfig,
    catalog: &SourceCatalog,
    archive: Arc<Archive>,
    lookback_days: u32,
) -> Result<()> {
    let gatherer = Gatherer::new(archive, lookback_days);
    let gathered = gatherer.gather(catalog.sources()).await;

    let before = gathered.articles.len();
    let result = GatherResult {
        articles: dedupe(gathered.articles),
        errors: gathered.errors,
    };
    info!(
        gathered = before,
        unique = result.articles.len(),
        errors = result.errors.len(),
        "Gather complete"
    );
    for error in &result.errors {
        warn!(error = error.as_str(), "Source error");
    }

    if let Some(path) = &cli.json {
        let json = serde_json::to_string_pretty(&result)?;
        tokio::fs::write(path, json).await?;
        info!(path = %path.display(), "Gather result written");
    }

    if result.articles.is_empty() {
        return Err(NewswireError::NoArticles.into());
    }

    let digest = render_digest(&result, Utc::now().date_naive());
    if cli.dry_run {
        println!("{digest}");
        return Ok(());
    }

    let writer = MarkdownReportWriter::new(&file_config.report);
    match writer.write(&digest).await {
        ReportOutcome::Written { path, .. } => {
            println!("Report generated: {path}");
            Ok(())
        }
        ReportOutcome::Failed { error } => Err(NewswireError::ReportWrite(error).into()),
    }
}
