use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod config;
mod dates;
mod error;
mod export;
mod html;
mod models;
mod reconcile;
mod report;
mod score;
mod server;
mod sources;
mod table;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::dates::DateRange;
use crate::models::{DetailView, LoadedModules, Overview, SiteSummary, SummaryTable};
use crate::sources::{load_modules, HttpFetcher};

#[derive(Parser)]
#[command(name = "assessment-tracker")]
#[command(about = "Worker assessment progress across published score sheets", long_about = None)]
struct Cli {
    /// TOML configuration; the built-in module list is used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Inclusive date window; either end defaults to the data bounds
#[derive(Args, Clone, Copy)]
struct Window {
    #[arg(long)]
    start: Option<NaiveDate>,
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Markdown,
    Html,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank workers by their latest score
    Summary {
        #[command(flatten)]
        window: Window,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print the full summary as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Show one module's raw rows, or every module's when no module is given
    Detail {
        #[arg(long)]
        module: Option<String>,
        #[command(flatten)]
        window: Window,
        /// Keep rows whose worker ID contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Write a report of the summary view
    Report {
        #[command(flatten)]
        window: Window,
        #[arg(long, value_enum, default_value = "markdown")]
        format: ReportFormat,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the summary table as CSV
    Export {
        #[command(flatten)]
        window: Window,
        #[arg(long, default_value = "summary.csv")]
        out: PathBuf,
    },
    /// Serve the interactive page
    Serve {
        #[arg(long, default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    overview: Overview,
    sites: Vec<SiteSummary>,
    summary: &'a SummaryTable,
    issues: Vec<String>,
}

fn summarize(config: &Config, loaded: &LoadedModules, window: Window) -> SummaryTable {
    let range = DateRange::resolve(
        reconcile::date_bounds(&loaded.modules),
        window.start,
        window.end,
    );
    reconcile::reconcile(&loaded.modules, range.as_ref(), &config.scoring)
}

async fn load(config: &Config, fetcher: &HttpFetcher) -> LoadedModules {
    info!("loading {} modules", config.modules.len());
    load_modules(config, fetcher).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "depot_assessment_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    let fetcher = HttpFetcher::new(config.fetch.clone()).context("failed to build HTTP client")?;

    match cli.command {
        Commands::Serve { addr } => {
            let cache = TtlCache::new(config.cache_ttl());
            let state = server::AppState::new(config, fetcher, cache);
            server::serve(state, addr).await?;
        }
        Commands::Summary {
            window,
            limit,
            json,
        } => {
            let loaded = load(&config, &fetcher).await;
            let summary = summarize(&config, &loaded, window);

            if json {
                let output = JsonSummary {
                    overview: report::overview(&summary),
                    sites: report::summarize_by_site(&summary),
                    summary: &summary,
                    issues: loaded.issues.iter().map(ToString::to_string).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            if summary.is_empty() {
                println!("No data for this selection.");
                return Ok(());
            }

            let mut ranked: Vec<_> = summary.rows.iter().collect();
            ranked.sort_by(|a, b| {
                b.percent_post
                    .partial_cmp(&a.percent_post)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            println!("Top workers by latest score:");
            for row in ranked.into_iter().take(limit) {
                println!(
                    "- {} ({}, {}) {:.1}% latest, {:.1}% first, {} attempts",
                    row.full_name,
                    row.worker_id,
                    row.site,
                    row.percent_post,
                    row.percent_pre,
                    row.attempts_label()
                );
            }
            for issue in &loaded.issues {
                println!("! {issue}");
            }
        }
        Commands::Detail {
            module,
            window,
            search,
        } => {
            if let Some(module) = &module {
                if config.module(module).is_none() {
                    let known: Vec<_> = config.modules.iter().map(|m| m.name.as_str()).collect();
                    anyhow::bail!("unknown module '{module}' (configured: {})", known.join(", "));
                }
            }
            let loaded = load(&config, &fetcher).await;
            let range = DateRange::resolve(
                reconcile::date_bounds(&loaded.modules),
                window.start,
                window.end,
            );

            let view = match &module {
                Some(module) => {
                    let data = loaded
                        .module(module)
                        .with_context(|| format!("module '{module}' was not loaded"))?;
                    reconcile::detail(data, range.as_ref(), search.as_deref(), &config.columns)
                }
                None => reconcile::combined(
                    &loaded.modules,
                    range.as_ref(),
                    search.as_deref(),
                    &config.columns,
                ),
            };

            match view {
                DetailView::NoData => println!("No data for this selection."),
                DetailView::Data(detail) => {
                    println!(
                        "Showing data for: {} ({} entries, {} sites)",
                        detail.module, detail.entries, detail.distinct_sites
                    );
                    println!("{}", detail.headers.join("\t"));
                    for row in &detail.rows {
                        println!("{}", row.join("\t"));
                    }
                }
            }
        }
        Commands::Report {
            window,
            format,
            out,
        } => {
            let loaded = load(&config, &fetcher).await;
            let summary = summarize(&config, &loaded, window);
            let body = match format {
                ReportFormat::Markdown => report::build_report(&summary, &loaded.issues),
                ReportFormat::Html => {
                    let names: Vec<String> = config.modules.iter().map(|m| m.name.clone()).collect();
                    html::render_page(&html::Page {
                        body: html::PageBody::Summary(&summary),
                        modules: &names,
                        range: summary.range,
                        search: None,
                        issues: &loaded.issues,
                        interactive: false,
                    })
                }
            };
            std::fs::write(&out, body)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { window, out } => {
            let loaded = load(&config, &fetcher).await;
            let summary = summarize(&config, &loaded, window);
            let csv = export::summary_csv(&summary)?;
            std::fs::write(&out, csv)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Exported {} workers to {}.", summary.rows.len(), out.display());
        }
    }

    Ok(())
}
