//! Site-Harvester main entry point
//!
//! This is the command-line interface for the Site-Harvester page scraper.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use site_harvester::config::load_config_or_default;
use site_harvester::output::{
    export_job, print_analytics, write_export, ExportFormat, JobAnalytics,
};
use site_harvester::storage::{open_store, run_job, JobFilter, JobStatus, JobStore};
use site_harvester::{Coordinator, HarvesterConfig, ScrapeRequest};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Site-Harvester: scrape pages and small sites into structured data
///
/// Pages are fetched statically or through a headless browser, run through
/// the extractor pipeline, and recorded as jobs that can be listed,
/// exported and summarized later.
#[derive(Parser, Debug)]
#[command(name = "site-harvester")]
#[command(version)]
#[command(about = "Scrape pages and small sites into structured data", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a page, or crawl a site from its root
    Scrape {
        /// Full URL or bare domain
        target: String,

        /// CSS selector to extract (repeatable)
        #[arg(short, long = "selector", value_name = "SELECTOR")]
        selectors: Vec<String>,

        /// Render the page in a headless browser
        #[arg(long)]
        render: bool,

        /// Seconds to wait after a rendered page settles
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,

        /// Crawl the whole site (only honored for a root URL)
        #[arg(long)]
        crawl: bool,

        /// Page cap for a site crawl
        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,

        /// Export format
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Write the export to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Inspect stored jobs
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },

    /// Show job analytics as JSON
    Analytics {
        /// Print a readable summary instead of JSON
        #[arg(long)]
        summary: bool,
    },
}

#[derive(Subcommand, Debug)]
enum JobsAction {
    /// List jobs, newest first
    List {
        /// Only jobs in this status
        #[arg(long)]
        status: Option<JobStatus>,

        #[arg(long, default_value_t = 50)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Show one job as JSON
    Show { job_id: Uuid },

    /// Delete a job
    Delete { job_id: Uuid },

    /// Export a job
    Export {
        job_id: Uuid,

        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Write the export to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config =
        load_config_or_default(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from {}", path.display());
    }

    let mut store = open_store(&config.storage).context("failed to open job store")?;

    match cli.command {
        Command::Scrape {
            target,
            selectors,
            render,
            wait,
            crawl,
            max_pages,
            format,
            output,
        } => {
            let mut request = ScrapeRequest::new(target);
            if !selectors.is_empty() {
                request = request.with_selectors(selectors);
            }
            request.render = render;
            request.wait_time = wait;
            request.crawl_site = crawl;
            request.max_pages = max_pages;

            handle_scrape(config, &mut *store, request, format, output).await
        }
        Command::Jobs { action } => handle_jobs(&mut *store, action),
        Command::Analytics { summary } => handle_analytics(&*store, summary),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence over the flags when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("site_harvester=info,warn"),
                1 => EnvFilter::new("site_harvester=debug,info"),
                2 => EnvFilter::new("site_harvester=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one scrape as a stored job and prints or writes its export
async fn handle_scrape(
    config: HarvesterConfig,
    store: &mut dyn JobStore,
    request: ScrapeRequest,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config).context("failed to create coordinator")?;

    let job = store.create_job(request)?;
    tracing::info!("Created job {}", job.job_id);

    let result = run_job(store, &coordinator, job.job_id).await;
    coordinator.shutdown().await;
    let job = result?;

    emit(&job, format, output)?;

    if job.status == JobStatus::Failed {
        bail!(
            "job {} failed: {}",
            job.job_id,
            job.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn handle_jobs(store: &mut dyn JobStore, action: JobsAction) -> anyhow::Result<()> {
    match action {
        JobsAction::List {
            status,
            limit,
            offset,
        } => {
            let jobs = store.list_jobs(&JobFilter {
                status,
                limit,
                offset,
            })?;

            if jobs.is_empty() {
                println!("No jobs found");
            }
            for job in &jobs {
                println!(
                    "{}  {:<9}  {}  {}",
                    job.job_id,
                    job.status.to_db_string(),
                    job.created_at.format("%Y-%m-%d %H:%M:%S"),
                    job.request.url
                );
            }
        }
        JobsAction::Show { job_id } => {
            let job = store.get_job(job_id)?;
            println!("{}", export_job(&job, ExportFormat::Json)?);
        }
        JobsAction::Delete { job_id } => {
            if !store.delete_job(job_id)? {
                bail!("job {} not found", job_id);
            }
            println!("Deleted job {}", job_id);
        }
        JobsAction::Export {
            job_id,
            format,
            output,
        } => {
            let job = store.get_job(job_id)?;
            emit(&job, format, output)?;
        }
    }
    Ok(())
}

fn handle_analytics(store: &dyn JobStore, summary: bool) -> anyhow::Result<()> {
    let analytics = JobAnalytics::load(store)?;

    if summary {
        print_analytics(&analytics);
    } else {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
    }
    Ok(())
}

/// Prints a job export to stdout or writes it to `output`
fn emit(
    job: &site_harvester::storage::JobRecord,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    match output {
        Some(path) => write_export(job, format, &path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", export_job(job, format)?),
    }
    Ok(())
}
