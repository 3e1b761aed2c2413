//! Fathom main entry point
//!
//! This is the command-line interface: search, crawl the result domains,
//! print a summary and write whatever outputs were asked for.

use anyhow::Context;
use clap::Parser;
use fathom::config::{load_config_with_hash, validate, Config};
use fathom::model::CrawlSessionResult;
use fathom::notify::{digest_record, Notification, Notifier, TripTarget, WebhookNotifier};
use fathom::output::{print_summary, save_session, truncated_json, write_markdown_dir};
use fathom::storage::{open_store, RecordStore};
use fathom::{FathomError, Orchestrator};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const EXIT_NO_RESULTS: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

/// Fathom: search the web and crawl what comes back
///
/// Runs a DuckDuckGo search, then crawls each result's domain breadth-first
/// within depth and page budgets, extracting text, links, metadata,
/// structured data and tables.
#[derive(Parser, Debug)]
#[command(name = "fathom")]
#[command(version)]
#[command(about = "Search-driven, domain-scoped web crawler", long_about = None)]
struct Cli {
    /// Search query
    #[arg(long, required_unless_present = "interactive")]
    query: Option<String>,

    /// Prompt for queries in a loop instead of running once
    #[arg(short, long, conflicts_with = "query")]
    interactive: bool,

    /// Number of search results (domains) to crawl
    #[arg(short, long)]
    domains: Option<usize>,

    /// Maximum link depth from each seed page
    #[arg(short = 'p', long)]
    depth: Option<u32>,

    /// Maximum pages fetched per domain
    #[arg(short, long)]
    max_pages: Option<usize>,

    /// Fetch only each result's landing page
    #[arg(long)]
    no_deep_crawl: bool,

    /// Write the full session as JSON to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write one Markdown file per crawled page into this directory
    #[arg(long, value_name = "DIR")]
    markdown_dir: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database for notification records
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Record (and, if enabled, send) a digest of the session for this trip
    #[arg(long)]
    trip_id: Option<String>,

    /// Trip leg the digest belongs to
    #[arg(long, requires = "trip_id")]
    leg_request_id: Option<String>,

    /// Recipient of the digest
    #[arg(long, requires = "trip_id")]
    email: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fathom=info,warn"),
            1 => EnvFilter::new("fathom=debug,info"),
            2 => EnvFilter::new("fathom=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };
    apply_overrides(&mut config, &cli);
    validate(&config)?;

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling crawl");
            watcher.cancel();
        }
    });

    if cli.interactive {
        return interactive(config, cancel).await;
    }

    let query = cli
        .query
        .as_deref()
        .context("--query is required unless --interactive is given")?;
    let orchestrator = Orchestrator::from_config(&config)?;

    tracing::info!(
        "Searching for '{}' and {} top {} results",
        query,
        if config.crawler.deep_crawl { "deep crawling" } else { "scraping" },
        config.crawler.num_results
    );

    let session = match orchestrator
        .run(
            query,
            config.crawler.num_results,
            config.crawler.deep_crawl,
            cancel,
        )
        .await
    {
        Ok(session) => session,
        Err(FathomError::Cancelled) => {
            eprintln!("Crawl cancelled");
            return Ok(ExitCode::from(EXIT_CANCELLED));
        }
        Err(e) => return Err(e.into()),
    };

    print_summary(&session);
    write_outputs(&config, &session)?;

    if let Some(trip_id) = &cli.trip_id {
        let target = TripTarget {
            trip_id: trip_id.clone(),
            leg_request_id: cli.leg_request_id.clone().unwrap_or_default(),
            email: cli.email.clone().unwrap_or_default(),
        };
        deliver_digest(&config, &session, &target).await?;
    }

    if session.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_NO_RESULTS))
    }
}

/// Applies command-line flags on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(domains) = cli.domains {
        config.crawler.num_results = domains;
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if cli.no_deep_crawl {
        config.crawler.deep_crawl = false;
    }
    if let Some(output) = &cli.output {
        config.output.json_path = Some(output.display().to_string());
    }
    if let Some(dir) = &cli.markdown_dir {
        config.output.markdown_dir = Some(dir.display().to_string());
    }
    if let Some(database) = &cli.database {
        config.output.database_path = Some(database.display().to_string());
    }
}

fn write_outputs(config: &Config, session: &CrawlSessionResult) -> anyhow::Result<()> {
    if let Some(path) = &config.output.json_path {
        let written = save_session(Path::new(path), session)?;
        println!("Results saved to {}", written.display());
    }

    if let Some(dir) = &config.output.markdown_dir {
        let count = write_markdown_dir(Path::new(dir), session)?;
        tracing::info!("Wrote {} markdown files", count);
        println!("Markdown files saved to {}/", dir.trim_end_matches('/'));
    }

    if config.output.json_path.is_none() {
        println!("\n--- Full Results Summary (truncated) ---");
        println!("{}", truncated_json(session)?);
        println!("\nNote: Full results not shown. Use --output to save complete data.");
    }

    Ok(())
}

/// Stores the session digest and sends it, as configured
async fn deliver_digest(
    config: &Config,
    session: &CrawlSessionResult,
    target: &TripTarget,
) -> anyhow::Result<()> {
    let record = digest_record(session, target);

    match &config.output.database_path {
        Some(path) => {
            let mut store = open_store(Path::new(path))
                .with_context(|| format!("Failed to open record store {}", path))?;
            let id = store.save(&record)?;
            tracing::info!("Stored digest {} for trip {}", id, target.trip_id);
        }
        None => tracing::debug!("No database configured, digest not stored"),
    }

    if config.notify.enabled {
        let notifier = WebhookNotifier::new(&config.notify)?;
        notifier.send(&Notification::from(&record)).await?;
    } else {
        tracing::debug!("Notifications disabled, digest not sent");
    }

    Ok(())
}

/// Line-based prompts on stdin that give up when the session is cancelled
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
    cancel: CancellationToken,
}

impl Prompt {
    fn new(cancel: CancellationToken) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            cancel,
        }
    }

    /// Returns the trimmed answer, or `None` on end of input or Ctrl-C
    async fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        print!("{}", question);
        std::io::stdout().flush()?;

        tokio::select! {
            _ = self.cancel.cancelled() => Ok(None),
            line = self.lines.next_line() => Ok(line?.map(|l| l.trim().to_string())),
        }
    }

    /// Asks for a number, falling back to `default` on blank or invalid input
    async fn ask_number<T>(&mut self, question: &str, default: T) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr + std::fmt::Display + Copy,
    {
        let Some(answer) = self.ask(question).await? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(Some(default));
        }
        match answer.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                println!("Not a number, using {}", default);
                Ok(Some(default))
            }
        }
    }
}

/// Runs searches one after another, prompting for each query
///
/// Depth and page budgets are asked once up front. Each query then asks for
/// the number of domains and whether to deep crawl, prints the summary and
/// offers to save the session as JSON.
async fn interactive(mut config: Config, cancel: CancellationToken) -> anyhow::Result<ExitCode> {
    println!("Fathom - Interactive Mode");
    println!("=========================");

    let mut prompt = Prompt::new(cancel.clone());

    let depth_question = format!("Enter crawl depth (default: {}): ", config.crawler.max_depth);
    let Some(depth) = prompt.ask_number(&depth_question, config.crawler.max_depth).await? else {
        return Ok(ExitCode::SUCCESS);
    };
    let pages_question = format!(
        "Enter max pages per domain (default: {}): ",
        config.crawler.max_pages
    );
    let Some(max_pages) = prompt.ask_number(&pages_question, config.crawler.max_pages).await? else {
        return Ok(ExitCode::SUCCESS);
    };
    config.crawler.max_depth = depth;
    config.crawler.max_pages = max_pages;
    validate(&config)?;

    let orchestrator = Orchestrator::from_config(&config)?;

    loop {
        println!();
        let Some(query) = prompt.ask("Enter search query (or 'exit' to quit): ").await? else {
            break;
        };
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit" | "q") {
            break;
        }

        let domains_question = format!(
            "Number of domains to crawl (default: {}): ",
            config.crawler.num_results
        );
        let Some(num_results) = prompt.ask_number(&domains_question, config.crawler.num_results).await?
        else {
            break;
        };
        let Some(deep) = prompt.ask("Perform deep crawling? (y/n, default: y): ").await? else {
            break;
        };
        let deep_crawl = !deep.eq_ignore_ascii_case("n");

        println!(
            "\nSearching for '{}' and {} top {} results...",
            query,
            if deep_crawl { "deep crawling" } else { "scraping" },
            num_results
        );

        let session = match orchestrator
            .run(&query, num_results, deep_crawl, cancel.clone())
            .await
        {
            Ok(session) => session,
            Err(FathomError::Cancelled) => {
                eprintln!("Crawl cancelled");
                return Ok(ExitCode::from(EXIT_CANCELLED));
            }
            Err(e) => return Err(e.into()),
        };

        print_summary(&session);
        if !session.success {
            continue;
        }

        let Some(save) = prompt.ask("\nSave results to file? (y/n, default: n): ").await? else {
            break;
        };
        if !save.eq_ignore_ascii_case("y") {
            continue;
        }

        let Some(name) = prompt.ask("Enter filename (without extension): ").await? else {
            break;
        };
        let name = if name.is_empty() {
            format!("search_{}", session.timestamp.timestamp())
        } else {
            name
        };
        match save_session(Path::new(&name), &session) {
            Ok(written) => println!("Results saved to {}", written.display()),
            Err(e) => eprintln!("Failed to save results: {}", e),
        }
    }

    if cancel.is_cancelled() {
        return Ok(ExitCode::from(EXIT_CANCELLED));
    }
    Ok(ExitCode::SUCCESS)
}
