//! Crawl orchestration across search-result domains
//!
//! The orchestrator runs one search, then fans out one [`DomainCrawler`]
//! per result URL as independent tokio tasks:
//! - fan-out is capped by a semaphore (`max-concurrent-domains`)
//! - a panicking crawl becomes a failed [`DomainCrawlResult`]
//! - results come back in search order regardless of completion order
//! - cancellation aborts every outstanding task and discards the session

mod analysis;

pub use analysis::{analyze, EXCERPT_LIMIT};

use crate::config::Config;
use crate::crawler::{build_fetcher, CrawlLimits, DomainCrawler, FetchOptions, PageFetcher};
use crate::model::{CrawlSessionResult, DomainCrawlResult};
use crate::search::{DuckDuckGoClient, SearchClient};
use crate::FathomError;
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Search-then-crawl driver
#[derive(Clone)]
pub struct Orchestrator {
    search: Arc<dyn SearchClient>,
    fetcher: Arc<dyn PageFetcher>,
    limits: CrawlLimits,
    options: FetchOptions,
    max_concurrent_domains: usize,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("limits", &self.limits)
            .field("options", &self.options)
            .field("max_concurrent_domains", &self.max_concurrent_domains)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator from explicit collaborators
    ///
    /// A `max_concurrent_domains` of zero is treated as one.
    pub fn new(
        search: Arc<dyn SearchClient>,
        fetcher: Arc<dyn PageFetcher>,
        limits: CrawlLimits,
        options: FetchOptions,
        max_concurrent_domains: usize,
    ) -> Self {
        Self {
            search,
            fetcher,
            limits,
            options,
            max_concurrent_domains: max_concurrent_domains.max(1),
        }
    }

    /// Creates an orchestrator using the DuckDuckGo client and the
    /// configured fetcher backend
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(FathomError)` - An HTTP client could not be built
    pub fn from_config(config: &Config) -> Result<Self, FathomError> {
        let search = Arc::new(DuckDuckGoClient::new(&config.search)?);
        let fetcher = build_fetcher(&config.fetcher)?;

        Ok(Self::new(
            search,
            fetcher,
            CrawlLimits::from_config(&config.crawler),
            FetchOptions::from_config(&config.fetcher),
            config.crawler.max_concurrent_domains,
        ))
    }

    /// Searches for `query` and crawls up to `num_results` result domains
    ///
    /// With `deep_crawl` off only each result's landing page is fetched.
    /// When the search returns nothing the session has `success = false`
    /// and `error = "No search results found"`.
    pub async fn search_and_deep_scrape(
        &self,
        query: &str,
        num_results: usize,
        deep_crawl: bool,
    ) -> CrawlSessionResult {
        match self
            .run(query, num_results, deep_crawl, CancellationToken::new())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                let mut session = CrawlSessionResult::no_results(query, deep_crawl);
                session.error = Some(e.to_string());
                session
            }
        }
    }

    /// Same as [`Orchestrator::search_and_deep_scrape`], but stops when
    /// `cancel` fires
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSessionResult)` - The session ran to completion
    /// * `Err(FathomError::Cancelled)` - Cancelled; no partial session is kept
    pub async fn run(
        &self,
        query: &str,
        num_results: usize,
        deep_crawl: bool,
        cancel: CancellationToken,
    ) -> Result<CrawlSessionResult, FathomError> {
        let search_results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FathomError::Cancelled),
            results = self.search.search(query, num_results) => results,
        };

        if search_results.is_empty() {
            tracing::warn!("No search results for \"{}\"", query);
            return Ok(CrawlSessionResult::no_results(query, deep_crawl));
        }

        let urls: Vec<String> = search_results.iter().map(|r| r.url.clone()).collect();
        tracing::info!(
            "{} {} domains...",
            if deep_crawl { "Deep scraping" } else { "Scraping" },
            urls.len()
        );

        let domain_results = self.crawl_all(&urls, deep_crawl, &cancel).await?;

        let successful = domain_results.iter().filter(|d| d.success).count();
        tracing::info!(
            "Successfully scraped {} out of {} domains",
            successful,
            urls.len()
        );

        let analysis = analyze(&domain_results);

        Ok(CrawlSessionResult {
            query: query.to_string(),
            success: true,
            error: None,
            timestamp: Utc::now(),
            deep_crawl_enabled: deep_crawl,
            search_results,
            domain_results,
            analysis,
        })
    }

    /// Crawls every URL concurrently and returns results in input order
    pub async fn crawl_all(
        &self,
        urls: &[String],
        deep_crawl: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<DomainCrawlResult>, FathomError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_domains));
        let mut tasks = JoinSet::new();

        for (index, url) in urls.iter().enumerate() {
            let crawler = DomainCrawler::new(self.fetcher.clone(), self.limits, self.options.clone())
                .with_cancellation(cancel.child_token());
            let semaphore = semaphore.clone();
            let url = url.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring only fails on shutdown
                let _permit = semaphore.acquire_owned().await;

                let crawl = async {
                    if deep_crawl {
                        crawler.crawl(&url).await
                    } else {
                        crawler.single_page(&url).await
                    }
                };

                let result = match AssertUnwindSafe(crawl).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        tracing::error!("Crawl of {} panicked: {}", url, message);
                        DomainCrawlResult::failed(url.as_str(), message)
                    }
                };

                (index, result)
            });
        }

        let mut slots: Vec<Option<DomainCrawlResult>> = vec![None; urls.len()];

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Cancelling {} outstanding domain crawls", tasks.len());
                    tasks.abort_all();
                    return Err(FathomError::Cancelled);
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok((index, result))) => slots[index] = Some(result),
                    Some(Err(e)) => tracing::error!("Domain crawl task failed: {}", e),
                    None => break,
                },
            }
        }

        Ok(slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| DomainCrawlResult::failed(url.as_str(), "crawl task did not complete"))
            })
            .collect())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "domain crawl panicked".to_string()
    }
}
