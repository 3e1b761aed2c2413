//! Breadth-first crawl of a single domain
//!
//! A [`DomainCrawler`] walks outward from one seed URL, visiting same-domain
//! links level by level until the frontier runs dry, the page budget is
//! spent, or its cancellation token fires. Pages are fetched one at a time.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::page::{fetch_page, FetchOptions};
use crate::model::DomainCrawlResult;
use crate::state::CrawlState;
use crate::url::{domain, parse_valid, same_domain};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Depth and page budgets for one domain crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Deepest link distance from the seed that will be fetched
    pub max_depth: u32,

    /// Maximum number of fetch attempts, failed ones included
    pub max_pages: usize,

    /// Pause between consecutive fetches
    pub politeness_delay: Duration,
}

impl CrawlLimits {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_pages: config.max_pages,
            politeness_delay: Duration::from_millis(config.politeness_delay_ms),
        }
    }
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Crawls one domain breadth-first
#[derive(Clone)]
pub struct DomainCrawler {
    fetcher: Arc<dyn PageFetcher>,
    limits: CrawlLimits,
    options: FetchOptions,
    cancel: CancellationToken,
}

impl std::fmt::Debug for DomainCrawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainCrawler")
            .field("limits", &self.limits)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DomainCrawler {
    /// Creates a crawler that is never cancelled
    pub fn new(fetcher: Arc<dyn PageFetcher>, limits: CrawlLimits, options: FetchOptions) -> Self {
        Self {
            fetcher,
            limits,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Stops the crawl between pages once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn limits(&self) -> CrawlLimits {
        self.limits
    }

    /// Crawls the seed's domain breadth-first
    ///
    /// # Algorithm
    ///
    /// 1. Validate the seed; an invalid seed fails immediately with no I/O
    /// 2. Pop the oldest `(url, depth)` from the frontier, skipping visited URLs
    /// 3. Fetch it; failures are recorded and count toward the page budget
    /// 4. A redirect target is marked visited. If it was visited already the
    ///    page is a duplicate and is not recorded. If the seed itself
    ///    redirects to another host, that host becomes the crawl's scope
    /// 5. On success, if `depth < max_depth`, enqueue its in-scope links
    ///    at `depth + 1` in document order
    /// 6. Repeat until the frontier is empty or `max_pages` fetches were made
    ///
    /// # Returns
    ///
    /// A [`DomainCrawlResult`] whose `success` is true whenever the seed was
    /// valid. Per-page outcomes are on each page.
    pub async fn crawl(&self, start_url: &str) -> DomainCrawlResult {
        let seed = match parse_valid(start_url) {
            Ok((seed, _)) => seed,
            Err(e) => {
                tracing::warn!("{}", e);
                return DomainCrawlResult::failed(start_url, "Invalid URL format");
            }
        };

        let domain = domain(&seed).unwrap_or_default();
        let mut scope = seed.clone();
        tracing::info!(
            "Starting deep crawl from {} (max depth {}, max pages {})",
            seed,
            self.limits.max_depth,
            self.limits.max_pages
        );

        let mut frontier = Frontier::new(&seed);
        let mut pages = Vec::new();
        let mut fetches = 0;

        while fetches < self.limits.max_pages {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl of {} cancelled", domain);
                break;
            }

            let Some(next) = frontier.pop() else {
                break;
            };

            if fetches > 0 && !self.limits.politeness_delay.is_zero() {
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.limits.politeness_delay) => {}
                }
            }

            let mut state = advance(&next.url, CrawlState::Queued, CrawlState::Fetching);

            let page = tokio::select! {
                _ = self.cancel.cancelled() => break,
                page = fetch_page(self.fetcher.as_ref(), &next.url, next.depth, &self.options) => page,
            };
            fetches += 1;

            if let Some(final_url) = &page.final_url {
                if !frontier.mark_visited(final_url) {
                    tracing::debug!(
                        "{} redirected to already visited {}, not recording it",
                        page.url,
                        final_url
                    );
                    continue;
                }
                if next.depth == 0 && !same_domain(&scope, final_url) {
                    tracing::info!("Seed {} redirected to {}, crawling that domain", seed, final_url);
                    scope = final_url.clone();
                }
            }

            if page.success {
                state = advance(&page.url, state, CrawlState::Extracted);

                if next.depth < self.limits.max_depth {
                    let added = page
                        .links
                        .iter()
                        .filter(|link| same_domain(&scope, link))
                        .filter(|link| frontier.push(link, next.depth + 1))
                        .count();
                    tracing::debug!(
                        "{}: queued {} new links at depth {}",
                        page.url,
                        added,
                        next.depth + 1
                    );
                }
            } else {
                state = advance(&page.url, state, CrawlState::Failed);
            }

            advance(&page.url, state, CrawlState::Done);
            pages.push(page);
        }

        tracing::info!(
            "Deep crawl of {} complete: {} pages, {} still queued",
            domain,
            pages.len(),
            frontier.len()
        );

        DomainCrawlResult {
            start_url: seed,
            domain,
            success: true,
            pages,
            error: None,
        }
    }

    /// Fetches only the seed page, for runs without deep crawling
    ///
    /// Unlike [`DomainCrawler::crawl`], `success` mirrors the page's own
    /// success and a failed fetch's error is copied onto the result.
    pub async fn single_page(&self, url: &str) -> DomainCrawlResult {
        let normalized = match parse_valid(url) {
            Ok((normalized, _)) => normalized,
            Err(e) => {
                tracing::warn!("{}", e);
                return DomainCrawlResult::failed(url, "Invalid URL format");
            }
        };

        let page = fetch_page(self.fetcher.as_ref(), &normalized, 0, &self.options).await;

        DomainCrawlResult {
            domain: domain(&normalized).unwrap_or_default(),
            start_url: normalized,
            success: page.success,
            error: page.error.clone(),
            pages: vec![page],
        }
    }
}

fn advance(url: &str, state: CrawlState, next: CrawlState) -> CrawlState {
    state.transition(next).unwrap_or_else(|e| {
        tracing::error!("{}: {}", url, e);
        next
    })
}
