//! Crawler coordinator - crawl orchestration
//!
//! The coordinator owns one run from seed to completion:
//! - Validating the root URL and recording it in the dedup store
//! - Seeding the link queue
//! - Dispatching queued URLs to crawl tasks, one worker token each
//! - Waiting on the completion barrier and building the final report

use crate::config::Config;
use crate::crawler::barrier::{CompletionBarrier, CrawlCounts};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::pool::WorkerPool;
use crate::crawler::queue::{link_queue, LinkReceiver};
use crate::crawler::task::{CrawlStats, CrawlTask, TaskContext};
use crate::store::DedupStore;
use crate::url::parse_root_url;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Outcome of a completed crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub root: String,
    pub workers: usize,
    /// URLs accepted into the link queue, seed included
    pub discovered: u64,
    /// Crawl tasks that ended; equals the number of pages visited
    pub finished: u64,
    /// Links pushed by crawl tasks (the seed is not counted)
    pub links_enqueued: u64,
    pub fetch_failures: u64,
    pub store_failures: u64,
    /// Candidates dropped as malformed, foreign or root-path
    pub skipped_links: u64,
    /// Identifiers held by the dedup store when the run ended
    pub ledger_entries: usize,
    /// Those identifiers, sorted
    pub visited_sites: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// True when every discovered URL was processed
    pub fn is_balanced(&self) -> bool {
        self.discovered == self.finished
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    root: Url,
    workers: usize,
    store: Arc<dyn DedupStore>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn LinkExtractor>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `root_url` - Absolute http(s) URL the crawl starts from
    /// * `workers` - Number of pages fetched concurrently
    /// * `store` - Dedup store shared by all tasks
    /// * `fetcher` - Source of page bodies
    /// * `extractor` - Source of candidate links
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError::InvalidRootUrl)` - The root is not absolute http(s) with a host
    pub fn new(
        root_url: &str,
        workers: usize,
        store: Arc<dyn DedupStore>,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> crate::Result<Self> {
        let root = parse_root_url(root_url).map_err(|reason| CrawlError::InvalidRootUrl {
            url: root_url.to_string(),
            reason,
        })?;

        Ok(Self {
            root,
            workers: workers.max(1),
            store,
            fetcher,
            extractor,
        })
    }

    /// Runs the crawl until every discovered URL has been processed
    ///
    /// Per-page failures never abort the run; only a ledger failure while
    /// recording the root does.
    pub async fn run(self) -> crate::Result<CrawlReport> {
        let started_at = Utc::now();
        let start_time = Instant::now();
        tracing::info!(root = %self.root, workers = self.workers, "Starting crawl");

        let barrier = Arc::new(CompletionBarrier::new());
        let (sink, receiver) = link_queue(barrier.clone());
        let pool = WorkerPool::new(self.workers);
        let stats = Arc::new(CrawlStats::default());

        if self.store.was_already_visited(self.root.as_str())? {
            tracing::info!(root = %self.root, "Root already recorded in ledger");
        }
        sink.push(self.root.clone())?;

        let ctx = TaskContext {
            root: Arc::new(self.root.clone()),
            store: self.store.clone(),
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            sink,
            stats: stats.clone(),
        };

        let counts = tokio::select! {
            counts = barrier.wait() => counts,
            () = dispatch(receiver, pool.clone(), ctx) => {
                tracing::warn!("Dispatch stopped before the crawl completed");
                barrier.counts()
            }
        };
        pool.close();

        let report = self.build_report(counts, &stats, started_at, start_time.elapsed())?;
        tracing::info!(
            discovered = report.discovered,
            finished = report.finished,
            fetch_failures = report.fetch_failures,
            "Crawl completed in {:?}",
            report.elapsed
        );
        Ok(report)
    }

    fn build_report(
        &self,
        counts: CrawlCounts,
        stats: &CrawlStats,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> crate::Result<CrawlReport> {
        let stats = stats.snapshot();
        let visited_sites = self.store.visited_sites()?;
        Ok(CrawlReport {
            root: self.root.to_string(),
            workers: self.workers,
            discovered: counts.discovered,
            finished: counts.finished,
            links_enqueued: stats.links_enqueued,
            fetch_failures: stats.fetch_failures,
            store_failures: stats.store_failures,
            skipped_links: stats.skipped_links,
            ledger_entries: visited_sites.len(),
            visited_sites,
            started_at,
            finished_at: Utc::now(),
            elapsed,
        })
    }
}

/// Pulls queued URLs and spawns a crawl task for each, one token per task
///
/// Only returns if the queue or the pool is closed; normally it is dropped
/// when the barrier completes.
async fn dispatch(mut receiver: LinkReceiver, pool: WorkerPool, ctx: TaskContext) {
    while let Some(url) = receiver.recv().await {
        let Some(token) = pool.acquire().await else {
            break;
        };
        tracing::debug!(worker = token.id(), url = %url, "Dispatching page");
        let task = CrawlTask::new(url, token, ctx.clone());
        tokio::spawn(task.run());
    }
}

/// Runs a crawl described by `config` against an already opened store
///
/// # Example
///
/// ```no_run
/// use hostcrawl::config::load_config;
/// use hostcrawl::crawler::run_crawl;
/// use hostcrawl::store::open_store;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("hostcrawl.toml"))?;
/// let store = Arc::new(open_store(&config.ledger)?);
/// let report = run_crawl(&config, store).await?;
/// println!("visited {} pages", report.finished);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    store: Arc<dyn DedupStore>,
) -> crate::Result<CrawlReport> {
    let fetcher = HttpFetcher::from_config(
        &config.user_agent,
        Duration::from_secs(config.crawler.request_timeout_secs),
    )?;

    let coordinator = Coordinator::new(
        &config.crawler.root_url,
        config.crawler.workers as usize,
        store,
        Arc::new(fetcher),
        Arc::new(HtmlLinkExtractor::new()),
    )?;
    coordinator.run().await
}
