//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` seam
//! - HTML link extraction
//! - The worker pool, link queue and completion barrier
//! - Overall crawl coordination

mod barrier;
mod coordinator;
mod fetcher;
mod parser;
mod pool;
mod queue;
mod task;

pub use barrier::{BarrierError, CompletionBarrier, CrawlCounts};
pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher, MAX_BODY_BYTES};
pub use parser::{HtmlLinkExtractor, LinkExtractor};
pub use pool::{WorkerPool, WorkerToken};
pub use queue::{link_queue, LinkReceiver, LinkSink, PushError};
pub use task::{CrawlStats, CrawlTask, StatsSnapshot, TaskContext};

use crate::config::Config;
use crate::store::{open_store, DedupStore};
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the ledger described by the configuration
/// 2. Clear it when `fresh` is set
/// 3. Build the HTTP fetcher
/// 4. Crawl from the root until every discovered page is processed
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
/// * `fresh` - Whether to forget visits recorded by earlier runs
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(CrawlError)` - Startup failed (config, ledger or HTTP client)
pub async fn crawl(config: Config, fresh: bool) -> crate::Result<CrawlReport> {
    let store = open_store(&config.ledger)?;
    if fresh {
        tracing::info!("Starting fresh crawl (clearing recorded visits)");
        store.clear()?;
    } else {
        let prior = store.visited_count()?;
        if prior > 0 {
            tracing::info!("Ledger already holds {} visited pages", prior);
        }
    }
    run_crawl(&config, Arc::new(store)).await
}
