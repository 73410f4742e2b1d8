//! Crawl task: processing of one page
//!
//! A task fetches its page, extracts candidate links, filters them to the
//! root's host and pushes unseen ones onto the link queue. Every per-page
//! failure is contained here: it is logged, counted in [`CrawlStats`] and
//! the task still ends normally.

use crate::crawler::barrier::CompletionBarrier;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::LinkExtractor;
use crate::crawler::pool::WorkerToken;
use crate::crawler::queue::LinkSink;
use crate::store::DedupStore;
use crate::url::{check_candidate, resolve_candidate};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use url::Url;

/// Per-run failure and progress counters shared by all tasks
#[derive(Debug, Default)]
pub struct CrawlStats {
    links_enqueued: AtomicU64,
    fetch_failures: AtomicU64,
    store_failures: AtomicU64,
    skipped_links: AtomicU64,
}

/// Plain copy of [`CrawlStats`] taken at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub links_enqueued: u64,
    pub fetch_failures: u64,
    pub store_failures: u64,
    pub skipped_links: u64,
}

impl CrawlStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            skipped_links: self.skipped_links.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Dependencies shared by every task of a run
#[derive(Clone)]
pub struct TaskContext {
    pub root: Arc<Url>,
    pub store: Arc<dyn DedupStore>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: Arc<dyn LinkExtractor>,
    pub sink: LinkSink,
    pub stats: Arc<CrawlStats>,
}

/// Ends a task exactly once: the worker token is released, then the
/// barrier is told the task finished.
///
/// Dropped after the task body, so every push the task made is already
/// counted when the finish is reported. Also runs if the body panics.
struct TaskCompletion {
    token: Option<WorkerToken>,
    barrier: Arc<CompletionBarrier>,
}

impl Drop for TaskCompletion {
    fn drop(&mut self) {
        drop(self.token.take());
        self.barrier.on_finished();
    }
}

/// One unit of crawl work bound to a page and a worker token
pub struct CrawlTask {
    page: Url,
    ctx: TaskContext,
    completion: TaskCompletion,
}

impl CrawlTask {
    pub fn new(page: Url, token: WorkerToken, ctx: TaskContext) -> Self {
        let completion = TaskCompletion {
            token: Some(token),
            barrier: ctx.sink.barrier().clone(),
        };
        Self {
            page,
            ctx,
            completion,
        }
    }

    fn worker(&self) -> usize {
        self.completion.token.as_ref().map_or(0, WorkerToken::id)
    }

    /// Processes the page; never fails, failures are logged and counted
    pub async fn run(self) {
        let worker = self.worker();
        let url = self.page.as_str();

        let body = match self.ctx.fetcher.fetch(&self.page).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(worker, url, error = %e, "Failed to fetch page");
                CrawlStats::bump(&self.ctx.stats.fetch_failures);
                return;
            }
        };

        let candidates = self.ctx.extractor.extract_links(&body, &self.page);
        tracing::debug!(worker, url, candidates = candidates.len(), "Fetched page");

        for href in &candidates {
            if !self.handle_candidate(worker, href) {
                break;
            }
        }
        // `self.completion` drops here, after every push above.
    }

    /// Handles one href; returns `false` when the task should stop early
    fn handle_candidate(&self, worker: usize, href: &str) -> bool {
        let url = self.page.as_str();

        let candidate = match resolve_candidate(href, &self.page) {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(worker, url, href, error = %e, "Skipping malformed link");
                CrawlStats::bump(&self.ctx.stats.skipped_links);
                return true;
            }
        };

        if let Err(reason) = check_candidate(&candidate, &self.ctx.root) {
            tracing::debug!(worker, url, link = %candidate, reason = reason.as_str(), "Skipping link");
            CrawlStats::bump(&self.ctx.stats.skipped_links);
            return true;
        }

        match self.ctx.store.was_already_visited(candidate.as_str()) {
            Ok(true) => true,
            Ok(false) => {
                tracing::info!(worker, url, link = %candidate, "Discovered link");
                match self.ctx.sink.push(candidate) {
                    Ok(()) => {
                        CrawlStats::bump(&self.ctx.stats.links_enqueued);
                        true
                    }
                    Err(e) => {
                        tracing::warn!(worker, url, error = %e, "Could not enqueue link");
                        false
                    }
                }
            }
            Err(e) => {
                tracing::error!(worker, url, link = %candidate, error = %e, "Ledger update failed");
                CrawlStats::bump(&self.ctx.stats.store_failures);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::FetchError;
    use crate::crawler::parser::HtmlLinkExtractor;
    use crate::crawler::pool::WorkerPool;
    use crate::crawler::queue::{link_queue, LinkReceiver};
    use crate::store::{JsonLedgerStore, MemoryLedger, StoreError, StoreResult};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
            self.pages
                .get(url.as_str())
                .map(|body| body.clone().into_bytes())
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    struct BrokenStore;

    impl DedupStore for BrokenStore {
        fn was_already_visited(&self, _url: &str) -> StoreResult<bool> {
            Err(StoreError::Poisoned)
        }
        fn visited_count(&self) -> StoreResult<usize> {
            Ok(0)
        }
        fn visited_sites(&self) -> StoreResult<Vec<String>> {
            Ok(Vec::new())
        }
        fn clear(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    fn setup(
        pages: &[(&str, &str)],
        store: Arc<dyn DedupStore>,
    ) -> (TaskContext, LinkReceiver, Arc<CompletionBarrier>) {
        let barrier = Arc::new(CompletionBarrier::new());
        let (sink, receiver) = link_queue(barrier.clone());
        let fetcher = MapFetcher {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
        };
        let ctx = TaskContext {
            root: Arc::new(Url::parse("http://root.com/").unwrap()),
            store,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(HtmlLinkExtractor::new()),
            sink,
            stats: Arc::new(CrawlStats::default()),
        };
        (ctx, receiver, barrier)
    }

    fn memory_store() -> Arc<dyn DedupStore> {
        Arc::new(JsonLedgerStore::open(MemoryLedger::new()).unwrap())
    }

    async fn run_page(ctx: &TaskContext, pool: &WorkerPool, page: &str) {
        // Stand-in for the seed push done by the coordinator
        ctx.sink.barrier().on_discovered().unwrap();
        let token = pool.acquire().await.unwrap();
        CrawlTask::new(Url::parse(page).unwrap(), token, ctx.clone())
            .run()
            .await;
    }

    #[tokio::test]
    async fn test_pushes_only_unseen_same_host_links() {
        let html = r#"
            <a href="/">home</a>
            <a href="">self</a>
            <a href="http://other.com/x">other</a>
            <a href="http://root.com/a">a</a>
            <a href="relative/b">b</a>
            <a href="/a#section">a again</a>
        "#;
        let (ctx, mut receiver, barrier) = setup(&[("http://root.com/", html)], memory_store());
        let pool = WorkerPool::new(1);

        run_page(&ctx, &pool, "http://root.com/").await;

        assert_eq!(receiver.recv().await.unwrap().as_str(), "http://root.com/a");
        assert_eq!(
            receiver.recv().await.unwrap().as_str(),
            "http://root.com/relative/b"
        );

        let stats = ctx.stats.snapshot();
        assert_eq!(stats.links_enqueued, 2);
        assert_eq!(stats.skipped_links, 3);
        assert_eq!(
            barrier.counts(),
            crate::crawler::CrawlCounts {
                discovered: 3,
                finished: 1
            }
        );
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_still_finishes() {
        let (ctx, _receiver, barrier) = setup(&[], memory_store());
        let pool = WorkerPool::new(1);

        run_page(&ctx, &pool, "http://root.com/missing").await;

        assert_eq!(ctx.stats.snapshot().fetch_failures, 1);
        assert!(barrier.is_complete());
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_stops_candidates() {
        let html = r#"<a href="/a">a</a><a href="/b">b</a>"#;
        let (ctx, _receiver, barrier) =
            setup(&[("http://root.com/", html)], Arc::new(BrokenStore));
        let pool = WorkerPool::new(1);

        run_page(&ctx, &pool, "http://root.com/").await;

        let stats = ctx.stats.snapshot();
        assert_eq!(stats.store_failures, 1);
        assert_eq!(stats.links_enqueued, 0);
        assert!(barrier.is_complete());
    }

    #[tokio::test]
    async fn test_malformed_link_skipped() {
        let html = r#"<a href="http://[::1/x">bad</a><a href="/ok">ok</a>"#;
        let (ctx, mut receiver, _barrier) =
            setup(&[("http://root.com/", html)], memory_store());
        let pool = WorkerPool::new(1);

        run_page(&ctx, &pool, "http://root.com/").await;

        assert_eq!(receiver.recv().await.unwrap().as_str(), "http://root.com/ok");
        assert_eq!(ctx.stats.snapshot().skipped_links, 1);
    }
}
