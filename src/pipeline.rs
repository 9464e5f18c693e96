use std::sync::Arc;
use std::time::Duration;

use futures::{future, stream, StreamExt};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::CategoryConfig;
use crate::fetcher::FeedFetcher;
use crate::normalize::{normalize_entry, Entry};

/// One category's aggregated view: the normalized entries of every
/// reachable feed, most recent first.
#[derive(Debug, Clone)]
pub struct CategoryEntries {
    pub name: String,
    pub entries: Vec<Entry>,
    /// Feeds that could not be fetched or parsed this run
    pub failed_feeds: usize,
}

pub struct FeedPipeline {
    fetcher: FeedFetcher,
    max_concurrent_fetches: usize,
}

impl FeedPipeline {
    pub fn new(fetcher: FeedFetcher, max_concurrent_fetches: usize) -> Self {
        Self {
            fetcher,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
        }
    }

    /// Aggregate every category concurrently, preserving config order
    /// in the result.
    pub async fn run(&self, categories: &[CategoryConfig]) -> Vec<CategoryEntries> {
        future::join_all(
            categories
                .iter()
                .map(|c| self.aggregate_category(&c.name, &c.feeds)),
        )
        .await
    }

    /// Fetch and normalize all feeds of one category.
    ///
    /// Fetches fan out up to the concurrency bound; `buffered` yields
    /// results in URL-list order, so after the stable sort entries with
    /// equal timestamps keep their submission order (URL position, then
    /// document position) no matter which fetch completes first.
    ///
    /// A failing feed is logged and counted, never aborts the category.
    /// A category whose feeds all fail aggregates to an empty list.
    pub async fn aggregate_category(&self, name: &str, urls: &[String]) -> CategoryEntries {
        let mut pending = Vec::with_capacity(urls.len());
        for url in urls {
            pending.push(self.fetcher.fetch(url));
        }
        let results = stream::iter(pending)
            .buffered(self.max_concurrent_fetches)
            .collect::<Vec<_>>()
            .await;

        let mut entries = Vec::new();
        let mut failed_feeds = 0;
        for (url, result) in urls.iter().zip(results) {
            match result {
                Ok(feed) => {
                    let feed_title = feed.title.map(|t| t.content);
                    for raw in feed.entries {
                        entries.push(normalize_entry(raw, feed_title.as_deref(), url));
                    }
                }
                Err(e) => {
                    failed_feeds += 1;
                    error!("Skipping feed: {}", e);
                }
            }
        }

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        CategoryEntries {
            name: name.to_string(),
            entries,
            failed_feeds,
        }
    }
}

/// Owns the pipeline and the latest aggregated snapshot served to the
/// renderer. Each refresh refetches everything; no state is carried
/// between runs beyond the snapshot swap.
pub struct Refresher {
    pipeline: FeedPipeline,
    categories: Vec<CategoryConfig>,
    snapshot: RwLock<Arc<Vec<CategoryEntries>>>,
    refreshing: RwLock<bool>,
}

impl Refresher {
    pub fn new(pipeline: FeedPipeline, categories: Vec<CategoryConfig>) -> Self {
        Self {
            pipeline,
            categories,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            refreshing: RwLock::new(false),
        }
    }

    pub async fn is_refreshing(&self) -> bool {
        *self.refreshing.read().await
    }

    /// The most recently aggregated view (empty before the first run).
    pub async fn latest(&self) -> Arc<Vec<CategoryEntries>> {
        self.snapshot.read().await.clone()
    }

    pub async fn refresh(&self) {
        // Check if already refreshing
        {
            let mut refreshing = self.refreshing.write().await;
            if *refreshing {
                info!("Refresh already in progress, skipping");
                return;
            }
            *refreshing = true;
        }

        info!(
            "Refreshing {} feeds in {} categories",
            self.categories.iter().map(|c| c.feeds.len()).sum::<usize>(),
            self.categories.len()
        );
        let result = self.pipeline.run(&self.categories).await;
        *self.snapshot.write().await = Arc::new(result);

        // Clear refreshing flag
        {
            let mut refreshing = self.refreshing.write().await;
            *refreshing = false;
        }

        info!("Feed refresh complete");
    }
}

pub async fn start_background_refresh(refresher: Arc<Refresher>, interval_minutes: u64) {
    let interval = Duration::from_secs(interval_minutes * 60);

    // Do initial fetch
    info!("Starting initial feed fetch");
    refresher.refresh().await;

    // Then schedule periodic refreshes
    loop {
        tokio::time::sleep(interval).await;
        info!("Starting scheduled feed refresh");
        refresher.refresh().await;
    }
}
