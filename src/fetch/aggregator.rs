use crate::config::types::Config;
use crate::cursor::{self, carried_cursors, next_cursors};
use crate::fetch::types::{FetchRequest, LogEntry, Page, SourceDescriptor};
use crate::fetch::worker::{byte_budget, fetch_source, SourcePlan};
use crate::kube::traits::LogStreamer;
use crate::source::LineFilter;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Tuning for page assembly
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub container: String,
    pub min_entries_per_source: usize,
    pub bytes_per_entry: u64,
    /// Upper bound on pods streamed at once; `None` streams all of them
    pub max_concurrent_sources: Option<usize>,
    /// Keep inbound cursors of pods that delivered nothing this page
    pub carry_forward_cursors: bool,
    pub page_timeout: Option<Duration>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            container: "application".to_string(),
            min_entries_per_source: 10,
            bytes_per_entry: 3072,
            max_concurrent_sources: None,
            carry_forward_cursors: false,
            page_timeout: None,
        }
    }
}

impl From<&Config> for FetchSettings {
    fn from(config: &Config) -> Self {
        Self {
            container: config.kubernetes.container.clone(),
            min_entries_per_source: config.fetch.min_entries_per_source,
            bytes_per_entry: config.fetch.bytes_per_entry,
            max_concurrent_sources: config.fetch.max_concurrent_sources,
            carry_forward_cursors: config.fetch.carry_forward_cursors,
            page_timeout: config.fetch.page_timeout,
        }
    }
}

/// Fans a page request out to one task per pod and merges the results
pub struct Aggregator {
    streamer: Arc<dyn LogStreamer>,
    settings: FetchSettings,
}

impl Aggregator {
    pub fn new(streamer: Arc<dyn LogStreamer>, settings: FetchSettings) -> Self {
        Self { streamer, settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Build one page from `sources`.
    ///
    /// Waits for every pod before sorting, so a slow pod delays the whole
    /// page. Pods that fail simply contribute no entries.
    pub async fn aggregate(&self, sources: Vec<SourceDescriptor>, request: &FetchRequest) -> Page {
        if sources.is_empty() {
            return Page::empty();
        }

        let cursors = cursor::decode(&request.next_page_token);
        let max_bytes = byte_budget(
            request.limit,
            sources.len(),
            self.settings.min_entries_per_source,
            self.settings.bytes_per_entry,
        );
        let filter = Arc::new(LineFilter::new(&request.filter_pattern));
        let collected: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
        // Zero permits would park every worker forever
        let limiter = self.settings.max_concurrent_sources.map(|permits| {
            let permits = permits.clamp(1, Semaphore::MAX_PERMITS);
            Arc::new(Semaphore::new(permits))
        });

        debug!(
            sources = sources.len(),
            cursors = cursors.len(),
            max_bytes = max_bytes,
            "Fetching page"
        );

        // Dropping the set aborts every worker, so a page abandoned by its
        // caller leaves no stream running behind it
        let mut workers = JoinSet::new();
        for source in sources {
            let plan = SourcePlan::new(
                source,
                &cursors,
                request.start_time.as_deref(),
                &request.namespace,
                &self.settings.container,
                max_bytes,
            );
            let streamer = Arc::clone(&self.streamer);
            let filter = Arc::clone(&filter);
            let collected = Arc::clone(&collected);
            let limiter = limiter.clone();

            workers.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                let entries = fetch_source(streamer.as_ref(), &plan, &filter).await;
                if entries.is_empty() {
                    return;
                }

                collected
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(entries);
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Fetch worker did not complete");
            }
        }

        let entries = match Arc::try_unwrap(collected) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => {
                std::mem::take(&mut *shared.lock().unwrap_or_else(PoisonError::into_inner))
            }
        };

        let results = sort_and_truncate(entries, request.limit);
        let next = if self.settings.carry_forward_cursors {
            carried_cursors(&results, &cursors)
        } else {
            next_cursors(&results)
        };

        Page {
            results,
            next_page_token: cursor::encode(&next),
        }
    }
}

/// Order entries by timestamp and keep the earliest `limit`.
///
/// The sort is stable: equal timestamps keep the order their pods'
/// batches were appended in.
pub fn sort_and_truncate(mut entries: Vec<LogEntry>, limit: usize) -> Vec<LogEntry> {
    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    entries.truncate(limit);
    entries
}
