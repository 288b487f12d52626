use crate::fetch::aggregator::{Aggregator, FetchSettings};
use crate::fetch::types::{FetchRequest, Page, SourceDescriptor};
use crate::kube::traits::{DirectoryError, LogStreamer, SourceDirectory};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("namespace is required")]
    MissingNamespace,

    #[error("source discovery failed: {0}")]
    Discovery(#[from] DirectoryError),

    #[error("page not assembled within {0:?}")]
    Timeout(Duration),
}

/// Entry point for page requests: discovery followed by aggregation
pub struct LogPager {
    directory: Arc<dyn SourceDirectory>,
    aggregator: Aggregator,
}

impl LogPager {
    pub fn new(
        directory: Arc<dyn SourceDirectory>,
        streamer: Arc<dyn LogStreamer>,
        settings: FetchSettings,
    ) -> Self {
        Self {
            directory,
            aggregator: Aggregator::new(streamer, settings),
        }
    }

    pub async fn fetch_page(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        if request.namespace.trim().is_empty() {
            return Err(FetchError::MissingNamespace);
        }

        let page = match self.aggregator.settings().page_timeout {
            Some(limit) => tokio::time::timeout(limit, self.assemble(request))
                .await
                .map_err(|_| FetchError::Timeout(limit))??,
            None => self.assemble(request).await?,
        };

        info!(
            namespace = %request.namespace,
            entries = page.results.len(),
            has_token = !page.next_page_token.is_empty(),
            "Page assembled"
        );

        Ok(page)
    }

    async fn assemble(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        let sources = self.discover(request).await?;
        Ok(self.aggregator.aggregate(sources, request).await)
    }

    /// Resolve the pods for a request; a single `instance_id` narrows it to
    /// that pod, or to nothing when it doesn't exist
    pub async fn discover(
        &self,
        request: &FetchRequest,
    ) -> Result<Vec<SourceDescriptor>, FetchError> {
        let sources = match request.instance_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => self
                .directory
                .get_source(&request.namespace, id)
                .await?
                .into_iter()
                .collect(),
            None => {
                self.directory
                    .list_sources(&request.selector, &request.namespace)
                    .await?
            }
        };
        Ok(sources)
    }
}
