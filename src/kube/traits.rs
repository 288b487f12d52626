use crate::fetch::types::SourceDescriptor;
use crate::kube::selector::SourceSelector;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lines of one pod's log, yielded as they arrive
pub type LineStream = BoxStream<'static, Result<String, StreamError>>;

/// Resolves which pods make up a log query
#[async_trait]
pub trait SourceDirectory: Send + Sync {
    async fn list_sources(
        &self,
        selector: &SourceSelector,
        namespace: &str,
    ) -> Result<Vec<SourceDescriptor>, DirectoryError>;

    /// Look up a single pod by name or uid
    async fn get_source(
        &self,
        namespace: &str,
        id: &str,
    ) -> Result<Option<SourceDescriptor>, DirectoryError>;
}

/// Opens the raw, timestamp-prefixed log of one pod
#[async_trait]
pub trait LogStreamer: Send + Sync {
    async fn open_stream(
        &self,
        source: &SourceDescriptor,
        namespace: &str,
        container: &str,
        since: Option<&str>,
        max_bytes: u64,
    ) -> Result<LineStream, StreamError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to list pods: {0}")]
    List(String),

    #[error("failed to get pod '{id}': {message}")]
    Get { id: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to open log stream: {0}")]
    Open(String),

    #[error("log stream read failed: {0}")]
    Io(#[from] std::io::Error),
}
