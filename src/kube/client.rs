use crate::config::types::KubernetesConfig;
use crate::fetch::types::SourceDescriptor;
use crate::kube::selector::SourceSelector;
use crate::kube::traits::{DirectoryError, LineStream, LogStreamer, SourceDirectory, StreamError};
use crate::source::parse_timestamp;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;
use tracing::debug;

#[derive(Debug, Error)]
pub enum KubeClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API server returned error status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("failed to read bearer token: {0}")]
    Token(#[source] std::io::Error),

    #[error("bearer token is not a valid header value")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, KubeClientError>;

/// Minimal Kubernetes REST client: pod discovery and log streaming
#[derive(Debug, Clone)]
pub struct KubeClient {
    base_url: String,
    base_selector: String,
    client: reqwest::Client,
}

impl KubeClient {
    pub fn new(config: &KubernetesConfig, base_selector: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(path) = &config.token_path {
            let token = std::fs::read_to_string(path).map_err(KubeClientError::Token)?;
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            base_selector: base_selector.to_string(),
            client,
        })
    }

    fn pods_url(&self, namespace: &str) -> String {
        format!("{}/api/v1/namespaces/{}/pods", self.base_url, namespace)
    }

    /// GET /api/v1/namespaces/{ns}/pods?labelSelector=...
    pub async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<SourceDescriptor>> {
        let mut request = self.client.get(self.pods_url(namespace));
        if !label_selector.is_empty() {
            request = request.query(&[("labelSelector", label_selector)]);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let pods: PodList = response.json().await?;
        Ok(pods.items.into_iter().map(Pod::into_descriptor).collect())
    }

    /// GET /api/v1/namespaces/{ns}/pods/{name}, `None` on 404
    pub async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<SourceDescriptor>> {
        let url = format!("{}/{}", self.pods_url(namespace), name);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let pod: Pod = response.json().await?;
        Ok(Some(pod.into_descriptor()))
    }
}

#[async_trait]
impl SourceDirectory for KubeClient {
    async fn list_sources(
        &self,
        selector: &SourceSelector,
        namespace: &str,
    ) -> std::result::Result<Vec<SourceDescriptor>, DirectoryError> {
        let label_selector = selector.label_selector(&self.base_selector);
        debug!(namespace = %namespace, selector = %label_selector, "Listing pods");

        self.list_pods(namespace, &label_selector)
            .await
            .map_err(|e| DirectoryError::List(e.to_string()))
    }

    async fn get_source(
        &self,
        namespace: &str,
        id: &str,
    ) -> std::result::Result<Option<SourceDescriptor>, DirectoryError> {
        let to_error = |e: KubeClientError| DirectoryError::Get {
            id: id.to_string(),
            message: e.to_string(),
        };

        if let Some(pod) = self.get_pod(namespace, id).await.map_err(to_error)? {
            return Ok(Some(pod));
        }

        // Not a pod name; it may be a uid
        let pods = self
            .list_pods(namespace, &self.base_selector)
            .await
            .map_err(to_error)?;
        Ok(pods.into_iter().find(|pod| pod.id == id))
    }
}

#[async_trait]
impl LogStreamer for KubeClient {
    async fn open_stream(
        &self,
        source: &SourceDescriptor,
        namespace: &str,
        container: &str,
        since: Option<&str>,
        max_bytes: u64,
    ) -> std::result::Result<LineStream, StreamError> {
        let url = format!("{}/{}/log", self.pods_url(namespace), source.name);
        let mut query = vec![
            ("container", container.to_string()),
            ("timestamps", "true".to_string()),
            ("limitBytes", max_bytes.to_string()),
        ];
        // The API rejects malformed sinceTime, so only pass valid ones
        if let Some(since) = since.filter(|s| parse_timestamp(s).is_ok()) {
            query.push(("sinceTime", since.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| StreamError::Open(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StreamError::Open(api_error(response).await.to_string()));
        }

        Ok(into_line_stream(response))
    }
}

/// Split a streamed response body into lines without buffering it whole.
///
/// Bytes that aren't valid UTF-8 are replaced rather than failing the line.
fn into_line_stream(response: reqwest::Response) -> LineStream {
    let body = response
        .bytes_stream()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
    let segments = StreamReader::new(Box::pin(body)).split(b'\n');

    futures::stream::unfold(segments, |mut segments| async move {
        match segments.next_segment().await {
            Ok(Some(mut bytes)) => {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                let line = String::from_utf8_lossy(&bytes).into_owned();
                Some((Ok(line), segments))
            }
            Ok(None) => None,
            Err(e) => Some((Err(StreamError::Io(e)), segments)),
        }
    })
    .boxed()
}

async fn api_error(response: reqwest::Response) -> KubeClientError {
    KubeClientError::ApiError {
        status: response.status().as_u16(),
        message: response.text().await.unwrap_or_default(),
    }
}

#[derive(Debug, Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    metadata: PodMetadata,
}

#[derive(Debug, Deserialize)]
struct PodMetadata {
    name: String,
    #[serde(default)]
    uid: String,
}

impl Pod {
    fn into_descriptor(self) -> SourceDescriptor {
        SourceDescriptor::new(self.metadata.name, self.metadata.uid)
    }
}
