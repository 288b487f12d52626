//! In-memory pod directory and log streamer for exercising the pager

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use podlog::fetch::SourceDescriptor;
use podlog::kube::{
    DirectoryError, LineStream, LogStreamer, SourceDirectory, SourceSelector, StreamError,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One recorded `open_stream` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCall {
    pub source_id: String,
    pub container: String,
    pub since: Option<String>,
    pub max_bytes: u64,
}

#[derive(Default)]
pub struct StaticDirectory {
    pods: Vec<SourceDescriptor>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticDirectory {
    pub fn new(pods: Vec<SourceDescriptor>) -> Self {
        Self {
            pods,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceDirectory for StaticDirectory {
    async fn list_sources(
        &self,
        _selector: &SourceSelector,
        _namespace: &str,
    ) -> Result<Vec<SourceDescriptor>, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DirectoryError::List("connection refused".to_string()));
        }
        Ok(self.pods.clone())
    }

    async fn get_source(
        &self,
        _namespace: &str,
        id: &str,
    ) -> Result<Option<SourceDescriptor>, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DirectoryError::Get {
                id: id.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self
            .pods
            .iter()
            .find(|pod| pod.name == id || pod.id == id)
            .cloned())
    }
}

/// Serves canned log lines per pod id.
///
/// Like the kubelet, `since` is inclusive and `max_bytes` cuts the log
/// after the line that crosses the cap.
#[derive(Default)]
pub struct StaticStreamer {
    logs: HashMap<String, Vec<String>>,
    broken: HashSet<String>,
    hanging: HashSet<String>,
    calls: Mutex<Vec<OpenCall>>,
}

impl StaticStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logs(mut self, source_id: &str, lines: &[&str]) -> Self {
        self.logs.insert(
            source_id.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    pub fn with_broken(mut self, source_id: &str) -> Self {
        self.broken.insert(source_id.to_string());
        self
    }

    pub fn with_hanging(mut self, source_id: &str) -> Self {
        self.hanging.insert(source_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<OpenCall> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        calls
    }
}

#[async_trait]
impl LogStreamer for StaticStreamer {
    async fn open_stream(
        &self,
        source: &SourceDescriptor,
        _namespace: &str,
        container: &str,
        since: Option<&str>,
        max_bytes: u64,
    ) -> Result<LineStream, StreamError> {
        self.calls.lock().unwrap().push(OpenCall {
            source_id: source.id.clone(),
            container: container.to_string(),
            since: since.map(str::to_string),
            max_bytes,
        });

        if self.broken.contains(&source.id) {
            return Err(StreamError::Open("container not found".to_string()));
        }
        if self.hanging.contains(&source.id) {
            futures::future::pending::<()>().await;
        }

        let mut served = 0u64;
        let mut lines: Vec<Result<String, StreamError>> = Vec::new();
        for line in self.logs.get(&source.id).cloned().unwrap_or_default() {
            if served >= max_bytes {
                break;
            }
            if let Some(since) = since {
                let ts = line.split(' ').next().unwrap_or("");
                if ts < since {
                    continue;
                }
            }
            served += line.len() as u64 + 1;
            lines.push(Ok(line));
        }

        Ok(futures::stream::iter(lines).boxed())
    }
}

pub fn pod(name: &str, id: &str) -> SourceDescriptor {
    SourceDescriptor::new(name, id)
}
