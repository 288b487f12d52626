use crate::kube::selector::SourceSelector;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 100;

/// Identity of one pod whose logs are fetched
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub id: String,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// A single delivered log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    #[serde(rename = "datetime")]
    pub timestamp: String,
    #[serde(rename = "pod")]
    pub source: SourceDescriptor,
}

/// One page of aggregated logs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub results: Vec<LogEntry>,
    pub next_page_token: String,
}

impl Page {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Parameters of a single page request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub selector: SourceSelector,
    pub namespace: String,
    pub limit: usize,
    pub next_page_token: String,
    pub filter_pattern: String,
    pub start_time: Option<String>,
    pub instance_id: Option<String>,
}

impl FetchRequest {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            selector: SourceSelector::default(),
            namespace: namespace.into(),
            limit: DEFAULT_LIMIT,
            next_page_token: String::new(),
            filter_pattern: String::new(),
            start_time: None,
            instance_id: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = token.into();
        self
    }

    pub fn with_filter(mut self, pattern: impl Into<String>) -> Self {
        self.filter_pattern = pattern.into();
        self
    }

    pub fn with_start_time(mut self, start_time: impl Into<String>) -> Self {
        self.start_time = Some(start_time.into());
        self
    }

    pub fn with_selector(mut self, selector: SourceSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }
}
