use crate::cursor::CursorMap;
use crate::fetch::types::{LogEntry, SourceDescriptor};
use crate::kube::traits::{LineStream, LogStreamer};
use crate::source::{parse_line, LineFilter};
use futures::StreamExt;
use tracing::{debug, trace, warn};

/// Everything one worker needs to fetch a single pod's page contribution
#[derive(Debug, Clone)]
pub struct SourcePlan {
    pub source: SourceDescriptor,
    pub namespace: String,
    pub container: String,
    /// Lower bound passed to the log API
    pub since: Option<String>,
    /// Lines at or before this timestamp were delivered on an earlier page
    pub cursor: Option<String>,
    pub max_bytes: u64,
}

impl SourcePlan {
    /// Resolve the since/cursor bounds for `source` from the inbound cursors
    pub fn new(
        source: SourceDescriptor,
        cursors: &CursorMap,
        start_time: Option<&str>,
        namespace: &str,
        container: &str,
        max_bytes: u64,
    ) -> Self {
        let cursor = cursors.bound(&source.id).after().map(str::to_string);
        let since = cursor
            .clone()
            .or_else(|| start_time.filter(|s| !s.is_empty()).map(str::to_string));

        Self {
            source,
            namespace: namespace.to_string(),
            container: container.to_string(),
            since,
            cursor,
            max_bytes,
        }
    }
}

/// Byte cap for one pod's log request.
///
/// Each pod gets an even share of `limit`, but never fewer than
/// `min_entries_per_source` entries' worth of bytes.
pub fn byte_budget(
    limit: usize,
    source_count: usize,
    min_entries_per_source: usize,
    bytes_per_entry: u64,
) -> u64 {
    let share = limit.checked_div(source_count).unwrap_or(limit);
    let entries = share.max(min_entries_per_source) as u64;
    entries.saturating_mul(bytes_per_entry)
}

/// Fetch, validate, deduplicate and filter one pod's log.
///
/// Failures never escape: a pod whose stream can't be opened contributes
/// nothing, and a read error ends the pod's contribution early.
pub async fn fetch_source(
    streamer: &dyn LogStreamer,
    plan: &SourcePlan,
    filter: &LineFilter,
) -> Vec<LogEntry> {
    let stream = match streamer
        .open_stream(
            &plan.source,
            &plan.namespace,
            &plan.container,
            plan.since.as_deref(),
            plan.max_bytes,
        )
        .await
    {
        Ok(stream) => stream,
        Err(e) => {
            warn!(
                source_id = %plan.source.id,
                pod = %plan.source.name,
                error = %e,
                "Failed to open log stream, skipping pod"
            );
            return Vec::new();
        }
    };

    let entries = collect_entries(stream, &plan.source, plan.cursor.as_deref(), filter).await;

    debug!(
        source_id = %plan.source.id,
        pod = %plan.source.name,
        entries = entries.len(),
        "Fetched pod logs"
    );

    entries
}

/// Drain `lines`, keeping those that parse, are newer than `cursor` and
/// pass `filter`
pub async fn collect_entries(
    mut lines: LineStream,
    source: &SourceDescriptor,
    cursor: Option<&str>,
    filter: &LineFilter,
) -> Vec<LogEntry> {
    let mut entries = Vec::new();

    while let Some(next) = lines.next().await {
        let line = match next {
            Ok(line) => line,
            Err(e) => {
                warn!(
                    source_id = %source.id,
                    kept = entries.len(),
                    error = %e,
                    "Log stream read failed"
                );
                break;
            }
        };

        let parsed = match parse_line(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                trace!(source_id = %source.id, error = %e, "Dropping line");
                continue;
            }
        };

        // Strictly newer than the cursor, or it was already delivered
        if let Some(cursor) = cursor {
            if parsed.timestamp <= cursor {
                continue;
            }
        }

        if !filter.matches(&line) {
            continue;
        }

        entries.push(LogEntry {
            message: parsed.message.to_string(),
            timestamp: parsed.timestamp.to_string(),
            source: source.clone(),
        });
    }

    entries
}
