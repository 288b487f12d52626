use super::codec::{encode, CursorMap};
use crate::fetch::types::LogEntry;

/// Build the cursor map for the page that follows `entries`.
///
/// `entries` must already be sorted and truncated: each source ends up
/// pointing at its newest delivered entry.
pub fn next_cursors(entries: &[LogEntry]) -> CursorMap {
    let mut cursors = CursorMap::new();
    for entry in entries {
        cursors.insert(entry.source.id.clone(), entry.timestamp.clone());
    }
    cursors
}

/// Like [`next_cursors`], but sources absent from `entries` keep the
/// cursor they arrived with.
pub fn carried_cursors(entries: &[LogEntry], inbound: &CursorMap) -> CursorMap {
    let mut cursors = next_cursors(entries);
    for (source_id, _) in inbound.iter() {
        if cursors.contains(source_id) {
            continue;
        }
        if let Some(ts) = inbound.bound(source_id).after() {
            cursors.insert(source_id, ts);
        }
    }
    cursors
}

/// Encode the next page token for `entries`
pub fn generate_token(entries: &[LogEntry]) -> String {
    encode(&next_cursors(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::codec::decode;
    use crate::fetch::types::SourceDescriptor;

    fn entry(source_id: &str, ts: &str) -> LogEntry {
        LogEntry {
            message: format!("line at {}", ts),
            timestamp: ts.to_string(),
            source: SourceDescriptor::new(format!("pod-{}", source_id), source_id),
        }
    }

    #[test]
    fn test_empty_page_has_empty_token() {
        assert_eq!(generate_token(&[]), "");
    }

    #[test]
    fn test_last_entry_per_source_wins() {
        let entries = vec![
            entry("a", "2025-01-01T00:00:01Z"),
            entry("b", "2025-01-01T00:00:02Z"),
            entry("a", "2025-01-01T00:00:03Z"),
        ];

        let cursors = decode(&generate_token(&entries));
        assert_eq!(cursors.len(), 2);
        assert_eq!(cursors.get("a"), Some("2025-01-01T00:00:03Z"));
        assert_eq!(cursors.get("b"), Some("2025-01-01T00:00:02Z"));
    }

    #[test]
    fn test_carry_keeps_silent_sources() {
        let inbound: CursorMap = [
            ("a", "2025-01-01T00:00:00Z"),
            ("b", "2025-01-01T00:00:00Z"),
            ("c", "null"),
        ]
        .into_iter()
        .collect();
        let entries = vec![entry("a", "2025-01-01T00:00:05Z")];

        let cursors = carried_cursors(&entries, &inbound);
        assert_eq!(cursors.get("a"), Some("2025-01-01T00:00:05Z"));
        assert_eq!(cursors.get("b"), Some("2025-01-01T00:00:00Z"));
        assert!(!cursors.contains("c"));
    }
}
