use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::BTreeMap;
use tracing::debug;

/// Legacy placeholder values older tokens carry for "no cursor"
const BLANK_SENTINELS: [&str; 2] = ["null", "empty"];

/// Per-source timestamp of the last entry delivered on a previous page.
///
/// Keys are source ids. The map is ordered so the same cursors always
/// encode to the same token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorMap {
    entries: BTreeMap<String, String>,
}

/// How a single source's cursor reads out of a [`CursorMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorBound<'a> {
    /// No entry for this source
    Absent,
    /// Entry present but empty or a placeholder
    Blank,
    /// Deliver only lines strictly newer than this timestamp
    After(&'a str),
}

impl<'a> CursorBound<'a> {
    pub fn after(self) -> Option<&'a str> {
        match self {
            CursorBound::After(ts) => Some(ts),
            CursorBound::Absent | CursorBound::Blank => None,
        }
    }
}

impl CursorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.entries.get(source_id).map(String::as_str)
    }

    pub fn insert(&mut self, source_id: impl Into<String>, timestamp: impl Into<String>) {
        self.entries.insert(source_id.into(), timestamp.into());
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.entries.contains_key(source_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn bound(&self, source_id: &str) -> CursorBound<'_> {
        match self.entries.get(source_id) {
            None => CursorBound::Absent,
            Some(ts) if ts.is_empty() || BLANK_SENTINELS.contains(&ts.as_str()) => {
                CursorBound::Blank
            }
            Some(ts) => CursorBound::After(ts),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CursorMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Decode a page token into its cursor map.
///
/// An empty token, bad base64 or anything other than a flat JSON object of
/// strings all yield an empty map, which restarts from the start time.
pub fn decode(token: &str) -> CursorMap {
    if token.is_empty() {
        return CursorMap::new();
    }

    let bytes = match STANDARD.decode(token) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Discarding page token with invalid base64");
            return CursorMap::new();
        }
    };

    match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
        Ok(entries) => CursorMap { entries },
        Err(e) => {
            debug!(error = %e, "Discarding page token with invalid cursor payload");
            CursorMap::new()
        }
    }
}

/// Encode a cursor map as a page token. An empty map encodes to `""`.
pub fn encode(cursors: &CursorMap) -> String {
    if cursors.is_empty() {
        return String::new();
    }

    match serde_json::to_vec(&cursors.entries) {
        Ok(json) => STANDARD.encode(json),
        Err(e) => {
            debug!(error = %e, "Failed to serialize cursor map");
            String::new()
        }
    }
}
