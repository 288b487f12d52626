use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("empty line")]
    Empty,

    #[error("line has no message after the timestamp")]
    MissingMessage,

    #[error("failed to parse timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A validated `<timestamp> <message>` line.
///
/// The timestamp is kept exactly as received; ordering and cursor checks
/// compare it as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub timestamp: &'a str,
    pub message: &'a str,
}

/// Split a raw log line at its first space and validate the timestamp prefix
pub fn parse_line(line: &str) -> Result<ParsedLine<'_>, LineError> {
    if line.is_empty() {
        return Err(LineError::Empty);
    }

    let Some((timestamp, message)) = line.split_once(' ') else {
        return Err(LineError::MissingMessage);
    };

    parse_timestamp(timestamp)?;

    Ok(ParsedLine { timestamp, message })
}

/// Parse an RFC 3339 timestamp, with or without a fractional second part
/// (nanosecond precision is the form the kubelet writes).
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, LineError> {
    DateTime::parse_from_rfc3339(value).map_err(|source| LineError::InvalidTimestamp {
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanosecond_timestamp() {
        let parsed = parse_line("2025-09-04T15:24:34.944759409Z GET /health 200").unwrap();

        assert_eq!(parsed.timestamp, "2025-09-04T15:24:34.944759409Z");
        assert_eq!(parsed.message, "GET /health 200");
    }

    #[test]
    fn test_second_precision_timestamp() {
        let parsed = parse_line("2025-09-04T15:24:34Z started").unwrap();

        assert_eq!(parsed.timestamp, "2025-09-04T15:24:34Z");
        assert_eq!(parsed.message, "started");
    }

    #[test]
    fn test_offset_timestamp_kept_verbatim() {
        let parsed = parse_line("2025-09-04T15:24:34+05:30 local time").unwrap();

        assert_eq!(parsed.timestamp, "2025-09-04T15:24:34+05:30");
    }

    #[test]
    fn test_message_keeps_extra_spaces() {
        let parsed = parse_line("2025-09-04T15:24:34Z  indented   text ").unwrap();

        assert_eq!(parsed.message, " indented   text ");
    }

    #[test]
    fn test_empty_message_after_separator_is_valid() {
        let parsed = parse_line("2025-09-04T15:24:34Z ").unwrap();

        assert_eq!(parsed.message, "");
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(parse_line(""), Err(LineError::Empty));
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            parse_line("2025-09-04T15:24:34Z"),
            Err(LineError::MissingMessage)
        );
    }

    #[test]
    fn test_invalid_timestamp() {
        let result = parse_line("not-a-time hello");

        assert!(matches!(result, Err(LineError::InvalidTimestamp { .. })));
    }

    #[test]
    fn test_date_only_is_rejected() {
        assert!(parse_line("2025-09-04 15:24:34 split date").is_err());
    }

    #[test]
    fn test_missing_zone_is_rejected() {
        assert!(parse_line("2025-09-04T15:24:34 no zone").is_err());
    }
}
