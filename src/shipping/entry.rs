use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Label set attached to a stream on the sink side.
pub type Labels = BTreeMap<String, String>;

/// Ordered run of entries handed to the transport in one call.
pub type Batch = Vec<LogEntry>;

/// 日志级别
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One log line waiting to be shipped.
///
/// Built at the call site and never modified afterwards; the flush thread
/// consumes it exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    line: String,
    level: LogLevel,
    service: String,
    labels: Option<Labels>,
    timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(line: impl Into<String>, level: LogLevel, service: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            level,
            service: service.into(),
            labels: None,
            timestamp: Utc::now(),
        }
    }

    /// Replaces the default label set for this entry.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn labels(&self) -> Option<&Labels> {
        self.labels.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Unix timestamp in nanoseconds, as the sink expects it.
    pub fn timestamp_nanos(&self) -> i64 {
        self.timestamp.timestamp_nanos_opt().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_level_round_trips_through_string() {
        for level in LogLevel::iter() {
            assert_eq!(LogLevel::from_str(level.as_ref()).unwrap(), level);
        }
        assert_eq!(LogLevel::from_str("WARN").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("fatal").is_err());
    }

    #[test]
    fn test_level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LogLevel::Error).unwrap(), "\"error\"");
        assert_eq!(LogLevel::Debug.to_string(), "debug");
    }

    #[test]
    fn test_entry_keeps_creation_time() {
        let before = Utc::now();
        let entry = LogEntry::new("{}", LogLevel::Info, "urlx");
        assert!(entry.timestamp() >= before);
        assert!(entry.timestamp_nanos() > 0);
        assert!(entry.labels().is_none());
    }
}
