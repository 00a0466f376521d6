//! Loki push API body.
//!
//! ```json
//! {"streams": [{"stream": {"service_name": "urlx"}, "values": [["1700000000000000000", "{...}"]]}]}
//! ```
//!
//! Each entry becomes its own stream, even when neighbours share a label
//! set. Grouping by labels would shrink the body but has not been checked
//! against the sink, so the one-stream-per-entry shape stays.

use serde::Serialize;

use super::entry::{LogEntry, Labels};

/// Labels applied to entries that carry none of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultLabels {
    pub language: String,
    pub source: String,
    pub service_name: String,
}

impl DefaultLabels {
    /// 按条目的服务名生成默认标签
    pub fn for_service(&self, service: &str) -> Labels {
        let mut labels = Labels::new();
        labels.insert("Language".to_string(), self.language.clone());
        labels.insert("source".to_string(), self.source.clone());
        labels.insert("service_name".to_string(), service.to_string());
        labels
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushRequest {
    pub streams: Vec<Stream>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stream {
    pub stream: Labels,
    /// `[timestamp_ns, line]` pairs; the timestamp is a decimal string.
    pub values: Vec<[String; 2]>,
}

impl PushRequest {
    pub fn from_batch(batch: &[LogEntry], defaults: &DefaultLabels) -> Self {
        let streams = batch
            .iter()
            .map(|entry| Stream {
                stream: entry
                    .labels()
                    .cloned()
                    .unwrap_or_else(|| defaults.for_service(entry.service())),
                values: vec![[entry.timestamp_nanos().to_string(), entry.line().to_string()]],
            })
            .collect();

        Self { streams }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shipping::LogLevel;

    fn defaults() -> DefaultLabels {
        DefaultLabels {
            language: "Rust".to_string(),
            source: "Code".to_string(),
            service_name: "urlx".to_string(),
        }
    }

    #[test]
    fn test_one_stream_per_entry_in_order() {
        let batch = vec![
            LogEntry::new("a", LogLevel::Info, "urlx"),
            LogEntry::new("b", LogLevel::Info, "urlx"),
            LogEntry::new("c", LogLevel::Error, "urlx"),
        ];

        let push = PushRequest::from_batch(&batch, &defaults());

        assert_eq!(push.streams.len(), 3);
        let lines: Vec<&str> = push.streams.iter().map(|s| s.values[0][1].as_str()).collect();
        assert_eq!(lines, ["a", "b", "c"]);
        assert!(push.streams.iter().all(|s| s.values.len() == 1));
    }

    #[test]
    fn test_default_labels_use_entry_service() {
        let batch = vec![LogEntry::new("x", LogLevel::Warn, "worker")];
        let push = PushRequest::from_batch(&batch, &defaults());

        let labels = &push.streams[0].stream;
        assert_eq!(labels.get("Language").map(String::as_str), Some("Rust"));
        assert_eq!(labels.get("source").map(String::as_str), Some("Code"));
        assert_eq!(labels.get("service_name").map(String::as_str), Some("worker"));
    }

    #[test]
    fn test_explicit_labels_replace_defaults() {
        let mut labels = Labels::new();
        labels.insert("team".to_string(), "edge".to_string());
        let batch = vec![LogEntry::new("x", LogLevel::Info, "urlx").with_labels(labels.clone())];

        let push = PushRequest::from_batch(&batch, &defaults());

        assert_eq!(push.streams[0].stream, labels);
    }

    #[test]
    fn test_wire_shape() {
        let entry = LogEntry::new("{\"msg\":\"hi\"}", LogLevel::Info, "urlx");
        let expected_ts = entry.timestamp_nanos().to_string();
        let push = PushRequest::from_batch(&[entry], &defaults());

        let json = serde_json::to_value(&push).unwrap();
        let value = &json["streams"][0]["values"][0];
        assert_eq!(value[0], serde_json::Value::String(expected_ts));
        assert_eq!(value[1], "{\"msg\":\"hi\"}");
        assert_eq!(json["streams"][0]["stream"]["service_name"], "urlx");
    }
}
