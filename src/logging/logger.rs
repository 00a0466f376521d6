use std::panic::Location;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::info;

use crate::config::ShippingConfig;
use crate::errors::Result;
use crate::shipping::{LogEntry, LogLevel, LogShipper};

/// Keys the logger writes itself; caller fields with these names are
/// stored as `field_<name>`.
const RESERVED_KEYS: [&str; 4] = ["level", "ts", "caller", "msg"];

/// Application-wide logging handle.
///
/// Every call writes to the local tracing sink first and then hands a JSON
/// copy to the shipper, if one is attached. Cloning is cheap; all clones
/// share one shipper.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    service: String,
    shipper: Option<LogShipper>,
}

impl Logger {
    pub fn new(service: impl Into<String>, shipper: LogShipper) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                service: service.into(),
                shipper: Some(shipper),
            }),
        }
    }

    /// Logger that only writes to the local sink.
    pub fn local_only(service: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                service: service.into(),
                shipper: None,
            }),
        }
    }

    /// 根据配置创建 Logger
    ///
    /// shipping.enabled = false 时只写本地日志；
    /// 启用但缺少 Loki 凭据时返回 MissingCredentials
    pub fn from_config(config: &ShippingConfig) -> Result<Self> {
        if !config.enabled {
            info!("Log shipping disabled, logging locally only");
            return Ok(Self::local_only(&config.service_name));
        }

        let shipper = LogShipper::from_config(config)?;
        Ok(Self::new(&config.service_name, shipper))
    }

    pub fn service(&self) -> &str {
        &self.inner.service
    }

    pub fn is_shipping(&self) -> bool {
        self.inner.shipper.is_some()
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, fields: &[(&str, Value)]) {
        self.log(LogLevel::Debug, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, msg: &str, fields: &[(&str, Value)]) {
        self.log(LogLevel::Info, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, fields: &[(&str, Value)]) {
        self.log(LogLevel::Warn, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, msg: &str, fields: &[(&str, Value)]) {
        self.log(LogLevel::Error, msg, fields, Location::caller());
    }

    /// Stops the shipper after handing it everything queued so far.
    /// Blocks; call from a blocking context.
    pub fn shutdown(&self) {
        if let Some(shipper) = &self.inner.shipper {
            shipper.shutdown();
        }
    }

    /// Entries the shipper had to discard because its queue was full.
    pub fn dropped(&self) -> u64 {
        self.inner.shipper.as_ref().map_or(0, LogShipper::dropped)
    }

    fn log(&self, level: LogLevel, msg: &str, fields: &[(&str, Value)], location: &Location<'_>) {
        let caller = format!("{}:{}", location.file(), location.line());
        let rendered = render_fields(fields);

        match level {
            LogLevel::Debug => {
                tracing::debug!(target: "urlx", caller = %caller, fields = %rendered, "{}", msg)
            }
            LogLevel::Info => {
                tracing::info!(target: "urlx", caller = %caller, fields = %rendered, "{}", msg)
            }
            LogLevel::Warn => {
                tracing::warn!(target: "urlx", caller = %caller, fields = %rendered, "{}", msg)
            }
            LogLevel::Error => {
                tracing::error!(target: "urlx", caller = %caller, fields = %rendered, "{}", msg)
            }
        }

        if let Some(shipper) = &self.inner.shipper {
            let line = encode_line(level, msg, &caller, fields);
            shipper.enqueue(LogEntry::new(line, level, self.inner.service.as_str()));
        }
    }
}

/// 渲染为 JSON 对象字符串，用于本地日志
fn render_fields(fields: &[(&str, Value)]) -> String {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect();
    Value::Object(map).to_string()
}

/// One JSON object per line: `{"level","ts","caller","msg",...fields}`.
pub(crate) fn encode_line(
    level: LogLevel,
    msg: &str,
    caller: &str,
    fields: &[(&str, Value)],
) -> String {
    let mut map = Map::new();
    map.insert("level".to_string(), Value::String(level.to_string()));
    map.insert(
        "ts".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    map.insert("caller".to_string(), Value::String(caller.to_string()));
    map.insert("msg".to_string(), Value::String(msg.to_string()));

    for (key, value) in fields {
        let key = if RESERVED_KEYS.contains(key) {
            format!("field_{}", key)
        } else {
            (*key).to_string()
        };
        map.insert(key, value.clone());
    }

    Value::Object(map).to_string()
}
