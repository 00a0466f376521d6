//! 日志上报模块
//!
//! 请求处理线程把日志放入有界队列（BatchBuffer），后台线程
//! （FlushScheduler）按批次大小或时间间隔取出，通过 LogTransport
//! 推送到 Loki。
//!
//! ```text
//! Logger ──enqueue──▶ BatchBuffer ──channel──▶ FlushScheduler ──send──▶ LokiTransport
//! ```

mod buffer;
mod entry;
mod payload;
mod scheduler;
mod transport;

use std::sync::Arc;

use tracing::info;

pub use buffer::{BatchBuffer, DEFAULT_QUEUE_CAPACITY, DropNotifier, TracingDropNotifier};
pub use entry::{Batch, Labels, LogEntry, LogLevel};
pub use payload::{DefaultLabels, PushRequest, Stream};
pub use scheduler::{DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL, FlushPolicy, FlushScheduler};
pub use transport::{LogTransport, LokiTransport, TransportConfig, TransportError};

use crate::config::ShippingConfig;
use crate::errors::Result;

/// Queue and flush settings for a [`LogShipper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipperOptions {
    pub queue_capacity: usize,
    pub policy: FlushPolicy,
}

impl Default for ShipperOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            policy: FlushPolicy::default(),
        }
    }
}

impl From<&ShippingConfig> for ShipperOptions {
    fn from(config: &ShippingConfig) -> Self {
        Self {
            queue_capacity: config.queue_capacity,
            policy: FlushPolicy {
                max_batch_size: config.batch_size,
                flush_interval: config.flush_interval(),
            },
        }
    }
}

/// Buffer plus flush thread, started together and stopped together.
pub struct LogShipper {
    buffer: BatchBuffer,
    scheduler: FlushScheduler,
}

impl LogShipper {
    pub fn start(
        transport: Arc<dyn LogTransport>,
        options: ShipperOptions,
        notifier: Arc<dyn DropNotifier>,
    ) -> Result<Self> {
        let (buffer, receiver) = BatchBuffer::with_notifier(options.queue_capacity, notifier);
        let scheduler = FlushScheduler::start(receiver, transport, options.policy)?;

        Ok(Self { buffer, scheduler })
    }

    /// Builds a Loki transport from `config` and starts shipping.
    ///
    /// Fails with `MissingCredentials` before any thread is spawned when
    /// the sink url, user or key is absent.
    pub fn from_config(config: &ShippingConfig) -> Result<Self> {
        let transport_config = TransportConfig::from_config(config)?;
        info!(
            "Shipping logs to {} (service_name={})",
            transport_config.endpoint, transport_config.default_labels.service_name
        );
        let transport = Arc::new(LokiTransport::new(transport_config));

        Self::start(
            transport,
            ShipperOptions::from(config),
            Arc::new(TracingDropNotifier),
        )
    }

    pub fn enqueue(&self, entry: LogEntry) {
        self.buffer.enqueue(entry);
    }

    pub fn buffer(&self) -> &BatchBuffer {
        &self.buffer
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// 阻塞直到队列中的日志全部交给 transport
    ///
    /// 之后的 enqueue 一律丢弃并计数。
    pub fn shutdown(&self) {
        self.buffer.close();
        self.scheduler.shutdown();
    }

    pub fn dropped(&self) -> u64 {
        self.buffer.dropped()
    }
}
