//! 后台 flush 线程
//!
//! 单个命名线程在三类事件上 select：
//! - 新日志到达：追加到当前批次，达到 batch_size 立即发送
//! - 定时器触发：当前批次非空则发送
//! - 停止信号：排空队列，分批发送后退出
//!
//! 发送失败只记录警告，批次被丢弃，不重试。

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select, tick};
use tracing::{debug, info, warn};

use super::entry::{Batch, LogEntry};
use super::transport::LogTransport;
use crate::errors::{Result, UrlxError};

/// 默认批次大小
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// 默认 flush 间隔
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(2);

/// 停止时排空队列的最大轮数
const MAX_DRAIN_PASSES: usize = 8;

/// When the flush thread sends what it has collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    pub max_batch_size: usize,
    pub flush_interval: Duration,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

/// Owns the background flush thread.
///
/// `shutdown` is idempotent and blocks until every entry that was queued
/// before the call has been handed to the transport. Dropping the
/// scheduler shuts it down as well.
pub struct FlushScheduler {
    stop_tx: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl FlushScheduler {
    pub fn start(
        receiver: Receiver<LogEntry>,
        transport: Arc<dyn LogTransport>,
        policy: FlushPolicy,
    ) -> Result<Self> {
        let policy = FlushPolicy {
            max_batch_size: policy.max_batch_size.max(1),
            flush_interval: policy.flush_interval.max(Duration::from_millis(1)),
        };
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        let handle = std::thread::Builder::new()
            .name("log-shipper".to_string())
            .spawn(move || {
                let mut worker = FlushWorker {
                    transport,
                    policy,
                    batch: Vec::with_capacity(policy.max_batch_size),
                };
                worker.run(&receiver, &stop_rx);
            })
            .map_err(|e| UrlxError::shipper_start(format!("failed to spawn flush thread: {}", e)))?;

        info!(
            "LogShipper started (batch_size={}, flush_interval={:?})",
            policy.max_batch_size, policy.flush_interval
        );

        Ok(Self {
            stop_tx: Mutex::new(Some(stop_tx)),
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .map(|h| h.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// 停止后台线程并等待剩余日志发送完毕
    pub fn shutdown(&self) {
        let stop_tx = match self.stop_tx.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(tx) = stop_tx {
            let _ = tx.send(());
        }

        let handle = match self.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("LogShipper: flush thread panicked");
            } else {
                debug!("LogShipper: flush thread stopped");
            }
        }
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct FlushWorker {
    transport: Arc<dyn LogTransport>,
    policy: FlushPolicy,
    batch: Batch,
}

impl FlushWorker {
    fn run(&mut self, receiver: &Receiver<LogEntry>, stop_rx: &Receiver<()>) {
        let ticker = tick(self.policy.flush_interval);

        loop {
            select! {
                recv(receiver) -> msg => match msg {
                    Ok(entry) => {
                        self.batch.push(entry);
                        if self.batch.len() >= self.policy.max_batch_size {
                            self.flush();
                        }
                    }
                    // 所有生产者已释放
                    Err(_) => break,
                },
                recv(ticker) -> _ => {
                    if !self.batch.is_empty() {
                        self.flush();
                    }
                },
                recv(stop_rx) -> _ => break,
            }
        }

        self.drain(receiver);
    }

    /// 排空队列，按 batch_size 分批发送
    ///
    /// 发送期间仍可能有新日志入队，因此重复排空直到队列为空，
    /// 最多 MAX_DRAIN_PASSES 轮。
    fn drain(&mut self, receiver: &Receiver<LogEntry>) {
        let capacity = receiver.capacity().unwrap_or(usize::MAX);

        for _ in 0..MAX_DRAIN_PASSES {
            self.batch.extend(receiver.try_iter().take(capacity));
            if self.batch.is_empty() {
                return;
            }
            debug!("LogShipper: draining {} entries", self.batch.len());

            while !self.batch.is_empty() {
                let rest = if self.batch.len() > self.policy.max_batch_size {
                    self.batch.split_off(self.policy.max_batch_size)
                } else {
                    Vec::new()
                };
                self.flush();
                self.batch = rest;
            }
        }

        let left = receiver.len();
        if left > 0 {
            warn!(
                "LogShipper: {} entries still queued after {} drain passes, discarding",
                left, MAX_DRAIN_PASSES
            );
        }
    }

    fn flush(&mut self) {
        let batch = std::mem::replace(
            &mut self.batch,
            Vec::with_capacity(self.policy.max_batch_size),
        );
        let size = batch.len();
        let transport = &self.transport;

        match catch_unwind(AssertUnwindSafe(|| transport.send(batch))) {
            Ok(Ok(())) => debug!("LogShipper: flushed {} entries via {}", size, transport.name()),
            Ok(Err(e)) => warn!(
                "LogShipper: failed to ship {} entries via {}: {}",
                size,
                transport.name(),
                e
            ),
            Err(_) => warn!(
                "LogShipper: transport {} panicked, {} entries lost",
                transport.name(),
                size
            ),
        }
    }
}
