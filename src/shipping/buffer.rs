//! 日志缓冲队列
//!
//! 有界 crossbeam 通道，生产者（请求处理线程）只做 try_send：
//! - 队列未满：入队
//! - 队列已满、已关闭或消费者已退出：丢弃该条日志并通知 DropNotifier
//!
//! 生产者永远不会被阻塞。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{trace, warn};

use super::entry::LogEntry;

/// 默认队列容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Told about every entry the buffer had to discard.
pub trait DropNotifier: Send + Sync {
    fn on_drop(&self, entry: &LogEntry);
}

/// 默认实现：写一条本地 warn 日志
pub struct TracingDropNotifier;

impl DropNotifier for TracingDropNotifier {
    fn on_drop(&self, entry: &LogEntry) {
        warn!(
            "LogShipper: dropping log, queue full or closed (level={}, service={})",
            entry.level(),
            entry.service()
        );
    }
}

/// Producer side of the shipping queue.
///
/// Clones share the same channel, drop counter and closed flag.
#[derive(Clone)]
pub struct BatchBuffer {
    sender: Sender<LogEntry>,
    dropped: Arc<AtomicU64>,
    notifier: Arc<dyn DropNotifier>,
    // enqueue 持读锁完成 try_send，close 持写锁，关闭后不会再有日志进入通道
    closed: Arc<RwLock<bool>>,
}

impl BatchBuffer {
    /// 创建缓冲区，返回生产端和唯一的消费端
    pub fn bounded(capacity: usize) -> (Self, Receiver<LogEntry>) {
        Self::with_notifier(capacity, Arc::new(TracingDropNotifier))
    }

    pub fn with_notifier(
        capacity: usize,
        notifier: Arc<dyn DropNotifier>,
    ) -> (Self, Receiver<LogEntry>) {
        // 容量为 0 时 crossbeam 会退化为同步通道，try_send 几乎总是失败
        let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1));
        let buffer = Self {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
            notifier,
            closed: Arc::new(RwLock::new(false)),
        };
        (buffer, receiver)
    }

    /// 非阻塞入队，失败时丢弃
    pub fn enqueue(&self, entry: LogEntry) {
        let closed = match self.closed.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *closed {
            drop(closed);
            self.discard(entry);
            return;
        }

        match self.sender.try_send(entry) {
            Ok(()) => {
                trace!("LogShipper: enqueued, queue length {}", self.sender.len());
            }
            Err(TrySendError::Full(entry)) | Err(TrySendError::Disconnected(entry)) => {
                drop(closed);
                self.discard(entry);
            }
        }
    }

    /// Rejects every later `enqueue`.
    ///
    /// Returns once in-flight `enqueue` calls have finished, so everything
    /// accepted before this call is already in the channel.
    pub fn close(&self) {
        match self.closed.write() {
            Ok(mut guard) => *guard = true,
            Err(poisoned) => *poisoned.into_inner() = true,
        }
    }

    pub fn is_closed(&self) -> bool {
        match self.closed.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn discard(&self, entry: LogEntry) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        self.notifier.on_drop(&entry);
    }

    /// Entries currently waiting for the flush thread.
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(0)
    }

    /// Total entries discarded since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
