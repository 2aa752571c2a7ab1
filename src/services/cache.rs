//! 行情缓存
//!
//! 保存最近一次成功拉取的快照。读取只克隆 `Arc`，替换是一次指针交换，
//! 读者要么看到旧快照，要么看到完整的新快照。

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::models::Snapshot;

#[derive(Debug, Default)]
pub struct QuoteCache {
    current: RwLock<Arc<Snapshot>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取当前快照
    pub fn read(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 整体替换快照，后续读取立即可见
    pub fn replace(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        match self.current.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    /// 缓存为空或超过阈值时视为过期
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        let snapshot = self.read();
        if snapshot.is_empty() {
            return true;
        }
        match snapshot.as_of {
            None => true,
            Some(as_of) => match (now - as_of).to_std() {
                Ok(age) => age > threshold,
                // 快照时间晚于 now
                Err(_) => false,
            },
        }
    }
}
