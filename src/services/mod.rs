//! 业务逻辑服务模块
//!
//! 封装行情拉取、缓存和刷新调度逻辑

pub mod batch;      // 分批拉取
pub mod cache;      // 行情缓存
pub mod common;     // 公共辅助函数
pub mod provider;   // 行情数据源
pub mod scheduler;  // 刷新调度
pub mod summary;    // 市场汇总
pub mod universe;   // 股票代码列表

pub use batch::BatchFetcher;
pub use common::market_time;
pub use provider::{QuoteFetcher, YahooQuoteFetcher};
pub use scheduler::{RefreshScheduler, RefreshSettings};
pub use universe::UniverseLoader;
