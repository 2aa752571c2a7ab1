//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，并在启动时应用环境变量覆盖

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
    /// 上游请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 上游连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 运行模式
///
/// 启动时确定一次，进程生命周期内不再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// 常驻进程：后台定时刷新缓存
    Persistent,
    /// 短生命周期（Serverless）：每个请求独立拉取
    OnDemand,
}

/// 表示短生命周期运行环境的环境变量
const ON_DEMAND_MARKERS: [&str; 3] = ["VERCEL", "AWS_LAMBDA_FUNCTION_NAME", "NETLIFY"];

impl ExecutionMode {
    /// 解析模式名称，支持 persistent / on_demand / on-demand / serverless
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "persistent" => Some(Self::Persistent),
            "on_demand" | "on-demand" | "ondemand" | "serverless" => Some(Self::OnDemand),
            _ => None,
        }
    }

    /// 根据环境变量探测运行模式
    pub fn detect<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if ON_DEMAND_MARKERS.iter().any(|key| lookup(key).is_some()) {
            Self::OnDemand
        } else {
            Self::Persistent
        }
    }
}

/// 行情缓存与刷新配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// 股票代码列表 CSV 路径
    #[serde(default = "default_universe_path")]
    pub universe_path: String,
    /// CSV 中股票代码所在列
    #[serde(default = "default_code_column")]
    pub code_column: String,
    /// 交易所后缀
    #[serde(default = "default_symbol_suffix")]
    pub symbol_suffix: String,
    /// 上游未返回币种时使用的默认币种
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// 行情数据源地址
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
    /// 每批请求的股票数量
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// 批次之间的间隔（毫秒）
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// 后台刷新间隔（秒）
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// 缓存过期阈值（秒）
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: u64,
    /// 读请求触发刷新时的等待上限（秒）
    #[serde(default = "default_read_refresh_timeout")]
    pub read_refresh_timeout_secs: u64,
    /// 按需模式下单次请求的拉取上限（秒）
    #[serde(default = "default_on_demand_timeout")]
    pub on_demand_timeout_secs: u64,
    /// 显式指定运行模式（为空则自动探测）
    #[serde(default)]
    pub mode: Option<ExecutionMode>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 行情配置
    #[serde(default)]
    pub quotes: QuoteConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_universe_path() -> String { "resource/stockcode.csv".to_string() }
fn default_code_column() -> String { "Code".to_string() }
fn default_symbol_suffix() -> String { ".JK".to_string() }
fn default_currency() -> String { "IDR".to_string() }
fn default_provider_base_url() -> String { "https://query1.finance.yahoo.com".to_string() }
fn default_batch_size() -> usize { 50 }
fn default_batch_delay_ms() -> u64 { 100 }
fn default_refresh_interval() -> u64 { 60 }
fn default_stale_after() -> u64 { 300 }
fn default_read_refresh_timeout() -> u64 { 10 }
fn default_on_demand_timeout() -> u64 { 20 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            universe_path: default_universe_path(),
            code_column: default_code_column(),
            symbol_suffix: default_symbol_suffix(),
            default_currency: default_currency(),
            provider_base_url: default_provider_base_url(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            refresh_interval_secs: default_refresh_interval(),
            stale_after_secs: default_stale_after(),
            read_refresh_timeout_secs: default_read_refresh_timeout(),
            on_demand_timeout_secs: default_on_demand_timeout(),
            mode: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            log: LogConfig::default(),
            quotes: QuoteConfig::default(),
        }
    }
}

impl QuoteConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn read_refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.read_refresh_timeout_secs)
    }

    pub fn on_demand_timeout(&self) -> Duration {
        Duration::from_secs(self.on_demand_timeout_secs)
    }
}

/// 配置来源，日志系统初始化后再输出
#[derive(Debug)]
pub enum ConfigOrigin {
    File(String),
    Invalid { path: String, error: String },
    Default,
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    ///
    /// 此时日志系统尚未初始化，加载结果通过 [`ConfigOrigin`] 返回
    pub fn load() -> (Self, ConfigOrigin) {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                return match Self::from_file(path) {
                    Ok(config) => (config, ConfigOrigin::File(path.to_string())),
                    Err(e) => (
                        Self::default(),
                        ConfigOrigin::Invalid {
                            path: path.to_string(),
                            error: e.to_string(),
                        },
                    ),
                };
            }
        }

        (Self::default(), ConfigOrigin::Default)
    }

    /// 应用环境变量覆盖：PORT、API_KEY、QUOTE_MODE
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(key) = lookup("API_KEY") {
            self.api.api_key = key;
        }
        if let Some(mode) = lookup("QUOTE_MODE").as_deref().and_then(ExecutionMode::parse) {
            self.quotes.mode = Some(mode);
        }
    }

    /// 确定运行模式：显式配置优先，否则根据环境探测
    pub fn execution_mode<F>(&self, lookup: F) -> ExecutionMode
    where
        F: Fn(&str) -> Option<String>,
    {
        self.quotes.mode.unwrap_or_else(|| ExecutionMode::detect(lookup))
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
