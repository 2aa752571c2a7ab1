//! 股票代码列表加载
//!
//! 从本地 CSV 文件读取交易所全部股票代码

use std::fs;
use std::path::PathBuf;

use crate::config::QuoteConfig;
use crate::error::QuoteError;

/// 股票代码列表加载器
#[derive(Debug, Clone)]
pub struct UniverseLoader {
    path: PathBuf,
    code_column: String,
    suffix: String,
}

impl UniverseLoader {
    pub fn new(path: impl Into<PathBuf>, code_column: &str, suffix: &str) -> Self {
        Self {
            path: path.into(),
            code_column: code_column.to_string(),
            suffix: suffix.to_string(),
        }
    }

    pub fn from_config(config: &QuoteConfig) -> Self {
        Self::new(&config.universe_path, &config.code_column, &config.symbol_suffix)
    }

    /// 读取股票代码，保持文件中的顺序
    pub fn load(&self) -> Result<Vec<String>, QuoteError> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            QuoteError::SourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        parse_codes(&text, &self.code_column, &self.suffix)
    }

    /// 读取失败时记录日志并返回空列表
    pub fn load_or_empty(&self) -> Vec<String> {
        match self.load() {
            Ok(codes) => {
                log::info!("已加载 {} 个股票代码（{}）", codes.len(), self.path.display());
                codes
            }
            Err(e) => {
                log::error!("{}，将以空列表继续运行", e);
                Vec::new()
            }
        }
    }
}

/// 解析 CSV 文本，读取指定列并补齐交易所后缀
fn parse_codes(text: &str, column: &str, suffix: &str) -> Result<Vec<String>, QuoteError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| QuoteError::SourceUnavailable(e.to_string()))?;
    let index = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| QuoteError::SourceUnavailable(format!("缺少 {} 列", column)))?;

    let mut codes = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| QuoteError::SourceUnavailable(e.to_string()))?;
        match record.get(index) {
            Some(code) if !code.is_empty() => codes.push(format!("{}{}", code, suffix)),
            _ => continue,
        }
    }

    Ok(codes)
}
