//! 测试用数据源：记录每次调用，可指定失败的调用或股票代码

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::QuoteFetcher;
use crate::error::QuoteError;
use crate::models::RawQuote;

#[derive(Default)]
pub struct ScriptedFetcher {
    calls: Mutex<Vec<Vec<String>>>,
    started: AtomicUsize,
    fail_calls: HashSet<usize>,
    rejected: HashSet<String>,
    delay: Duration,
    reverse: bool,
    answer: Option<String>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 n 次调用（从 0 开始）返回错误
    pub fn failing_calls(mut self, calls: &[usize]) -> Self {
        self.fail_calls = calls.iter().copied().collect();
        self
    }

    /// 这些代码的请求返回错误
    pub fn rejecting(mut self, symbols: &[&str]) -> Self {
        self.rejected = symbols.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 以倒序返回每批结果
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// 无论请求什么代码，都只返回该代码的行情
    pub fn answering_with(mut self, symbol: &str) -> Self {
        self.answer = Some(symbol.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

pub fn raw_quote(symbol: &str) -> RawQuote {
    RawQuote {
        symbol: symbol.to_string(),
        short_name: Some(format!("{} Tbk", symbol)),
        regular_market_price: Some(1000.0),
        ..Default::default()
    }
}

#[async_trait]
impl QuoteFetcher for ScriptedFetcher {
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<RawQuote>, QuoteError> {
        let index = self.started.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(symbols.to_vec());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_calls.contains(&index) {
            return Err(QuoteError::Provider(format!("call {} failed", index)));
        }
        if let Some(bad) = symbols.iter().find(|s| self.rejected.contains(*s)) {
            return Err(QuoteError::Provider(format!("Quote not found for ticker symbol: {}", bad)));
        }

        if let Some(answer) = &self.answer {
            return Ok(vec![raw_quote(answer)]);
        }

        let mut quotes: Vec<RawQuote> = symbols.iter().map(|s| raw_quote(s)).collect();
        if self.reverse {
            quotes.reverse();
        }
        Ok(quotes)
    }
}
