//! 公共辅助函数

use chrono::Utc;
use chrono_tz::Asia::Jakarta;

/// 获取雅加达时间字符串（ISO 8601 格式，带+07:00时区）
pub fn market_time() -> String {
    Utc::now().with_timezone(&Jakarta).to_rfc3339()
}

/// 规范化单只股票代码：转大写，无交易所后缀时补齐
pub fn normalize_symbol(symbol: &str, suffix: &str) -> String {
    let symbol = symbol.trim().to_uppercase();
    if symbol.contains('.') || suffix.is_empty() {
        symbol
    } else {
        format!("{}{}", symbol, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("bbca", ".JK"), "BBCA.JK");
        assert_eq!(normalize_symbol("bbca.jk", ".JK"), "BBCA.JK");
        assert_eq!(normalize_symbol("AAPL.US", ".JK"), "AAPL.US");
        assert_eq!(normalize_symbol(" tlkm ", ""), "TLKM");
    }

    #[test]
    fn test_market_time_offset() {
        assert!(market_time().ends_with("+07:00"));
    }
}
