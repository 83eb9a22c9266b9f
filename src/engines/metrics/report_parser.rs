use crate::error::{Result, StratevolveError};
use crate::types::PerformanceReport;
use regex::Regex;
use std::collections::HashMap;

pub const NET_PROFIT_PCT: &str = "net_profit_pct";
pub const MAX_DRAWDOWN_PCT: &str = "max_drawdown_pct";
pub const PROFIT_FACTOR: &str = "profit_factor";
pub const SHARPE_RATIO: &str = "sharpe_ratio";
pub const TOTAL_TRADES: &str = "total_trades";
pub const WIN_RATE: &str = "win_rate";

// Number after a tag close, whitespace or colon. Keeps digits inside
// attribute values (class="x1") from matching.
const NUMBER: &str = r"(?:^|[>\s:])([+\-−]?\d[\d,]*(?:\.\d+)?)";

/// (field, label pattern, value must carry a trailing `%`)
const FIELDS: [(&str, &str, bool); 6] = [
    (NET_PROFIT_PCT, r"net\s+profit", true),
    (MAX_DRAWDOWN_PCT, r"max(?:imum)?\s+drawdown", true),
    (PROFIT_FACTOR, r"profit\s+factor", false),
    (SHARPE_RATIO, r"sharpe\s+ratio", false),
    (TOTAL_TRADES, r"total\s+closed\s+trades", false),
    (WIN_RATE, r"(?:win\s+rate|percent\s+profitable)", true),
];

struct FieldPattern {
    field: &'static str,
    label: Regex,
    value: Regex,
}

/// Extracts the six summary metrics from a rendered backtest report.
///
/// Works on HTML and on plain `label value` text. A field's value is only
/// searched between its label and the next known label, so a field without
/// a value of its own never picks up a neighbour's number. Parsing is all
/// or nothing: a single missing field fails the whole report.
pub struct ReportParser {
    patterns: Vec<FieldPattern>,
}

impl ReportParser {
    pub fn new() -> Result<Self> {
        let patterns = FIELDS
            .iter()
            .map(|&(field, label, percent)| -> Result<FieldPattern> {
                let suffix = if percent { r"\s*%" } else { "" };
                let compile = |pattern: String| {
                    Regex::new(&pattern).map_err(|e| {
                        StratevolveError::Configuration(format!(
                            "Invalid pattern for {}: {}",
                            field, e
                        ))
                    })
                };
                Ok(FieldPattern {
                    field,
                    label: compile(format!("(?i){}", label))?,
                    value: compile(format!("(?s){}{}", NUMBER, suffix))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Raw values keyed by field name, exactly as printed in the report
    pub fn extract(&self, rendered: &str) -> Result<HashMap<&'static str, f64>> {
        let mut label_starts: Vec<usize> = self
            .patterns
            .iter()
            .flat_map(|p| p.label.find_iter(rendered).map(|m| m.start()))
            .collect();
        label_starts.sort_unstable();

        let mut values = HashMap::with_capacity(self.patterns.len());
        for pattern in &self.patterns {
            let value = pattern
                .label
                .find_iter(rendered)
                .find_map(|label| {
                    let end = label_starts
                        .iter()
                        .copied()
                        .find(|&start| start >= label.end())
                        .unwrap_or(rendered.len());
                    let segment = &rendered[label.end()..end];
                    pattern
                        .value
                        .captures(segment)
                        .and_then(|caps| caps.get(1))
                        .and_then(|raw| parse_number(raw.as_str()))
                })
                .ok_or_else(|| StratevolveError::Parse {
                    field: pattern.field.to_string(),
                })?;
            values.insert(pattern.field, value);
        }
        Ok(values)
    }

    pub fn parse(&self, rendered: &str) -> Result<PerformanceReport> {
        let values = self.extract(rendered)?;
        let get = |field: &str| values.get(field).copied().unwrap_or_default();

        let trades = get(TOTAL_TRADES);
        if trades < 0.0 || trades.fract() != 0.0 {
            return Err(StratevolveError::Parse {
                field: TOTAL_TRADES.to_string(),
            });
        }

        Ok(PerformanceReport {
            net_profit_pct: get(NET_PROFIT_PCT),
            max_drawdown_pct: get(MAX_DRAWDOWN_PCT),
            sharpe_ratio: get(SHARPE_RATIO),
            total_trades: trades as u64,
            win_rate: get(WIN_RATE) / 100.0,
            profit_factor: get(PROFIT_FACTOR).max(0.0),
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .map(|c| if c == '−' { '-' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
<div class="report-a1">
  <div class="title">Net profit</div><div class="value">USD 1,234.50</div><div class="pct">12.34%</div>
  <div class="title">Total closed trades</div><div class="value">85</div>
  <div class="title">Percent profitable</div><div class="value">64.5%</div>
  <div class="title">Profit factor</div><div class="value">2.31</div>
  <div class="title">Max drawdown</div><div class="value">USD 310.00</div><div class="pct">7.80%</div>
  <div class="title">Sharpe ratio</div><div class="value">1.42</div>
</div>
"#;

    #[test]
    fn test_parse_html_report() {
        let parser = ReportParser::new().unwrap();
        let report = parser.parse(HTML).unwrap();

        assert!((report.net_profit_pct - 12.34).abs() < 1e-9);
        assert!((report.max_drawdown_pct - 7.80).abs() < 1e-9);
        assert!((report.profit_factor - 2.31).abs() < 1e-9);
        assert!((report.sharpe_ratio - 1.42).abs() < 1e-9);
        assert_eq!(report.total_trades, 85);
        assert!((report.win_rate - 0.645).abs() < 1e-9);
    }

    #[test]
    fn test_parse_plain_text_with_signs() {
        let text = "Net profit: −3.5%\nMax drawdown: -12.3%\nProfit factor: 0.8\n\
                    Sharpe ratio: -0.25\nTotal closed trades: 1,204\nWin rate: 41%\n";
        let report = ReportParser::new().unwrap().parse(text).unwrap();

        assert!((report.net_profit_pct + 3.5).abs() < 1e-9);
        assert!((report.max_drawdown_pct + 12.3).abs() < 1e-9);
        assert!((report.sharpe_ratio + 0.25).abs() < 1e-9);
        assert_eq!(report.total_trades, 1204);
        assert!((report.win_rate - 0.41).abs() < 1e-9);
    }

    #[test]
    fn test_missing_field_fails() {
        let text = "Net profit 10%\nMax drawdown 5%\nProfit factor 1.2\nTotal closed trades 10\nWin rate 50%";
        let err = ReportParser::new().unwrap().parse(text).unwrap_err();
        match err {
            StratevolveError::Parse { field } => assert_eq!(field, SHARPE_RATIO),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_field_without_value_does_not_borrow_next_field() {
        let text = "Net profit 1,000 USD\nMax drawdown -10%\nProfit factor 1.2\n\
                    Sharpe ratio 1\nTotal closed trades 10\nWin rate 50%";
        let err = ReportParser::new().unwrap().parse(text).unwrap_err();
        match err {
            StratevolveError::Parse { field } => assert_eq!(field, NET_PROFIT_PCT),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_html_drawdown_without_percentage_fails() {
        let html = r#"
<div class="title">Net profit</div><div class="pct">12.34%</div>
<div class="title">Max drawdown</div><div class="value">USD 310.00</div>
<div class="title">Percent profitable</div><div class="value">64.5%</div>
<div class="title">Profit factor</div><div class="value">2.31</div>
<div class="title">Sharpe ratio</div><div class="value">1.42</div>
<div class="title">Total closed trades</div><div class="value">85</div>
"#;
        let err = ReportParser::new().unwrap().parse(html).unwrap_err();
        match err {
            StratevolveError::Parse { field } => assert_eq!(field, MAX_DRAWDOWN_PCT),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_failure_is_evaluation_failure() {
        let err = ReportParser::new().unwrap().parse("").unwrap_err();
        assert!(err.is_evaluation_failure());
    }

    #[test]
    fn test_fractional_trade_count_rejected() {
        let text = "Net profit 10%\nMax drawdown 5%\nProfit factor 1.2\nSharpe ratio 1\n\
                    Total closed trades 10.5\nWin rate 50%";
        assert!(ReportParser::new().unwrap().parse(text).is_err());
    }
}
