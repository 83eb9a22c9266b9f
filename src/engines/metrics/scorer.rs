use crate::config::{NormalizationBounds, ScoreConfig, ScoringConfig};
use crate::types::PerformanceReport;

/// Turns a performance report into a scalar fitness in [0, 1]
pub trait Scorer: Send + Sync {
    fn score(&self, report: &PerformanceReport) -> f64;
}

/// Each metric normalised independently, before weighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedMetrics {
    pub profit: f64,
    pub drawdown: f64,
    pub sharpe: f64,
    pub win_rate: f64,
    pub trade_count: f64,
}

/// Weighted sum of linearly normalised metrics.
///
/// Out-of-range inputs saturate instead of failing, so scoring never
/// raises for numeric edge cases.
#[derive(Debug, Clone, Default)]
pub struct DefaultScorer {
    weights: ScoreConfig,
    bounds: NormalizationBounds,
}

impl DefaultScorer {
    pub fn new(weights: ScoreConfig) -> Self {
        Self {
            weights,
            bounds: NormalizationBounds::default(),
        }
    }

    pub fn with_bounds(weights: ScoreConfig, bounds: NormalizationBounds) -> Self {
        Self { weights, bounds }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::with_bounds(config.weights, config.bounds)
    }

    pub fn normalize(&self, report: &PerformanceReport) -> NormalizedMetrics {
        let b = &self.bounds;
        NormalizedMetrics {
            profit: clamp01(safe_div(report.net_profit_pct, b.max_profit)),
            drawdown: drawdown_term(report.max_drawdown_pct, b.min_drawdown),
            sharpe: clamp01(safe_div(report.sharpe_ratio, b.max_sharpe)),
            win_rate: clamp01(report.win_rate),
            trade_count: clamp01(safe_div(report.total_trades as f64, b.max_trade_count)),
        }
    }

    /// Weighted sum before the final clamp. Bounded by the sum of the weights.
    pub fn weighted_sum(&self, report: &PerformanceReport) -> f64 {
        let n = self.normalize(report);
        let w = &self.weights;
        n.profit * w.profit_w
            + n.drawdown * w.drawdown_w
            + n.sharpe * w.sharpe_w
            + n.win_rate * w.winrate_w
            + n.trade_count * w.tradecount_w
    }
}

impl Scorer for DefaultScorer {
    fn score(&self, report: &PerformanceReport) -> f64 {
        let n = self.normalize(report);
        log::debug!(
            "Normalised metrics - profit={:.3} drawdown={:.3} sharpe={:.3} winrate={:.3} trades={:.3}",
            n.profit, n.drawdown, n.sharpe, n.win_rate, n.trade_count
        );
        let score = clamp01(self.weighted_sum(report));
        log::debug!("Computed fitness score: {:.3}", score);
        score
    }
}

/// Clamp into [0, 1]; NaN maps to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Smaller drawdown magnitude scores higher. A zero bound scores 0.
fn drawdown_term(max_drawdown_pct: f64, min_drawdown: f64) -> f64 {
    if min_drawdown == 0.0 {
        return 0.0;
    }
    clamp01(1.0 - max_drawdown_pct.abs() / min_drawdown.abs())
}

/// Division that yields 0 when the denominator is zero.
fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> PerformanceReport {
        PerformanceReport {
            net_profit_pct: 25.4,
            max_drawdown_pct: -7.8,
            sharpe_ratio: 1.42,
            total_trades: 85,
            win_rate: 0.64,
            profit_factor: 2.31,
        }
    }

    #[test]
    fn test_normalize_known_values() {
        let n = DefaultScorer::default().normalize(&report());
        assert!((n.profit - 0.254).abs() < 1e-9);
        assert!((n.drawdown - (1.0 - 7.8 / 50.0)).abs() < 1e-9);
        assert!((n.sharpe - 1.42 / 3.0).abs() < 1e-9);
        assert!((n.win_rate - 0.64).abs() < 1e-9);
        assert!((n.trade_count - 0.17).abs() < 1e-9);
    }

    #[test]
    fn test_default_weights_score() {
        let scorer = DefaultScorer::default();
        let expected = 0.254 * 0.35
            + (1.0 - 7.8 / 50.0) * 0.25
            + (1.42 / 3.0) * 0.20
            + 0.64 * 0.15
            + 0.17 * 0.05;
        assert!((scorer.score(&report()) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_drawdown_sign_is_ignored() {
        let scorer = DefaultScorer::default();
        let mut positive = report();
        positive.max_drawdown_pct = 7.8;
        assert_eq!(scorer.score(&report()), scorer.score(&positive));
    }

    #[test]
    fn test_clamp01_nan() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(7.0), 1.0);
    }

    #[test]
    fn test_zero_weights_score_zero() {
        let scorer = DefaultScorer::new(ScoreConfig::uniform(0.0));
        assert_eq!(scorer.score(&report()), 0.0);
    }
}
