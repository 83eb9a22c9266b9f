use super::traits::ConfigSection;
use crate::error::StratevolveError;
use serde::{Deserialize, Serialize};

/// Weight coefficients for composing the fitness score.
///
/// Weights need not sum to 1; the scorer clamps the final sum into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub profit_w: f64,
    pub drawdown_w: f64,
    pub sharpe_w: f64,
    pub winrate_w: f64,
    pub tradecount_w: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            profit_w: 0.35,
            drawdown_w: 0.25,
            sharpe_w: 0.20,
            winrate_w: 0.15,
            tradecount_w: 0.05,
        }
    }
}

impl ScoreConfig {
    pub fn uniform(weight: f64) -> Self {
        Self {
            profit_w: weight,
            drawdown_w: weight,
            sharpe_w: weight,
            winrate_w: weight,
            tradecount_w: weight,
        }
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("profit_w", self.profit_w),
            ("drawdown_w", self.drawdown_w),
            ("sharpe_w", self.sharpe_w),
            ("winrate_w", self.winrate_w),
            ("tradecount_w", self.tradecount_w),
        ]
    }
}

/// Empirical bounds used to map raw metrics onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationBounds {
    pub max_profit: f64,
    pub min_drawdown: f64,
    pub max_sharpe: f64,
    pub max_trade_count: f64,
}

impl Default for NormalizationBounds {
    fn default() -> Self {
        Self {
            max_profit: 100.0,
            min_drawdown: -50.0,
            max_sharpe: 3.0,
            max_trade_count: 500.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreConfig,
    pub bounds: NormalizationBounds,
}

impl ConfigSection for ScoringConfig {
    fn section_name() -> &'static str {
        "scoring"
    }

    fn validate(&self) -> Result<(), StratevolveError> {
        for (name, weight) in self.weights.named() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(StratevolveError::Configuration(format!(
                    "scoring.weights.{} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        let b = &self.bounds;
        for (name, bound) in [
            ("max_profit", b.max_profit),
            ("min_drawdown", b.min_drawdown),
            ("max_sharpe", b.max_sharpe),
            ("max_trade_count", b.max_trade_count),
        ] {
            if !bound.is_finite() {
                return Err(StratevolveError::Configuration(format!(
                    "scoring.bounds.{} must be finite",
                    name
                )));
            }
        }
        Ok(())
    }
}
