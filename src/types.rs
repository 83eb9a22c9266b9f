use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form annotations carried by a genome and persisted with it.
/// The engine never interprets the contents.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Raw metrics from one simulated-trading run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub net_profit_pct: f64,
    /// Signed, negative = loss
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub total_trades: u64,
    /// Fraction in [0, 1]
    pub win_rate: f64,
    #[serde(default)]
    pub profit_factor: f64,
}

/// One persisted ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: i64,
    pub generation: u32,
    pub fitness: f64,
    pub source_text: String,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}
