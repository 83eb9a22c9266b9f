#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use stratevolve::engines::candidates::CandidateGenerator;
use stratevolve::engines::evaluation::CandidateEvaluator;
use stratevolve::engines::metrics::Scorer;
use stratevolve::types::{Metadata, PerformanceReport};
use stratevolve::storage::{GenerationLedger, LedgerQuery};
use stratevolve::types::GenerationRecord;
use stratevolve::{Result, StratevolveError};

/// Deterministic report derived from the source text: longer text means
/// more profit, so fitness rises as crossover and mutation grow strategies.
pub fn report_for(source_text: &str) -> PerformanceReport {
    let len = source_text.chars().count() as f64;
    PerformanceReport {
        net_profit_pct: len,
        max_drawdown_pct: -(len % 50.0),
        sharpe_ratio: (len / 20.0).min(3.0),
        total_trades: source_text.len() as u64 * 3,
        win_rate: 0.5,
        profit_factor: 1.0,
    }
}

/// Evaluator backed by `report_for`, counting calls and optionally
/// failing once `fail_after` successful calls have been served.
pub struct FakeEvaluator {
    pub calls: Rc<Cell<usize>>,
    pub fail_after: Option<usize>,
}

impl FakeEvaluator {
    pub fn new() -> Self {
        Self {
            calls: Rc::new(Cell::new(0)),
            fail_after: None,
        }
    }

    pub fn failing_after(successes: usize) -> Self {
        Self {
            calls: Rc::new(Cell::new(0)),
            fail_after: Some(successes),
        }
    }
}

impl CandidateEvaluator for FakeEvaluator {
    fn evaluate(&mut self, source_text: &str) -> Result<PerformanceReport> {
        let served = self.calls.get();
        self.calls.set(served + 1);
        if matches!(self.fail_after, Some(limit) if served >= limit) {
            return Err(StratevolveError::Evaluation(
                "chart session timed out".to_string(),
            ));
        }
        Ok(report_for(source_text))
    }
}

/// Fitness equal to net profit / 100, clamped
pub struct ProfitScorer;

impl Scorer for ProfitScorer {
    fn score(&self, report: &PerformanceReport) -> f64 {
        (report.net_profit_pct / 100.0).clamp(0.0, 1.0)
    }
}

/// Generator that numbers its strategies
pub struct CountingGenerator {
    pub produced: usize,
    pub fail_on: Option<usize>,
}

impl CountingGenerator {
    pub fn new() -> Self {
        Self {
            produced: 0,
            fail_on: None,
        }
    }
}

impl CandidateGenerator for CountingGenerator {
    fn generate(&mut self, _prompt: &str) -> Result<String> {
        self.produced += 1;
        if self.fail_on == Some(self.produced) {
            return Err(StratevolveError::Generation("quota exceeded".to_string()));
        }
        Ok(format!("//@version=5\nstrategy(\"seed {}\")", self.produced))
    }

    fn rewrite(&mut self, existing_source: &str, prompt: &str) -> Result<String> {
        Ok(format!("{}\n// {}", existing_source, prompt))
    }
}

/// Ledger whose writes always fail
pub struct BrokenLedger;

impl GenerationLedger for BrokenLedger {
    fn append(&mut self, _: u32, _: f64, _: &str, _: &Metadata) -> Result<()> {
        Err(StratevolveError::Storage("disk full".to_string()))
    }

    fn query(&self, _: &LedgerQuery) -> Result<Vec<GenerationRecord>> {
        Ok(Vec::new())
    }
}
