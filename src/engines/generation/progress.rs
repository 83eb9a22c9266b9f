use super::genome::Genome;

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: u32, total: u32);
    fn on_generation_complete(&mut self, generation: u32, best: &Genome, persisted: usize);
}

/// Logs round progress at info level
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: u32, total: u32) {
        log::info!("=== Generation {}/{} ===", generation, total);
    }

    fn on_generation_complete(&mut self, generation: u32, best: &Genome, persisted: usize) {
        match best.report() {
            Some(report) => log::info!(
                "Generation {} complete. Best fitness: {:.4} (profit {:.2}%, drawdown {:.2}%, sharpe {:.2}), {} record(s) saved",
                generation,
                best.fitness(),
                report.net_profit_pct,
                report.max_drawdown_pct,
                report.sharpe_ratio,
                persisted
            ),
            None => log::info!(
                "Generation {} complete. Best fitness: {:.4}, {} record(s) saved",
                generation,
                best.fitness(),
                persisted
            ),
        }
    }
}
