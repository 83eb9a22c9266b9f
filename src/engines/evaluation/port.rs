use crate::error::Result;
use crate::types::PerformanceReport;

/// Boundary to the simulated-trading surface.
///
/// Calls block until a report is available. Timeouts, retries and session
/// handling belong to the implementation; the engine only sees a report or
/// an error.
pub trait CandidateEvaluator {
    fn evaluate(&mut self, source_text: &str) -> Result<PerformanceReport>;
}

impl<E: CandidateEvaluator + ?Sized> CandidateEvaluator for Box<E> {
    fn evaluate(&mut self, source_text: &str) -> Result<PerformanceReport> {
        (**self).evaluate(source_text)
    }
}
