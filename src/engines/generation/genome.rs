use crate::types::{Metadata, PerformanceReport};

/// One candidate strategy in the population.
///
/// A genome is immutable once built: the source text never changes and
/// fitness is attached at construction. Operators produce new genomes
/// instead of editing existing ones, so an elite carried into the next
/// round is byte-for-byte the genome that earned its place.
///
/// Seed genomes start at fitness 0 with no report. Children always carry
/// the report they were scored from, unless evaluation failed under the
/// zero-fitness policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    source_text: String,
    fitness: f64,
    report: Option<PerformanceReport>,
    metadata: Metadata,
}

/// Ordered, fixed-size collection of genomes evaluated together in one round
pub type Population = Vec<Genome>;

impl Genome {
    /// Fresh candidate from the generator, not yet evaluated
    pub fn seed(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            fitness: 0.0,
            report: None,
            metadata: Metadata::new(),
        }
    }

    /// Candidate with its fitness already attached
    pub fn scored(
        source_text: impl Into<String>,
        fitness: f64,
        report: Option<PerformanceReport>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            fitness,
            report,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn report(&self) -> Option<&PerformanceReport> {
        self.report.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Highest-fitness genome; ties resolve to whichever the scan meets last
pub fn fittest(population: &[Genome]) -> Option<&Genome> {
    population
        .iter()
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_starts_at_zero() {
        let genome = Genome::seed("strategy(\"a\")");
        assert_eq!(genome.fitness(), 0.0);
        assert!(genome.report().is_none());
        assert!(genome.metadata().is_empty());
    }

    #[test]
    fn test_fittest() {
        let population = vec![
            Genome::scored("a", 0.2, None),
            Genome::scored("b", 0.9, None),
            Genome::scored("c", 0.5, None),
        ];
        assert_eq!(fittest(&population).unwrap().source_text(), "b");
        assert!(fittest(&[]).is_none());
    }
}
