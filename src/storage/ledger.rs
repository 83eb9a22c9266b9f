use crate::error::Result;
use crate::types::{GenerationRecord, Metadata};
use chrono::Utc;

/// Filter for reading the ledger back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerQuery {
    /// Exact generation; `None` means every real generation (>= 1)
    pub generation: Option<u32>,
    /// When set, the best `limit` records by fitness, highest first
    pub limit: Option<usize>,
}

impl LedgerQuery {
    pub fn generation(generation: u32) -> Self {
        Self {
            generation: Some(generation),
            limit: None,
        }
    }

    pub fn top(limit: usize) -> Self {
        Self {
            generation: None,
            limit: Some(limit),
        }
    }

    pub(crate) fn matches(&self, generation: u32) -> bool {
        match self.generation {
            Some(wanted) => generation == wanted,
            None => generation >= 1,
        }
    }
}

/// Append-only history of per-generation results.
///
/// Generation 0 is reserved for placeholders written before any round has
/// been evaluated and is hidden from unfiltered queries.
pub trait GenerationLedger {
    fn append(
        &mut self,
        generation: u32,
        fitness: f64,
        source_text: &str,
        metadata: &Metadata,
    ) -> Result<()>;

    fn query(&self, query: &LedgerQuery) -> Result<Vec<GenerationRecord>>;
}

impl<L: GenerationLedger + ?Sized> GenerationLedger for Box<L> {
    fn append(
        &mut self,
        generation: u32,
        fitness: f64,
        source_text: &str,
        metadata: &Metadata,
    ) -> Result<()> {
        (**self).append(generation, fitness, source_text, metadata)
    }

    fn query(&self, query: &LedgerQuery) -> Result<Vec<GenerationRecord>> {
        (**self).query(query)
    }
}

/// Ledger kept in process memory, for dry runs and tests
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: Vec<GenerationRecord>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl GenerationLedger for InMemoryLedger {
    fn append(
        &mut self,
        generation: u32,
        fitness: f64,
        source_text: &str,
        metadata: &Metadata,
    ) -> Result<()> {
        let id = self.records.len() as i64 + 1;
        self.records.push(GenerationRecord {
            id,
            generation,
            fitness,
            source_text: source_text.to_string(),
            metadata: metadata.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn query(&self, query: &LedgerQuery) -> Result<Vec<GenerationRecord>> {
        let mut records: Vec<GenerationRecord> = self
            .records
            .iter()
            .filter(|r| query.matches(r.generation))
            .cloned()
            .collect();

        if let Some(limit) = query.limit {
            records.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
            records.truncate(limit);
        }

        Ok(records)
    }
}
