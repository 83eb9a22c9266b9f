use crate::error::{Result, StratevolveError};
use crate::storage::ledger::{GenerationLedger, LedgerQuery};
use crate::types::{GenerationRecord, Metadata};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS strategies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    generation INTEGER NOT NULL,
    score REAL NOT NULL,
    code TEXT NOT NULL,
    meta TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_strategies_generation ON strategies (generation);
CREATE INDEX IF NOT EXISTS idx_strategies_score ON strategies (score);
";

/// Ledger persisted to a SQLite database
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let journal: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;

        log::info!("Ledger opened at {} (journal={})", path.display(), journal);
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl GenerationLedger for SqliteLedger {
    fn append(
        &mut self,
        generation: u32,
        fitness: f64,
        source_text: &str,
        metadata: &Metadata,
    ) -> Result<()> {
        let meta = serde_json::to_string(metadata)?;
        self.conn.execute(
            "INSERT INTO strategies (generation, score, code, meta, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                i64::from(generation),
                fitness,
                source_text,
                meta,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn query(&self, query: &LedgerQuery) -> Result<Vec<GenerationRecord>> {
        let mut sql = String::from(
            "SELECT id, generation, score, code, meta, created_at FROM strategies",
        );
        let mut args: Vec<i64> = Vec::new();

        match query.generation {
            Some(generation) => {
                sql.push_str(" WHERE generation = ?");
                args.push(i64::from(generation));
            }
            None => sql.push_str(" WHERE generation >= 1"),
        }

        match query.limit {
            Some(limit) => {
                sql.push_str(" ORDER BY score DESC, id ASC LIMIT ?");
                args.push(i64::try_from(limit).unwrap_or(i64::MAX));
            }
            None => sql.push_str(" ORDER BY id ASC"),
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, generation, fitness, source_text, meta, created_at)| -> Result<GenerationRecord> {
                Ok(GenerationRecord {
                    id,
                    generation: u32::try_from(generation).map_err(|_| {
                        StratevolveError::Storage(format!(
                            "Record {} has invalid generation {}",
                            id, generation
                        ))
                    })?,
                    fitness,
                    source_text,
                    metadata: serde_json::from_str(&meta)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map_err(|e| {
                            StratevolveError::Storage(format!(
                                "Record {} has invalid timestamp {}: {}",
                                id, created_at, e
                            ))
                        })?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }
}
