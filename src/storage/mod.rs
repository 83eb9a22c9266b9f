pub mod ledger;
pub mod sqlite;

pub use ledger::{GenerationLedger, InMemoryLedger, LedgerQuery};
pub use sqlite::SqliteLedger;
