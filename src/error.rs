use thiserror::Error;

#[derive(Error, Debug)]
pub enum StratevolveError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Could not extract {field} from report")]
    Parse { field: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl StratevolveError {
    /// True for failures raised while turning a candidate into a report.
    /// A parse failure is an evaluation failure from the engine's side.
    pub fn is_evaluation_failure(&self) -> bool {
        matches!(self, Self::Evaluation(_) | Self::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, StratevolveError>;
