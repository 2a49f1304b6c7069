use locus::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Gazetteer line {line}: {source}")]
    Gazetteer {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid record {name:?}: {reason}")]
    InvalidRecord { name: String, reason: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl From<IndexError> for BackendError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::Io(e) => Self::Unavailable(e.to_string()),
            e => Self::Other(e.into()),
        }
    }
}
