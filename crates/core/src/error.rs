use crate::catalog::CatalogError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("question '{0}' has already been answered")]
    DuplicateAnswer(String),
    #[error("no question is pending; the session has already been fully answered")]
    NoPendingQuestion,
    #[error("session cannot be finished with {remaining} question(s) still pending")]
    Incomplete { remaining: usize },
    #[error("input closed before the session was complete")]
    InputClosed,
    #[error("console I/O failed: {0}")]
    ConsoleIo(std::io::Error),
    #[error("failed to create report directory: {0}")]
    ReportDirCreation(std::io::Error),
    #[error("failed to write report file: {0}")]
    ReportWrite(std::io::Error),
    #[error("failed to read report file: {0}")]
    ReportRead(std::io::Error),
    #[error("failed to read catalog file: {0}")]
    CatalogRead(std::io::Error),
    #[error("failed to serialize report: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize report: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
