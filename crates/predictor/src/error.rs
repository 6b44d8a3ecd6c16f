use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown value '{value}' in column '{column}'")]
    UnknownCategory {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("dataset contains no rows")]
    Empty,
    #[error("dataset has {0} row(s); at least 2 are needed to hold out a test split")]
    TooSmall(usize),
}

pub type DatasetResult<T> = std::result::Result<T, DatasetError>;
