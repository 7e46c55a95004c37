/// Errors that can occur while loading, analysing or rendering a series
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Neither a byte buffer nor an existing file path was supplied
    #[error("CSV not found. Provide a valid path or upload a file.")]
    MissingInput,

    /// Required columns are absent from the header row
    #[error("CSV must contain 'Timestamp' and 'Values' columns (missing: {})", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Configuration rejected by `AnalysisConfig::validate`
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Chart drawing failed
    #[error("Render error: {0}")]
    Render(String),

    /// PNG encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON config parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
