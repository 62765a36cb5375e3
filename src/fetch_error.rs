#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Remote returned status {status} for {url}")]
    RemoteStatus { status: u16, url: String },
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV is missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("Failed to parse date/time: {0}")]
    DateTimeError(String),
    #[error("Failed to parse number: {0}")]
    NumberError(String),
}
