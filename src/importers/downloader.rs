use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Google Sheets export endpoint; append the spreadsheet id
pub const GOOGLE_SHEETS_EXPORT_URL: &str =
    "https://docs.google.com/spreadsheets/export?exportFormat=xlsx&id=";

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("File not found (404): {0}")]
    NotFound(String),

    #[error("Server error (5xx): {0}")]
    ServerError(String),

    #[error("Unexpected status {status} while downloading {url}")]
    UnexpectedStatus { status: u16, url: String },
}

/// Downloads the gauging workbook from its export URL
#[derive(Clone)]
pub struct WorkbookDownloader {
    client: Client,
    url: String,
}

impl WorkbookDownloader {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    /// Downloader for a Google Sheets workbook exported as xlsx
    pub fn google_sheet(sheet_id: &str) -> Self {
        Self::new(format!("{GOOGLE_SHEETS_EXPORT_URL}{sheet_id}"))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the workbook bytes
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn download(&self) -> Result<Vec<u8>, DownloadError> {
        info!("Downloading workbook: {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            debug!("Downloaded workbook ({} bytes)", bytes.len());
            Ok(bytes.to_vec())
        } else if status.as_u16() == 404 {
            Err(DownloadError::NotFound(format!(
                "{} not found on server",
                self.url
            )))
        } else if status.is_server_error() {
            Err(DownloadError::ServerError(format!(
                "Server error {status} while downloading {}",
                self.url
            )))
        } else {
            Err(DownloadError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            })
        }
    }
}
