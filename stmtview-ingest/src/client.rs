//! HTTP client for the statement analysis service.
//!
//! The service exposes three endpoints: a multipart upload and two JSON
//! reads for the parsed statement and its statistics.

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use stmtview_core::{BankStatement, Statistics};
use tracing::debug;

use crate::error::IngestError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const UPLOAD_PATH: &str = "/upload";
pub const STATEMENT_PATH: &str = "/load_bank_statement";
pub const STATISTICS_PATH: &str = "/get_statistics";

/// The analysis service as seen by the dashboard.
pub trait AnalysisService {
    fn upload(&self, file: &Path) -> impl Future<Output = Result<(), IngestError>> + Send;

    fn load_bank_statement(&self) -> impl Future<Output = Result<BankStatement, IngestError>> + Send;

    fn get_statistics(&self) -> impl Future<Output = Result<Statistics, IngestError>> + Send;
}

/// Local checks before anything goes over the wire: the file exists and has
/// a `.pdf` extension, the only kind the service accepts.
pub fn validate_upload(file: &Path) -> Result<(), IngestError> {
    let is_pdf = file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf || !file.is_file() {
        return Err(IngestError::InvalidFile(file.to_path_buf()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalysisService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, IngestError> {
        let resp = self.client.get(self.url(endpoint)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IngestError::Fetch {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        debug!(endpoint, bytes = text.len(), "fetched");
        serde_json::from_str(&text).map_err(|source| IngestError::Decode { endpoint, source })
    }
}

impl AnalysisService for HttpAnalysisService {
    async fn upload(&self, file: &Path) -> Result<(), IngestError> {
        validate_upload(file)?;

        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "statement.pdf".to_string());
        debug!(file = %file.display(), bytes = bytes.len(), "uploading");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IngestError::Upload {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn load_bank_statement(&self) -> Result<BankStatement, IngestError> {
        self.get_json(STATEMENT_PATH).await
    }

    async fn get_statistics(&self) -> Result<Statistics, IngestError> {
        self.get_json(STATISTICS_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_non_pdf() {
        let err = validate_upload(Path::new("Cargo.toml")).unwrap_err();
        assert!(matches!(err, IngestError::InvalidFile(_)));
    }

    #[test]
    fn test_validate_rejects_missing_pdf() {
        assert!(validate_upload(Path::new("does-not-exist.pdf")).is_err());
    }

    #[test]
    fn test_validate_accepts_uppercase_extension() {
        let file = tempfile::Builder::new().suffix(".PDF").tempfile().unwrap();
        assert!(validate_upload(file.path()).is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let svc = HttpAnalysisService::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(svc.url(UPLOAD_PATH), "http://localhost:5000/upload");
    }
}
