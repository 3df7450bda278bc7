use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("not a PDF statement: {0}")]
    InvalidFile(PathBuf),
    #[error("upload rejected: {status} {body}")]
    Upload { status: u16, body: String },
    #[error("{endpoint} failed: {status} {body}")]
    Fetch {
        endpoint: &'static str,
        status: u16,
        body: String,
    },
    #[error("could not decode {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        source: serde_json::Error,
    },
    #[error("results not ready after {attempts} attempts")]
    NotReady { attempts: u32 },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("reading statement: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Results endpoints answering with an error or a placeholder body while
    /// the service is still working.
    pub fn is_pending(&self) -> bool {
        matches!(self, IngestError::Fetch { .. } | IngestError::Decode { .. })
    }
}
