pub mod cloudinary;
pub mod imgbb;

use std::path::Path;

use thiserror::Error;

use crate::config::{HostCredentials, Provider};

/// Why a single upload attempt produced no URL. The orchestrator treats all
/// variants the same (the link is simply missing from the email) but callers
/// can still tell a dead network from a provider rejection.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected response shape: {0}")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Seam between the orchestrator and the live provider clients so workflow
/// tests can substitute recording fakes.
pub trait ImageHost {
    fn upload(&self, filename: &str, bytes: &[u8]) -> Result<String, UploadError>;
}

/// Live client for whichever provider the configuration selected. One
/// attempt per file, no retry.
pub struct HostClient {
    provider: Provider,
    creds: HostCredentials,
}

impl HostClient {
    pub fn new(provider: Provider, creds: HostCredentials) -> Self {
        HostClient { provider, creds }
    }

    /// Upload a file already on disk. Behaves exactly like `upload` apart
    /// from where the bytes come from.
    pub fn upload_path(&self, path: &Path) -> Result<String, UploadError> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin");
        self.upload(filename, &bytes)
    }
}

impl ImageHost for HostClient {
    fn upload(&self, filename: &str, bytes: &[u8]) -> Result<String, UploadError> {
        match self.provider {
            Provider::Cloudinary => cloudinary::upload(&self.creds, filename, bytes),
            Provider::Imgbb => imgbb::upload(&self.creds, bytes),
        }
    }
}

/// MIME type from the filename extension; providers and Mailgun both want
/// one, and browsers don't always send it.
pub fn mime_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

pub(crate) fn http_client() -> Result<reqwest::blocking::Client, UploadError> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .map_err(|e| UploadError::Network(e.to_string()))
}
