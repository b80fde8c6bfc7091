use base64::Engine;

use super::{http_client, UploadError};
use crate::config::HostCredentials;

const UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

/// Key-based upload to imgbb; the payload travels as a base64 form field.
/// https://api.imgbb.com/
pub fn upload(creds: &HostCredentials, bytes: &[u8]) -> Result<String, UploadError> {
    upload_to(UPLOAD_URL, creds, bytes)
}

/// Endpoint-parameterized body of `upload` so tests can point it at a local
/// server.
pub(crate) fn upload_to(
    url: &str,
    creds: &HostCredentials,
    bytes: &[u8],
) -> Result<String, UploadError> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

    let resp = http_client()?
        .post(url)
        .form(&[("key", creds.imgbb_key.as_str()), ("image", encoded.as_str())])
        .send()
        .map_err(|e| UploadError::Network(e.to_string()))?;

    // Success is exactly 200 plus the JSON success flag
    let status = resp.status().as_u16();
    if status != 200 {
        let body = resp.text().unwrap_or_default();
        return Err(UploadError::Rejected { status, body });
    }

    let body: serde_json::Value = resp
        .json()
        .map_err(|e| UploadError::Malformed(e.to_string()))?;
    if body.get("success").and_then(|v| v.as_bool()) != Some(true) {
        return Err(UploadError::Malformed("success flag not set".into()));
    }
    body.get("data")
        .and_then(|d| d.get("url"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| UploadError::Malformed("no data.url in response".into()))
}
