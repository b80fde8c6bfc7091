use sha1::{Digest, Sha1};

use super::{http_client, mime_for, UploadError};
use crate::config::HostCredentials;

/// Signature for a signed upload: drop empty values, sort keys, join as
/// `key=value` pairs with `&`, append the API secret with no separator,
/// SHA-1, lowercase hex. Fixed external protocol — do not substitute any
/// part of it.
/// https://cloudinary.com/documentation/upload_images#generating_authentication_signatures
pub fn api_signature(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut filtered: Vec<(&str, &str)> = params
        .iter()
        .copied()
        .filter(|(_, v)| !v.is_empty())
        .collect();
    filtered.sort_by_key(|&(k, _)| k);

    let joined = filtered
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Signed multipart upload to Cloudinary; returns the hosted `secure_url`.
pub fn upload(creds: &HostCredentials, filename: &str, bytes: &[u8]) -> Result<String, UploadError> {
    let url = format!(
        "https://api.cloudinary.com/v1_1/{}/image/upload",
        creds.cloud_name
    );
    upload_to(&url, creds, filename, bytes)
}

/// Endpoint-parameterized body of `upload` so tests can point it at a local
/// server.
pub(crate) fn upload_to(
    url: &str,
    creds: &HostCredentials,
    filename: &str,
    bytes: &[u8],
) -> Result<String, UploadError> {
    let timestamp = chrono::Utc::now().timestamp().to_string();

    let params: Vec<(&str, &str)> = vec![
        ("timestamp", timestamp.as_str()),
        ("folder", creds.folder.as_str()),
    ];
    let signature = api_signature(&params, &creds.api_secret);

    let part = reqwest::blocking::multipart::Part::bytes(bytes.to_vec())
        .file_name(filename.to_string())
        .mime_str(mime_for(filename))
        .map_err(|e| UploadError::Malformed(e.to_string()))?;

    let mut form = reqwest::blocking::multipart::Form::new()
        .part("file", part)
        .text("api_key", creds.api_key.clone())
        .text("signature", signature)
        .text("timestamp", timestamp);
    if let Some(folder) = creds.folder() {
        form = form.text("folder", folder.to_string());
    }

    let resp = http_client()?
        .post(url)
        .multipart(form)
        .send()
        .map_err(|e| UploadError::Network(e.to_string()))?;

    // Success is exactly 200; other 2xx codes do not carry a secure_url
    let status = resp.status().as_u16();
    if status != 200 {
        let body = resp.text().unwrap_or_default();
        return Err(UploadError::Rejected { status, body });
    }

    let body: serde_json::Value = resp
        .json()
        .map_err(|e| UploadError::Malformed(e.to_string()))?;
    body.get("secure_url")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| UploadError::Malformed("no secure_url in response".into()))
}
