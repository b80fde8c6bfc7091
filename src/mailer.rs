use thiserror::Error;

use crate::config::MailCredentials;
use crate::workflow::OutboundEmail;

/// A failed send is the one failure the user must always see, so unlike the
/// host clients this module raises instead of degrading.
#[derive(Debug, Error)]
pub enum MailError {
    /// Mailgun reached, message refused. Body is passed through verbatim.
    #[error("Mailgun returned {status}: {body}")]
    Rejected { status: u16, body: String },
    /// Timeout, refused connection, DNS failure.
    #[error("Mailgun request failed: {0}")]
    Network(String),
}

/// Seam so workflow tests can substitute a recording fake.
pub trait Mailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

pub struct Mailgun {
    creds: MailCredentials,
}

impl Mailgun {
    pub fn new(creds: MailCredentials) -> Self {
        Mailgun { creds }
    }
}

impl Mailer for Mailgun {
    /// Single POST to the Mailgun messages endpoint, basic auth with the
    /// fixed "api" username, one `attachment` file part per attachment.
    /// https://documentation.mailgun.com/docs/mailgun/api-reference/openapi-final/tag/Messages/
    fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let url = format!("https://api.mailgun.net/v3/{}/messages", self.creds.domain);

        let mut form = reqwest::blocking::multipart::Form::new()
            .text("from", email.sender.clone())
            .text("to", email.recipient.clone())
            .text("subject", email.subject.clone())
            .text("text", email.body.clone());
        for att in &email.attachments {
            let part = reqwest::blocking::multipart::Part::bytes(att.bytes.clone())
                .file_name(att.filename.clone())
                .mime_str(&att.mime_type)
                .map_err(|e| MailError::Network(format!("bad attachment type: {}", e)))?;
            form = form.part("attachment", part);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| MailError::Network(e.to_string()))?;

        let resp = client
            .post(&url)
            .basic_auth("api", Some(&self.creds.api_key))
            .multipart(form)
            .send()
            .map_err(|e| MailError::Network(e.to_string()))?;

        if resp.status().as_u16() >= 400 {
            let status = resp.status().as_u16();
            let body = resp.text().unwrap_or_default();
            return Err(MailError::Rejected { status, body });
        }

        Ok(())
    }
}
