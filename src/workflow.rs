use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::backup::{self, BackupRecord};
use crate::config::AppConfig;
use crate::hosting::{mime_for, ImageHost};
use crate::mailer::{MailError, Mailer};

/// One file as received from the form; never mutated after intake.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl UploadedImage {
    pub fn new(filename: String, bytes: Vec<u8>) -> Self {
        let mime_type = mime_for(&filename).to_string();
        UploadedImage {
            filename,
            bytes,
            mime_type,
        }
    }
}

/// Built once per submission, sent at most once. Attachments are always the
/// original uploaded bytes, whatever happened to the hosted copies.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<UploadedImage>,
}

/// What the user asked for in one form submission.
#[derive(Debug)]
pub struct Submission {
    pub images: Vec<UploadedImage>,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub backup: bool,
    pub hosting: bool,
}

/// What a completed submission produced. `warning` is set when hosting was
/// requested but fewer URLs came back than files went up.
#[derive(Debug)]
pub struct Outcome {
    pub backup: Option<BackupRecord>,
    pub urls: Vec<String>,
    pub warning: Option<String>,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),
    #[error("backup failed: {0}")]
    Backup(#[from] std::io::Error),
    #[error("email not sent: {0}")]
    Mail(#[from] MailError),
}

/// Append hosted links, the image count, and the backup location to the
/// user's message text.
pub fn compose_body(
    body: &str,
    urls: &[String],
    total_images: usize,
    backup_dir: Option<&Path>,
) -> String {
    let mut text = body.to_string();
    if !urls.is_empty() {
        text.push_str("\n\nLinks:\n");
        text.push_str(&urls.join("\n"));
    }
    text.push_str(&format!("\n\nTotal images: {}", total_images));
    if let Some(dir) = backup_dir {
        text.push_str(&format!("\nBackup folder: {}", dir.display()));
    }
    text
}

/// Run one submission end to end: validate, back up, upload, compose, send.
/// Individual host uploads may fail without failing the submission; backup
/// and mail errors are fatal. No network or disk activity happens before
/// validation passes.
pub fn run(
    config: &AppConfig,
    host: Option<&dyn ImageHost>,
    mailer: &dyn Mailer,
    submission: &Submission,
) -> Result<Outcome, WorkflowError> {
    if submission.images.is_empty() {
        return Err(WorkflowError::Validation(
            "Please upload at least one image.".into(),
        ));
    }
    if submission.recipient.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "Please provide the recipient email address.".into(),
        ));
    }
    if !config.mail.ready() {
        return Err(WorkflowError::Validation(
            "Mailgun is not configured. Set MAILGUN_API_KEY, MAILGUN_DOMAIN and MAILGUN_SENDER."
                .into(),
        ));
    }

    let backup = if submission.backup {
        let record = backup::save(&submission.images, Path::new(&config.backup_dir))?;
        info!(
            "[workflow] backed up {} file(s) to {}",
            record.files.len(),
            record.directory.display()
        );
        Some(record)
    } else {
        None
    };

    let mut urls: Vec<String> = Vec::new();
    let mut warning = None;
    if submission.hosting {
        match host {
            Some(host) => {
                for image in &submission.images {
                    match host.upload(&image.filename, &image.bytes) {
                        Ok(url) => urls.push(url),
                        Err(e) => warn!("[workflow] upload of {} failed: {}", image.filename, e),
                    }
                }
                if urls.len() < submission.images.len() {
                    warning = Some(format!(
                        "{} of {} uploads did not return a URL. Check your image host configuration.",
                        submission.images.len() - urls.len(),
                        submission.images.len()
                    ));
                }
            }
            None => {
                warning =
                    Some("Remote hosting was requested but no image host is configured.".into());
            }
        }
    }

    let email = OutboundEmail {
        sender: config.mail.sender.clone(),
        recipient: submission.recipient.trim().to_string(),
        subject: submission.subject.clone(),
        body: compose_body(
            &submission.body,
            &urls,
            submission.images.len(),
            backup.as_ref().map(|b| b.directory.as_path()),
        ),
        attachments: submission.images.clone(),
    };
    mailer.send(&email)?;
    info!(
        "[workflow] sent {} attachment(s) to {}",
        email.attachments.len(),
        email.recipient
    );

    Ok(Outcome {
        backup,
        urls,
        warning,
    })
}
