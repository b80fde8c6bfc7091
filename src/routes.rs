use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::tokio::task;
use rocket::State;
use rocket_dyn_templates::Template;
use serde::Serialize;
use serde_json::{json, Value};

use crate::backup::sanitize_filename;
use crate::config::AppConfig;
use crate::hosting::{HostClient, ImageHost};
use crate::mailer::Mailgun;
use crate::workflow::{self, Submission, UploadedImage};

fn page_context(config: &AppConfig) -> Value {
    json!({
        "mail_ready": config.mail.ready(),
        "provider": config.host.preferred_provider().map(|p| p.label()),
        "backup_dir": config.backup_dir,
        "default_subject": "Your images from snapsend",
        "default_body": "Please find the attached images.",
    })
}

#[get("/")]
pub fn index(config: &State<AppConfig>) -> Template {
    Template::render("index", page_context(config))
}

/// Readiness snapshot served by `GET /api/status`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub mail_ready: bool,
    pub cloudinary_ready: bool,
    pub imgbb_ready: bool,
    pub provider: Option<&'static str>,
    pub backup_dir: String,
}

pub fn status_report(config: &AppConfig) -> StatusReport {
    StatusReport {
        mail_ready: config.mail.ready(),
        cloudinary_ready: config.host.cloudinary_ready(),
        imgbb_ready: config.host.imgbb_ready(),
        provider: config.host.preferred_provider().map(|p| p.label()),
        backup_dir: config.backup_dir.clone(),
    }
}

#[get("/api/status")]
pub fn status(config: &State<AppConfig>) -> Json<StatusReport> {
    Json(status_report(config))
}

#[derive(FromForm)]
pub struct SendForm<'f> {
    pub images: Vec<TempFile<'f>>,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub backup: bool,
    pub hosting: bool,
}

/// Client-supplied name of a temp file, falling back to the field name.
fn original_name(file: &TempFile<'_>) -> String {
    file.raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .or_else(|| file.name().map(|n| n.to_string()))
        .unwrap_or_else(|| "upload.bin".to_string())
}

/// Spool a temp file to disk and read it back into memory. The spool copy is
/// removed on every path so nothing outlives the request.
async fn read_upload(file: &mut TempFile<'_>, spool: &std::path::Path) -> std::io::Result<Vec<u8>> {
    file.persist_to(spool).await?;
    let bytes = rocket::tokio::fs::read(spool).await;
    let _ = rocket::tokio::fs::remove_file(spool).await;
    bytes
}

#[post("/send", data = "<form>")]
pub async fn send(config: &State<AppConfig>, mut form: Form<SendForm<'_>>) -> Template {
    let spool_base = std::env::temp_dir();
    let stamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();

    let mut images = Vec::new();
    for (idx, file) in form.images.iter_mut().enumerate() {
        // A nameless zero-length part is the browser's bare submit, not a
        // file; a named zero-byte file is still attached as selected
        if file.len() == 0 && file.raw_name().is_none() {
            continue;
        }
        let name = sanitize_filename(&original_name(file));
        let spool = spool_base.join(format!("snapsend_{}_{}_{}", std::process::id(), stamp, idx));
        match read_upload(file, &spool).await {
            Ok(bytes) => images.push(UploadedImage::new(name, bytes)),
            Err(e) => {
                let mut ctx = page_context(config);
                ctx["error"] = json!(format!("Could not read upload {}: {}", name, e));
                return Template::render("index", ctx);
            }
        }
    }

    let image_count = images.len();
    let recipient = form.recipient.trim().to_string();
    let submission = Submission {
        images,
        recipient: form.recipient.clone(),
        subject: form.subject.clone(),
        body: form.body.clone(),
        backup: form.backup,
        hosting: form.hosting,
    };

    // The workflow runs blocking HTTP clients; keep it off the async workers.
    let cfg = config.inner().clone();
    let result = task::spawn_blocking(move || {
        let host = cfg
            .host
            .preferred_provider()
            .map(|p| HostClient::new(p, cfg.host.clone()));
        let mailer = Mailgun::new(cfg.mail.clone());
        workflow::run(
            &cfg,
            host.as_ref().map(|h| h as &dyn ImageHost),
            &mailer,
            &submission,
        )
    })
    .await;

    let mut ctx = page_context(config);
    match result {
        Ok(Ok(outcome)) => {
            ctx["success"] = json!(format!(
                "Sent {} image(s) to {}.",
                image_count, recipient
            ));
            if let Some(record) = &outcome.backup {
                ctx["backup_path"] = json!(record.directory.display().to_string());
            }
            if !outcome.urls.is_empty() {
                ctx["urls"] = json!(outcome.urls);
            }
            if let Some(w) = &outcome.warning {
                ctx["warning"] = json!(w);
            }
        }
        Ok(Err(e)) => {
            ctx["error"] = json!(e.to_string());
        }
        Err(e) => {
            ctx["error"] = json!(format!("Submission task failed: {}", e));
        }
    }
    Template::render("index", ctx)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![index, send, status]
}
