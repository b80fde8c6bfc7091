use std::fs;
use std::path::Path;
use std::process;

use log::{error, info, warn};

use crate::config::AppConfig;

/// Template files the form UI cannot run without
const CRITICAL_TEMPLATES: &[&str] = &["templates/index.html.tera"];

/// Run all boot checks. Call this before Rocket launches. Creates the backup
/// base directory, verifies it is writable, and aborts if critical files are
/// absent.
pub fn run(config: &AppConfig) {
    info!("snapsend boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Backup base directory ───────────────────────
    let backup_dir = Path::new(&config.backup_dir);
    if !backup_dir.exists() {
        match fs::create_dir_all(backup_dir) {
            Ok(_) => info!("  Created backup directory: {}", config.backup_dir),
            Err(e) => {
                error!("  FAILED to create backup directory {}: {}", config.backup_dir, e);
                errors += 1;
            }
        }
    }
    if backup_dir.exists() {
        let test_file = backup_dir.join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                warn!("  Backup directory not writable: {} (local backups will fail)", e);
                warnings += 1;
            }
        }
    }

    // ── 2. Critical templates ──────────────────────────
    for file in CRITICAL_TEMPLATES {
        if !Path::new(file).exists() {
            error!("  MISSING critical template: {}", file);
            errors += 1;
        }
    }

    // ── 3. Rocket.toml exists ──────────────────────────
    if !Path::new("Rocket.toml").exists() {
        warn!("  Rocket.toml not found — using default config");
        warnings += 1;
    }

    // ── 4. Credential readiness ────────────────────────
    if !config.mail.ready() {
        warn!("  Mailgun not configured — submissions will be rejected at validation");
        warnings += 1;
    }
    match config.host.preferred_provider() {
        Some(p) => info!("  Image host: {}", p.label()),
        None => {
            warn!("  No image host configured — hosted links disabled");
            warnings += 1;
        }
    }

    // ── Summary ────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            errors, warnings
        );
        process::exit(1);
    }

    if warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}
