use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::workflow::UploadedImage;

/// Where one submission's files ended up on disk.
#[derive(Debug, Clone)]
pub struct BackupRecord {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Directory name for a submission started at `stamp`, second granularity.
/// Two submissions in the same second to the same base directory share a
/// name; accepted limitation, not mitigated.
pub fn stamp_dir_name(stamp: DateTime<Local>) -> String {
    stamp.format("%Y%m%d_%H%M%S").to_string()
}

/// Strip directory components and path-traversal sequences from a
/// client-supplied filename so the write cannot escape the backup directory.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(name);
    let cleaned = base.replace("..", "_");
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

/// Write every uploaded file into a fresh timestamp-named subdirectory of
/// `base_dir`, in input order. A pre-existing directory of the same name is
/// reused; same-named files within a run overwrite each other. Filesystem
/// errors propagate and are fatal to the submission.
pub fn save(images: &[UploadedImage], base_dir: &Path) -> io::Result<BackupRecord> {
    let directory = base_dir.join(stamp_dir_name(Local::now()));
    fs::create_dir_all(&directory)?;

    let mut files = Vec::with_capacity(images.len());
    for image in images {
        let dest = directory.join(sanitize_filename(&image.filename));
        fs::write(&dest, &image.bytes)?;
        files.push(dest);
    }

    Ok(BackupRecord { directory, files })
}
