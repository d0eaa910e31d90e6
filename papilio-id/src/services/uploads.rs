//! Upload validation and per-request scratch files
//!
//! An uploaded image lives on disk only for the duration of one request.
//! [`ScratchFile`] removes it when dropped, so every exit path of the
//! handler (success, unidentified, decode failure, panic unwinding) cleans up.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Accepted upload extensions (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// True when `filename` ends in an allowed image extension
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Reduce a client-supplied filename to a safe single path component
///
/// Directory parts are dropped, whitespace becomes `_`, anything other than
/// ASCII alphanumerics, `.`, `-` and `_` is removed, and leading dots are
/// stripped. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Uploaded file on disk, deleted on drop
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Write `bytes` to a uniquely named file in `dir`
    pub async fn create(dir: &Path, original_name: &str, bytes: &[u8]) -> io::Result<Self> {
        let safe = secure_filename(original_name);
        let name = if safe.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            format!("{}_{}", Uuid::new_v4(), safe)
        };
        let path = dir.join(name);

        // Guard exists before the write so a partial file is also removed
        let scratch = Self { path };
        tokio::fs::write(&scratch.path, bytes).await?;
        debug!("Stored upload at {}", scratch.path.display());
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed upload {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove upload {}: {}", self.path.display(), e),
        }
    }
}
