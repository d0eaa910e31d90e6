//! Reference photos of each species, embedded into reports as data URIs
//!
//! One file per species at `<images_dir>/<id>.<extension>`.

use crate::species::SpeciesId;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct SpeciesImages {
    dir: PathBuf,
    extension: String,
}

impl SpeciesImages {
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Conventional location of the image for `id`
    pub fn path_for(&self, id: SpeciesId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, self.extension))
    }

    /// `data:<mime>;base64,...` for the species image, or `None` when the
    /// file is missing or unreadable
    pub fn data_uri(&self, id: SpeciesId) -> Option<String> {
        let path = self.path_for(id);
        match std::fs::read(&path) {
            Ok(bytes) => {
                let mime = mime_guess::from_path(&path).first_or_octet_stream();
                Some(format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(bytes)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Species image not found at {}", path.display());
                None
            }
            Err(e) => {
                warn!("Failed to read species image {}: {}", path.display(), e);
                None
            }
        }
    }
}
