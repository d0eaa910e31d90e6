//! One-shot identification behind the `papilio-identify` binary
//!
//! Exit status: 0 identified, 2 not identified, 1 on any error.

use anyhow::{Context, Result};
use std::path::Path;

use crate::services::{Identification, Identifier};

/// Characters of the image data URI kept unless the full image is requested
pub const IMAGE_PREVIEW_CHARS: usize = 50;

pub const EXIT_IDENTIFIED: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_IDENTIFIED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliOutcome {
    /// Output is the report as pretty JSON
    Identified,
    /// Output is a one-line reason
    NotIdentified,
}

/// Process exit status for a finished run
pub fn exit_code(result: &Result<(CliOutcome, String)>) -> u8 {
    match result {
        Ok((CliOutcome::Identified, _)) => EXIT_IDENTIFIED,
        Ok((CliOutcome::NotIdentified, _)) => EXIT_NOT_IDENTIFIED,
        Err(_) => EXIT_FAILURE,
    }
}

/// First [`IMAGE_PREVIEW_CHARS`] characters followed by `...`
pub fn preview_image(uri: &str) -> String {
    if uri.chars().count() <= IMAGE_PREVIEW_CHARS {
        return uri.to_string();
    }
    let head: String = uri.chars().take(IMAGE_PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// Identify the image at `image` and render the outcome for the terminal
pub fn identify_image(
    identifier: &Identifier,
    image: &Path,
    full_image: bool,
) -> Result<(CliOutcome, String)> {
    let outcome = identifier
        .identify_path(image)
        .with_context(|| format!("Failed to classify {}", image.display()))?;

    match outcome {
        Identification::Identified(mut report) => {
            if !full_image {
                report.image = report.image.as_deref().map(preview_image);
            }
            Ok((CliOutcome::Identified, serde_json::to_string_pretty(&report)?))
        }
        Identification::Unidentified(reason) => Ok((
            CliOutcome::NotIdentified,
            format!("Could not identify {}: {}", image.display(), reason),
        )),
    }
}
