//! Identification services

pub mod alignment;
pub mod identifier;
pub mod species_images;
pub mod uploads;

pub use alignment::{check_alignment, AlignmentReport, LabelConflict};
pub use identifier::{ButterflyReport, Identification, Identifier, Unidentified};
pub use species_images::SpeciesImages;
pub use uploads::{allowed_file, secure_filename, ScratchFile, ALLOWED_EXTENSIONS};
