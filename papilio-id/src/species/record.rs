//! Species record type and CSV row mapping

use serde::{Deserialize, Serialize, Serializer};

/// Placeholder for metadata columns that are blank or absent
pub const NOT_AVAILABLE: &str = "N/A";

/// Species id, shared with the classifier's output index space
pub type SpeciesId = u32;

/// Wingspan in millimetres
///
/// Serialises as a JSON number (an integer when the value is whole), or as
/// `"N/A"` when the metadata has no usable value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Wingspan {
    Millimeters(f64),
    #[default]
    NotAvailable,
}

impl Wingspan {
    fn parse(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|mm| mm.is_finite() && *mm >= 0.0)
            .map(Wingspan::Millimeters)
            .unwrap_or(Wingspan::NotAvailable)
    }

    pub fn millimeters(&self) -> Option<f64> {
        match self {
            Wingspan::Millimeters(mm) => Some(*mm),
            Wingspan::NotAvailable => None,
        }
    }
}

impl Serialize for Wingspan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Wingspan::Millimeters(mm) if mm.fract() == 0.0 && *mm <= u64::MAX as f64 => {
                serializer.serialize_u64(*mm as u64)
            }
            Wingspan::Millimeters(mm) => serializer.serialize_f64(*mm),
            Wingspan::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// One row of the species metadata table
///
/// Immutable after load. Optional text columns default to [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesRecord {
    pub id: SpeciesId,
    /// Common name, upper case in the reference dataset (e.g. "MONARCH")
    pub name: String,
    pub scientific_name: String,
    pub family: String,
    pub wingspan_mm: Wingspan,
    pub distribution: String,
    pub habitat: String,
    pub lifecycle_notes: String,
    pub conservation_status: String,
    pub host_plants: String,
    pub youtube_embed_link: String,
    pub general_description: String,
}

impl SpeciesRecord {
    /// Case-insensitive comparison against a classifier label
    pub fn name_matches(&self, label: &str) -> bool {
        self.name.to_lowercase() == label.to_lowercase()
    }
}

/// Raw CSV row; every column optional so defaults are applied in one place
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SpeciesRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    scientific_name: Option<String>,
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    wingspan_mm: Option<String>,
    #[serde(default)]
    distribution: Option<String>,
    #[serde(default)]
    habitat: Option<String>,
    #[serde(default)]
    lifecycle_notes: Option<String>,
    #[serde(default)]
    conservation_status: Option<String>,
    #[serde(default)]
    host_plants: Option<String>,
    #[serde(default)]
    youtube_embed_link: Option<String>,
    #[serde(default)]
    general_description: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn text_or_default(value: Option<String>) -> String {
    present(value).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl SpeciesRow {
    /// Convert to a record, or explain why the row is unusable
    pub(crate) fn into_record(self) -> Result<SpeciesRecord, String> {
        let raw_id = present(self.id).ok_or_else(|| "missing id".to_string())?;
        let id = raw_id
            .parse::<SpeciesId>()
            .map_err(|_| format!("invalid id '{}'", raw_id))?;
        let name = present(self.name).ok_or_else(|| format!("missing name for id {}", id))?;

        Ok(SpeciesRecord {
            id,
            name,
            scientific_name: text_or_default(self.scientific_name),
            family: text_or_default(self.family),
            wingspan_mm: Wingspan::parse(self.wingspan_mm.as_deref()),
            distribution: text_or_default(self.distribution),
            habitat: text_or_default(self.habitat),
            lifecycle_notes: text_or_default(self.lifecycle_notes),
            conservation_status: text_or_default(self.conservation_status),
            host_plants: text_or_default(self.host_plants),
            youtube_embed_link: text_or_default(self.youtube_embed_link),
            general_description: text_or_default(self.general_description),
        })
    }
}
