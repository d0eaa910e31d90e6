//! Test Helper Utilities
//!
//! Shared fixtures for papilio-id integration tests: a temporary root folder
//! with metadata, label mapping and species images, a deterministic model
//! double, and a multipart body builder.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use papilio_id::classifier::{
    ClassifierError, ClassifierModel, ImageClassifier, ImageTensor, LabelMap, OutputActivation,
    Preprocessor,
};
use papilio_id::services::{Identifier, SpeciesImages};
use papilio_id::species::SpeciesStore;
use papilio_id::{build_router, AppState, ServiceStatus};
use serde_json::Value;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// The 75 species of the reference dataset, in class index order
pub const SPECIES: [&str; 75] = [
    "ADONIS", "AFRICAN GIANT SWALLOWTAIL", "AMERICAN SNOOT", "AN 88", "APPOLLO", "ATALA",
    "BANDED ORANGE HELICONIAN", "BANDED PEACOCK", "BECKERS WHITE", "BLACK HAIRSTREAK",
    "BLUE MORPHO", "BLUE SPOTTED CROW", "BROWN SIPROETA", "CABBAGE WHITE", "CAIRNS BIRDWING",
    "CHECQUERED SKIPPER", "CHESTNUT", "CLEOPATRA", "CLODIUS PARNASSIAN", "CLOUDED SULPHUR",
    "COMMON BANDED AWL", "COMMON WOOD-NYMPH", "COPPER TAIL", "CRECENT", "CRIMSON PATCH",
    "DANAID EGGFLY", "EASTERN COMA", "EASTERN DAPPLE WHITE", "EASTERN PINE ELFIN",
    "ELBOWED PIERROT", "GOLD BANDED", "GREAT EGGFLY", "GREAT JAY", "GREEN CELLED CATTLEHEART",
    "GREY HAIRSTREAK", "INDRA SWALLOW", "IPHICLUS SISTER", "JULIA", "LARGE MARBLE", "MALACHITE",
    "MANGROVE SKIPPER", "MESTRA", "METALMARK", "MILBERTS TORTOISESHELL", "MONARCH",
    "MOURNING CLOAK", "ORANGE OAKLEAF", "ORANGE TIP", "ORCHARD SWALLOW", "PAINTED LADY",
    "PAPER KITE", "PEACOCK", "PINE WHITE", "PIPEVINE SWALLOW", "POPINJAY", "PURPLE HAIRSTREAK",
    "PURPLISH COPPER", "QUESTION MARK", "RED ADMIRAL", "RED CRACKER", "RED POSTMAN",
    "RED SPOTTED PURPLE", "SCARCE SWALLOW", "SILVER SPOT SKIPPER", "SLEEPY ORANGE", "SOOTYWING",
    "SOUTHERN DOGFACE", "STRAITED QUEEN", "TROPICAL LEAFWING", "TWO BARRED FLASHER", "ULYSES",
    "VICEROY", "WOOD SATYR", "YELLOW SWALLOW TAIL", "ZEBRA LONG WING",
];

pub const MONARCH_ID: usize = 44;

const HEADER: &str = "id,name,scientific_name,family,wingspan_mm,distribution,habitat,lifecycle_notes,conservation_status,host_plants,youtube_embed_link,general_description";

/// Always predicts one class with fixed confidence
pub struct FixedClassModel {
    pub index: usize,
    pub classes: usize,
    pub probability: f32,
}

impl ClassifierModel for FixedClassModel {
    fn scores(&self, _input: ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        let rest = (1.0 - self.probability) / (self.classes - 1) as f32;
        let mut scores = vec![rest; self.classes];
        scores[self.index] = self.probability;
        Ok(scores)
    }

    fn output_classes(&self) -> Option<usize> {
        Some(self.classes)
    }
}

/// Temporary root folder laid out like a deployment
pub struct Fixture {
    pub root: TempDir,
    pub uploads_dir: PathBuf,
    pub images_dir: PathBuf,
    pub metadata_path: PathBuf,
    pub labels_path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let uploads_dir = root.path().join("uploads");
        let images_dir = root.path().join("butterfly_data").join("images");
        let model_dir = root.path().join("model");
        std::fs::create_dir_all(&uploads_dir).unwrap();
        std::fs::create_dir_all(&images_dir).unwrap();
        std::fs::create_dir_all(&model_dir).unwrap();

        let metadata_path = root.path().join("butterfly_data").join("data.csv");
        std::fs::write(&metadata_path, metadata_csv()).unwrap();

        let labels_path = model_dir.join("class_indices.json");
        std::fs::write(&labels_path, labels_json(&SPECIES)).unwrap();

        // Reference image for the monarch only
        std::fs::write(images_dir.join(format!("{}.jpg", MONARCH_ID)), jpeg_bytes()).unwrap();

        Self {
            root,
            uploads_dir,
            images_dir,
            metadata_path,
            labels_path,
        }
    }

    /// Identifier whose model always picks `index`, with the given label order
    pub fn identifier(&self, labels: &[&str], index: usize) -> Identifier {
        let classes = labels.len();
        let labels = LabelMap::from_json_str(&labels_json(labels)).unwrap();
        let classifier = ImageClassifier::new(
            Box::new(FixedClassModel {
                index,
                classes,
                probability: 0.93,
            }),
            labels,
            Preprocessor::default(),
            OutputActivation::Probabilities,
        );
        let store = SpeciesStore::load(&self.metadata_path).unwrap();
        Identifier::new(classifier, store, SpeciesImages::new(&self.images_dir, "jpg"))
    }

    pub fn ready_state(&self, index: usize) -> AppState {
        self.state_with_labels(&SPECIES, index)
    }

    pub fn state_with_labels(&self, labels: &[&str], index: usize) -> AppState {
        let identifier = self.identifier(labels, index);
        AppState::new(
            ServiceStatus::Ready(Arc::new(identifier)),
            self.uploads_dir.clone(),
            papilio_id::config::DEFAULT_MAX_UPLOAD_BYTES,
        )
    }

    pub fn app(&self, state: AppState) -> axum::Router {
        build_router(state)
    }

    /// Files left behind in the uploads directory
    pub fn leftover_uploads(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.uploads_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

pub fn labels_json(labels: &[&str]) -> String {
    let map: serde_json::Map<String, Value> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.to_string(), Value::from(i)))
        .collect();
    Value::Object(map).to_string()
}

/// Metadata for every species; the monarch row is fully populated
pub fn metadata_csv() -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for (id, name) in SPECIES.iter().enumerate() {
        if id == MONARCH_ID {
            csv.push_str(
                "44,MONARCH,Danaus plexippus,Nymphalidae,95,\"North, Central and South America\",\
                 Meadows and fields,Egg to adult in about a month,Vulnerable,Milkweed,\
                 https://www.youtube.com/embed/monarch,Famous for its long migration\n",
            );
        } else {
            csv.push_str(&format!("{},{},,,,,,,,,,\n", id, name));
        }
    }
    csv
}

pub fn png_bytes() -> Vec<u8> {
    encode(ImageFormat::Png)
}

pub fn jpeg_bytes() -> Vec<u8> {
    encode(ImageFormat::Jpeg)
}

fn encode(format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(32, 24, |x, y| {
        Rgb([(x * 8) as u8, (y * 10) as u8, 200])
    }));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

const BOUNDARY: &str = "papilio-test-boundary";

/// One-part multipart form; `filename: None` omits the filename attribute
pub fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, name
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n", field).as_bytes(),
        ),
    }
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn predict_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    predict_request(multipart_body("file", Some(filename), content))
}

/// Test helper: Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    use http_body_util::BodyExt;
    let bytes = body.collect().await.expect("Should read body").to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
