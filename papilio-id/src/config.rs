//! Configuration for papilio-id
//!
//! Bootstrap settings come from `papilio-id.toml`; every key is optional.
//! Relative paths resolve against the root folder.
//!
//! ```toml
//! root_folder = "/srv/papilio"
//! bind_address = "0.0.0.0"
//! port = 5000
//! max_upload_bytes = 16777216
//!
//! [logging]
//! level = "info"
//!
//! [model]
//! path = "model/butterfly_classifier.onnx"
//! labels_path = "model/class_indices.json"
//! input_width = 224
//! input_height = 224
//! layout = "nhwc"            # or "nchw"
//! activation = "probabilities" # or "logits"
//!
//! [data]
//! metadata_path = "butterfly_data/data.csv"
//! images_dir = "butterfly_data/images"
//! image_extension = "jpg"
//! uploads_dir = "uploads"
//! ```

use crate::classifier::{OutputActivation, TensorLayout};
use papilio_common::config::{
    default_config_path, load_toml_or_default, resolve_path, LoggingConfig, RootFolderResolver,
};
use papilio_common::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Module name used in logs and for the TOML file name
pub const MODULE_NAME: &str = "papilio-id";

pub const DEFAULT_PORT: u16 = 5000;

/// 16 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub logging: LoggingConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            logging: LoggingConfig::default(),
            model: ModelConfig::default(),
            data: DataConfig::default(),
        }
    }
}

/// `[model]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub labels_path: PathBuf,
    pub input_width: u32,
    pub input_height: u32,
    pub layout: TensorLayout,
    pub activation: OutputActivation,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/butterfly_classifier.onnx"),
            labels_path: PathBuf::from("model/class_indices.json"),
            input_width: 224,
            input_height: 224,
            layout: TensorLayout::Nhwc,
            activation: OutputActivation::Probabilities,
        }
    }
}

/// `[data]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub metadata_path: PathBuf,
    pub images_dir: PathBuf,
    pub image_extension: String,
    pub uploads_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            metadata_path: PathBuf::from("butterfly_data/data.csv"),
            images_dir: PathBuf::from("butterfly_data/images"),
            image_extension: "jpg".to_string(),
            uploads_dir: PathBuf::from("uploads"),
        }
    }
}

/// Fully resolved settings; every path is absolute or root-relative-resolved
#[derive(Debug, Clone)]
pub struct Settings {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub log_level: String,
    pub model: ModelConfig,
    pub data: DataConfig,
}

impl Settings {
    /// Resolve all relative paths in `config` against `root_folder`
    pub fn resolve(config: TomlConfig, root_folder: PathBuf) -> Self {
        let root = root_folder.as_path();
        let model = ModelConfig {
            path: resolve_path(root, &config.model.path),
            labels_path: resolve_path(root, &config.model.labels_path),
            ..config.model
        };
        let data = DataConfig {
            metadata_path: resolve_path(root, &config.data.metadata_path),
            images_dir: resolve_path(root, &config.data.images_dir),
            uploads_dir: resolve_path(root, &config.data.uploads_dir),
            ..config.data
        };

        Self {
            bind_address: config.bind_address,
            port: config.port,
            max_upload_bytes: config.max_upload_bytes,
            log_level: config.logging.level,
            model,
            data,
            root_folder,
        }
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Command-line overrides, applied over the TOML file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
}

/// Load `papilio-id.toml` (or the file named in `overrides`), resolve the
/// root folder and apply command-line overrides
pub fn load_settings(overrides: ConfigOverrides) -> Result<Settings> {
    let config_path = overrides
        .config_path
        .clone()
        .or_else(|| default_config_path(&format!("{}.toml", MODULE_NAME)));
    let config: TomlConfig = load_toml_or_default(config_path.as_deref())?;
    Ok(apply_overrides(config, overrides))
}

fn apply_overrides(mut config: TomlConfig, overrides: ConfigOverrides) -> Settings {
    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_override(overrides.root_folder)
        .with_toml_root(config.root_folder.clone())
        .resolve();

    if let Some(bind) = overrides.bind_address {
        config.bind_address = bind;
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }

    Settings::resolve(config, root_folder)
}

/// Convenience for tests and tools that already know the root folder
pub fn settings_for_root(root_folder: &Path) -> Settings {
    Settings::resolve(TomlConfig::default(), root_folder.to_path_buf())
}
