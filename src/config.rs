use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::preprocessing::schema::REQUIRED_FIELDS;

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub artifacts: ArtifactConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl AppConfig {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_yaml(&content)?)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Attach a permissive CORS layer to every route.
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors: true,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ArtifactConfig {
    /// Fitted prediction pipeline, `.onnx` or `.json` (linear model).
    pub pipeline: PathBuf,
    /// Column name -> fitted class list.
    pub encoders: PathBuf,
    /// Column order fed to single-tensor pipelines.
    #[serde(default = "default_features")]
    pub features: Vec<String>,
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ExtractionConfig {
    #[serde(default = "std::env::temp_dir")]
    pub staging_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            staging_dir: std::env::temp_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_port() -> u16 {
    5000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_features() -> Vec<String> {
    REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_intra_threads() -> usize {
    4
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
