//! CLI commands.

pub mod add;
pub mod batch;
pub mod clear;
pub mod config;
pub mod delete;
pub mod list;
pub mod process;
pub mod seed;
pub mod stats;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use tracing::debug;

use rcpt_core::models::{DEFAULT_IMAGE_MIME, ImagePayload, RcptConfig};
use rcpt_core::{ExpenseStore, FileKv};

/// Global options shared by every command.
pub struct Context {
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
}

impl Context {
    pub fn new(config_path: Option<String>, data_dir: Option<PathBuf>) -> Self {
        Self {
            config_path: config_path.map(PathBuf::from),
            data_dir,
        }
    }

    /// Config file in use: `--config`, else the per-user default.
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    /// Load the config file, or defaults when none exists yet.
    pub fn load_config(&self) -> anyhow::Result<RcptConfig> {
        let path = self.config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            return RcptConfig::from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()));
        }
        if self.config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Ok(RcptConfig::default())
    }

    /// Open the file-backed expense store.
    pub fn open_store(&self, config: &RcptConfig) -> Arc<ExpenseStore> {
        let dir = self
            .data_dir
            .clone()
            .unwrap_or_else(|| config.store.data_dir.clone());
        debug!("Using expense store at {}", dir.display());

        Arc::new(ExpenseStore::new(Arc::new(FileKv::new(dir))).with_key(&config.store.key))
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcpt")
        .join("config.json")
}

/// Supported receipt image extensions.
pub fn is_image(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(
        ext.to_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "webp" | "tiff" | "tif" | "bmp" | "gif"
    )
}

/// Read an image file into a payload with its pixel dimensions.
pub fn load_image(path: &Path) -> anyhow::Result<ImagePayload> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    if !is_image(path) {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        anyhow::bail!("Unsupported file format: {}", ext);
    }

    let (width, height) = image::image_dimensions(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let bytes = std::fs::read(path)?;

    let uri = std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();

    Ok(ImagePayload::from_bytes(bytes, width, height)
        .with_mime_type(mime_type(path))
        .with_uri(format!("file://{}", uri)))
}

/// Media type for an image file, from its extension.
pub fn mime_type(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or(DEFAULT_IMAGE_MIME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_follows_extension() {
        assert_eq!(mime_type(Path::new("r.png")), "image/png");
        assert_eq!(mime_type(Path::new("r.JPG")), "image/jpeg");
        assert_eq!(mime_type(Path::new("r.webp")), "image/webp");
        assert_eq!(mime_type(Path::new("r.tif")), "image/tiff");
        assert_eq!(mime_type(Path::new("r.unknown")), "image/jpeg");
    }
}
