//! Generator configuration.
//!
//! Handles loading and validating `placeholder.toml`. Every key is optional;
//! a missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # seed = 42               # Fixed seed for reproducible output (omit = random)
//!
//! [output]
//! format = "jpg"            # jpg | png | gif (+ bmp | tif | ico when extended)
//! quality = 90              # JPEG quality (1-100)
//! # directory = "out"       # Where `save` writes (omit = system temp dir)
//!
//! [text]
//! # font = "fonts/OpenSans-Regular.ttf"   # omit = system sans-serif
//! size = 20
//! margin = 10
//!
//! [backend]
//! extended_formats = true   # Enable bmp, tif and ico
//!
//! [gallery]
//! # path = "photos"         # Registers the Gallery source
//! resize_mode = "fit"       # fit | resize
//!
//! [remote]
//! enabled = false           # Register remote photo services
//! timeout_secs = 30
//! user_agent = "placeholder-gen/0.1.0"
//! sources = ["LoremFlickr", "LoremPixel", "PicsumPhotos", "PlaceKitten", "PlaceImg", "Unsplash"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::imaging::{OutputFormat, Quality, ResizeMode};
use crate::session::SessionOptions;
use crate::sources::remote::{DEFAULT_USER_AGENT, REMOTE_SOURCE_NAMES};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "placeholder.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `placeholder.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Seed for the random generator; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub output: OutputConfig,
    pub text: TextConfig,
    pub backend: BackendConfig,
    pub gallery: GalleryConfig,
    pub remote: RemoteConfig,
}

impl GeneratorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        let format = self.output.output_format()?;
        if !self.backend.extended_formats && !OutputFormat::BASIC.contains(&format) {
            return Err(ConfigError::Validation(format!(
                "output.format {} requires backend.extended_formats",
                self.output.format
            )));
        }
        if !(self.text.size.is_finite() && self.text.size > 0.0) {
            return Err(ConfigError::Validation(
                "text.size must be a positive number".into(),
            ));
        }
        self.gallery.resize_mode()?;
        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "remote.timeout_secs must be non-zero".into(),
            ));
        }
        if let Some(unknown) = self
            .remote
            .sources
            .iter()
            .find(|name| !REMOTE_SOURCE_NAMES.contains(&name.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "remote.sources: unknown source {unknown} (expected one of {})",
                REMOTE_SOURCE_NAMES.join(", ")
            )));
        }
        Ok(())
    }

    /// Session defaults derived from `[output]` and `[text]`.
    pub fn session_options(&self) -> Result<SessionOptions, ConfigError> {
        Ok(SessionOptions {
            format: self.output.output_format()?,
            extension: Some(self.output.format.clone()),
            quality: Quality::new(self.output.quality),
            font: self.text.font.clone(),
            text_size: self.text.size,
            text_margin: self.text.margin,
            directory: self.output.directory.clone(),
        })
    }
}

/// Output encoding and destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File extension of the default output format.
    pub format: String,
    /// JPEG quality (1-100).
    pub quality: u32,
    /// Directory for saved files; `None` uses the system temp dir.
    pub directory: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "jpg".to_string(),
            quality: 90,
            directory: None,
        }
    }
}

impl OutputConfig {
    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        self.format
            .parse()
            .map_err(|e: crate::error::Error| {
                ConfigError::Validation(format!("output.format: {e}"))
            })
    }
}

/// Text label defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Font file; `None` uses the system sans-serif face.
    pub font: Option<PathBuf>,
    pub size: f32,
    pub margin: u32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font: None,
            size: 20.0,
            margin: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Add BMP, TIFF and ICO to the JPEG/PNG/GIF baseline.
    pub extended_formats: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            extended_formats: true,
        }
    }
}

/// Local gallery source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Root directory; the Gallery source is registered only when set.
    pub path: Option<PathBuf>,
    /// `fit` (crop to fill) or `resize` (stretch).
    pub resize_mode: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            path: None,
            resize_mode: "fit".to_string(),
        }
    }
}

impl GalleryConfig {
    pub fn resize_mode(&self) -> Result<ResizeMode, ConfigError> {
        self.resize_mode.parse().map_err(|e: crate::error::Error| {
            ConfigError::Validation(format!("gallery.resize_mode: {e}"))
        })
    }
}

/// Remote photo services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Services to register, in order.
    pub sources: Vec<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sources: REMOTE_SOURCE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// Returns stock defaults if the file does not exist. Rejects unknown keys
/// and validates the result.
pub fn load_config(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    if !path.exists() {
        return Ok(GeneratorConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: GeneratorConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `placeholder.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Placeholder Generator Configuration
# ===================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Fixed seed for reproducible colors, gradients and photo picks.
# Omit to draw from OS entropy.
# seed = 42

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Default format: jpg, png, gif (bmp, tif, ico with extended formats).
format = "jpg"

# JPEG encoding quality (1 = worst, 100 = best).
quality = 90

# Directory for saved images. Omit to use the system temp directory.
# directory = "placeholders"

# ---------------------------------------------------------------------------
# Text labels
# ---------------------------------------------------------------------------
[text]
# Font file for labels. Omit to use the system sans-serif face.
# font = "fonts/OpenSans-Regular.ttf"

# Font size in pixels, including the 1px outline.
size = 20

# Distance from the aligned edges in pixels.
margin = 10

# ---------------------------------------------------------------------------
# Imaging backend
# ---------------------------------------------------------------------------
[backend]
# Enable BMP, TIFF and ICO in addition to JPEG, PNG and GIF.
extended_formats = true

# ---------------------------------------------------------------------------
# Local gallery
# ---------------------------------------------------------------------------
[gallery]
# Directory scanned recursively for images. Omit to skip the Gallery source.
# path = "photos"

# How pictures are fitted: "fit" crops to fill, "resize" stretches.
resize_mode = "fit"

# ---------------------------------------------------------------------------
# Remote photo services
# ---------------------------------------------------------------------------
[remote]
# Register remote sources (requires network access).
enabled = false

# Per-request timeout in seconds.
timeout_secs = 30

# User-Agent header sent with every request.
user_agent = "placeholder-gen"

# Services to register, in order.
sources = ["LoremFlickr", "LoremPixel", "PicsumPhotos", "PlaceKitten", "PlaceImg", "Unsplash"]
"##
}
