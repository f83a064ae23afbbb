//! Image editing session.
//!
//! An [`ImageSession`] owns one decoded image and chains transforms over it.
//! Every transform delegates to the [`ImageBackend`], which returns a new
//! buffer; the session swaps it in only when the call succeeds, so an error
//! leaves the last good image in place and the session stays usable.
//!
//! ```text
//! provider.create_session(640, 480, Some("hero"), None)?
//!     .grayscale()?
//!     .text("640×480")?
//!     .save(None)?;
//! ```
//!
//! Output goes through the session format (JPEG unless changed with
//! [`set_format`](ImageSession::set_format)): raw bytes, a `data:` URL, or a
//! file with a random name in a directory.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::imaging::{
    Filter, HAlign, ImageBackend, OutputFormat, Position, Quality, TextParams, VAlign,
};

/// Defaults applied to every session a provider creates.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub format: OutputFormat,
    /// Extension for saved files as the caller spelled it (`jpeg`, `tiff`);
    /// `None` uses the canonical one for `format`.
    pub extension: Option<String>,
    pub quality: Quality,
    /// Font file for text labels; `None` uses the system sans-serif face.
    pub font: Option<PathBuf>,
    pub text_size: f32,
    pub text_margin: u32,
    /// Directory used by [`ImageSession::save`] when none is given.
    pub directory: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            extension: None,
            quality: Quality::default(),
            font: None,
            text_size: 20.0,
            text_margin: 10,
            directory: None,
        }
    }
}

/// Picture to composite with [`ImageSession::insert_image`].
#[derive(Debug, Clone)]
pub enum Overlay {
    Image(DynamicImage),
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl From<DynamicImage> for Overlay {
    fn from(image: DynamicImage) -> Self {
        Overlay::Image(image)
    }
}

impl From<PathBuf> for Overlay {
    fn from(path: PathBuf) -> Self {
        Overlay::File(path)
    }
}

impl From<&Path> for Overlay {
    fn from(path: &Path) -> Self {
        Overlay::File(path.to_path_buf())
    }
}

impl From<Vec<u8>> for Overlay {
    fn from(bytes: Vec<u8>) -> Self {
        Overlay::Bytes(bytes)
    }
}

pub struct ImageSession {
    image: DynamicImage,
    backend: Arc<dyn ImageBackend>,
    options: SessionOptions,
    rng: ChaCha8Rng,
}

impl std::fmt::Debug for ImageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSession")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("options", &self.options)
            .finish()
    }
}

impl ImageSession {
    pub fn new(
        image: DynamicImage,
        backend: Arc<dyn ImageBackend>,
        options: SessionOptions,
    ) -> Self {
        Self::with_rng(image, backend, options, ChaCha8Rng::from_entropy())
    }

    /// Session whose generated file names are reproducible.
    pub fn with_seed(
        image: DynamicImage,
        backend: Arc<dyn ImageBackend>,
        options: SessionOptions,
        seed: u64,
    ) -> Self {
        Self::with_rng(image, backend, options, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(
        image: DynamicImage,
        backend: Arc<dyn ImageBackend>,
        options: SessionOptions,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            image,
            backend,
            options,
            rng,
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn format(&self) -> OutputFormat {
        self.options.format
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    fn filter(&mut self, filter: Filter) -> Result<&mut Self> {
        let out = self.backend.apply(&self.image, filter)?;
        self.image = out;
        Ok(self)
    }

    pub fn grayscale(&mut self) -> Result<&mut Self> {
        self.filter(Filter::Grayscale)
    }

    /// Gaussian blur, 0 (none) to 100.
    pub fn blur(&mut self, amount: u8) -> Result<&mut Self> {
        self.filter(Filter::Blur(amount.min(100)))
    }

    /// Opacity percentage, 0 (transparent) to 100 (unchanged).
    pub fn opacity(&mut self, percent: u8) -> Result<&mut Self> {
        self.filter(Filter::Opacity(percent.min(100)))
    }

    /// -100 (black) to 100 (white).
    pub fn brightness(&mut self, level: i8) -> Result<&mut Self> {
        self.filter(Filter::Brightness(level.clamp(-100, 100)))
    }

    /// -100 to 100.
    pub fn contrast(&mut self, level: i8) -> Result<&mut Self> {
        self.filter(Filter::Contrast(level.clamp(-100, 100)))
    }

    pub fn gamma(&mut self, gamma: f32) -> Result<&mut Self> {
        self.filter(Filter::Gamma(gamma))
    }

    pub fn negative(&mut self) -> Result<&mut Self> {
        self.filter(Filter::Invert)
    }

    /// Label parameters with the session defaults: bottom-right corner, no
    /// rotation, configured size, margin and font.
    pub fn text_params(&self, text: &str) -> TextParams {
        TextParams {
            text: text.to_string(),
            size: self.options.text_size,
            position: Position::new(HAlign::Right, VAlign::Bottom),
            margin: self.options.text_margin,
            angle: 0.0,
            font: self.options.font.clone(),
        }
    }

    /// Draw an outlined label with the default parameters.
    pub fn text(&mut self, text: &str) -> Result<&mut Self> {
        let params = self.text_params(text);
        self.text_with(&params)
    }

    pub fn text_with(&mut self, params: &TextParams) -> Result<&mut Self> {
        let out = self.backend.draw_text(&self.image, params)?;
        self.image = out;
        Ok(self)
    }

    /// Composite a logo or watermark at a grid position, `margin` pixels from
    /// the edges it is aligned to.
    pub fn insert_image(
        &mut self,
        overlay: impl Into<Overlay>,
        position: Position,
        margin: u32,
    ) -> Result<&mut Self> {
        let overlay = match overlay.into() {
            Overlay::Image(image) => image,
            Overlay::File(path) => self.backend.open(&path)?,
            Overlay::Bytes(bytes) => self.backend.decode(&bytes)?,
        };
        self.image = self
            .backend
            .overlay(&self.image, &overlay, position, margin, margin);
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Parse `extension` and check the backend can write it.
    fn output_format(&self, extension: &str) -> Result<OutputFormat> {
        let format: OutputFormat = extension.parse()?;
        self.ensure_supported(format)?;
        Ok(format)
    }

    fn ensure_supported(&self, format: OutputFormat) -> Result<()> {
        if self.backend.supports(format) {
            Ok(())
        } else {
            Err(Error::configuration(format!(
                "Not supported image extension {format}"
            )))
        }
    }

    /// Change the format used by [`content`](Self::content),
    /// [`to_data_url`](Self::to_data_url) and [`save`](Self::save).
    pub fn set_format(&mut self, extension: &str) -> Result<&mut Self> {
        self.options.format = self.output_format(extension)?;
        self.options.extension = Some(extension.to_string());
        Ok(self)
    }

    /// Encode with an explicit format extension.
    pub fn encode(&self, extension: &str) -> Result<Vec<u8>> {
        let format = self.output_format(extension)?;
        self.encode_format(format)
    }

    fn encode_format(&self, format: OutputFormat) -> Result<Vec<u8>> {
        self.ensure_supported(format)?;
        Ok(self
            .backend
            .encode(&self.image, format, self.options.quality)?)
    }

    /// Bytes in the session format.
    pub fn content(&self) -> Result<Vec<u8>> {
        self.encode_format(self.options.format)
    }

    /// `data:<mime>;base64,<content>`
    pub fn to_data_url(&self) -> Result<String> {
        let bytes = self.content()?;
        Ok(format!(
            "data:{};base64,{}",
            self.options.format.mime_type(),
            STANDARD.encode(bytes)
        ))
    }

    /// Write the image into `dir` (or the configured directory, or the system
    /// temp dir) under a fresh random name, returning the full path.
    pub fn save(&mut self, dir: Option<&Path>) -> Result<PathBuf> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => self
                .options
                .directory
                .clone()
                .unwrap_or_else(std::env::temp_dir),
        };
        check_writable_dir(&dir)?;
        let bytes = self.content()?;
        let extension = self
            .options
            .extension
            .clone()
            .unwrap_or_else(|| self.options.format.extension().to_string());

        loop {
            let path = dir.join(format!("{}.{extension}", random_stem(&mut self.rng)));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    write_or_remove(&path, file, &bytes)?;
                    info!(path = %path.display(), bytes = bytes.len(), "saved image");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "name taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Write `bytes` to the freshly created `path`, deleting it again if the
/// write fails so no truncated file is left behind.
fn write_or_remove(path: &Path, mut file: impl Write, bytes: &[u8]) -> io::Result<()> {
    let written = file.write_all(bytes).and_then(|()| file.flush());
    if let Err(e) = written {
        drop(file);
        if let Err(remove) = fs::remove_file(path) {
            debug!(path = %path.display(), error = %remove, "cannot remove partial file");
        }
        return Err(e);
    }
    Ok(())
}

/// 32 lowercase hex digits.
fn random_stem(rng: &mut dyn RngCore) -> String {
    format!("{:016x}{:016x}", rng.next_u64(), rng.next_u64())
}

fn check_writable_dir(dir: &Path) -> io::Result<()> {
    let meta = fs::metadata(dir).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Can't write to directory {}: {e}", dir.display()),
        )
    })?;
    if !meta.is_dir() {
        return Err(io::Error::new(
            ErrorKind::NotADirectory,
            format!("Can't write to directory {}: not a directory", dir.display()),
        ));
    }
    if meta.permissions().readonly() {
        return Err(io::Error::new(
            ErrorKind::PermissionDenied,
            format!("Can't write to directory {}: read-only", dir.display()),
        ));
    }
    Ok(())
}
