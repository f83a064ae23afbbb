//! Imaging backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the single seam between the crate and pixel
//! work: decode, encode, canvas creation, resizing, filters, text and overlay
//! composition. Sources and the editing session only ever talk to this trait.
//!
//! Transform operations take the current image by reference and return a new
//! one. A failing call therefore never leaves a half-modified image behind,
//! and the editing session keeps its previous state on error.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use std::path::Path;

use image::DynamicImage;
use thiserror::Error;

use super::params::{Filter, OutputFormat, Position, Quality, ResizeMode, TextParams};
use crate::color::Rgb;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode {format}: {message}")]
    Encode {
        format: OutputFormat,
        message: String,
    },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend: Send + Sync {
    /// Formats this backend can write (and read from a gallery).
    fn supported_formats(&self) -> &[OutputFormat];

    /// Lowercase file extensions for [`supported_formats`](Self::supported_formats).
    fn supported_extensions(&self) -> Vec<&'static str> {
        self.supported_formats()
            .iter()
            .flat_map(|f| f.extensions().iter().copied())
            .collect()
    }

    fn supports(&self, format: OutputFormat) -> bool {
        self.supported_formats().contains(&format)
    }

    /// Decode encoded image bytes of any readable format.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Read and decode an image file.
    fn open(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;

    /// A new image of the given size filled with one color.
    fn canvas(&self, width: u32, height: u32, color: Rgb) -> DynamicImage;

    fn resize(&self, image: &DynamicImage, width: u32, height: u32, mode: ResizeMode)
    -> DynamicImage;

    fn apply(&self, image: &DynamicImage, filter: Filter) -> Result<DynamicImage, BackendError>;

    /// Draw an outlined text label.
    fn draw_text(
        &self,
        image: &DynamicImage,
        params: &TextParams,
    ) -> Result<DynamicImage, BackendError>;

    /// Composite `overlay` on top of `image` at a grid position.
    fn overlay(
        &self,
        image: &DynamicImage,
        overlay: &DynamicImage,
        position: Position,
        margin_x: u32,
        margin_y: u32,
    ) -> DynamicImage;
}
