//! Image sources: interchangeable providers of raw images.
//!
//! A source answers one question: *give me a `width`×`height` image*, either a
//! fresh random one or the logical image remembered under a caller-chosen
//! selector name. Repeating a selector name reproduces the same content at
//! whatever size is requested next.
//!
//! # Memoization strategies
//!
//! Concrete sources never implement [`ImageSource`] directly. They implement
//! a [`Recipe`] (random images) and, when they can, a [`SelectorRecipe`]
//! (compact descriptor → image), and are wrapped in one of two strategies:
//!
//! | Strategy | Remembers | Used by |
//! |---|---|---|
//! | [`SelectorMemo`] | the small [`Selector`] (color, ID, path, URL) | SolidColor, Gradient, Gallery, most remote services |
//! | [`ResizeMemo`] | the full encoded image, resized on later calls | PlaceImg (no replayable ID) |
//!
//! Selector caches grow monotonically for the lifetime of the source. Callers
//! are expected to reuse a bounded set of names; entries can be dropped
//! explicitly with [`ImageSource::clear_selector`], which breaks
//! reproducibility for that name only.

pub mod gallery;
pub mod gradient;
pub mod memo;
pub mod remote;
pub mod solid;

use std::path::PathBuf;

use image::DynamicImage;
use rand::RngCore;
use thiserror::Error;

use crate::color::Rgb;
use crate::imaging::{BackendError, ImageBackend};

pub use gallery::{Gallery, GallerySource};
pub use gradient::{Direction, Gradient, GradientSource, GradientSpec};
pub use memo::{EncodedImage, Recipe, ResizeMemo, SelectorCache, SelectorMemo, SelectorRecipe};
pub use remote::{FetchError, Fetcher, HttpFetcher};
pub use solid::{SolidColor, SolidColorSource};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("No image sources registered")]
    NoSources,
    #[error("Not found source with name {0}")]
    NotFound(String),
    #[error("No images ({extensions}) found in path {}", path.display())]
    EmptyGallery { path: PathBuf, extensions: String },
    #[error("Cannot open gallery path {}: {source}", path.display())]
    GalleryRoot {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to scan gallery: {0}")]
    Scan(#[from] walkdir::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Selector {selector:?} cannot be used with source {source_name}")]
    SelectorMismatch {
        source_name: String,
        selector: Selector,
    },
}

impl SourceError {
    pub(crate) fn mismatch(source_name: &str, selector: &Selector) -> Self {
        Self::SelectorMismatch {
            source_name: source_name.to_string(),
            selector: selector.clone(),
        }
    }
}

/// Which logical image a selector name stands for.
///
/// Each variant belongs to the sources that produce it; handing a selector to
/// a source that does not understand it fails with
/// [`SourceError::SelectorMismatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Fill color (SolidColor).
    Color(Rgb),
    /// Endpoints and direction (Gradient).
    Gradient(GradientSpec),
    /// Absolute path of a gallery file (Gallery).
    File(PathBuf),
    /// Service-specific numeric ID: lock, seed or image number.
    Number(u32),
    /// Category plus numeric ID (LoremPixel).
    Category { category: String, id: u32 },
    /// Replayable photo URL without size parameters (Unsplash).
    Url(String),
}

/// Collaborators a source needs for one call.
///
/// The provider builds a fresh context per request, so sources hold no
/// reference to the backend or the random generator between calls.
pub struct SourceContext<'a> {
    pub backend: &'a dyn ImageBackend,
    pub rng: &'a mut dyn RngCore,
}

impl<'a> SourceContext<'a> {
    pub fn new(backend: &'a dyn ImageBackend, rng: &'a mut dyn RngCore) -> Self {
        Self { backend, rng }
    }
}

/// A named provider of images at arbitrary sizes.
pub trait ImageSource: Send {
    /// Unique registry name, e.g. `"SolidColor"`.
    fn name(&self) -> &str;

    /// Produce an image of exactly `width`×`height`.
    ///
    /// Without a selector name the content is random on every call. With one,
    /// the first call picks the content and every later call with the same
    /// name reproduces it.
    fn get_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector_name: Option<&str>,
    ) -> Result<DynamicImage, SourceError>;

    /// Forget a selector name. Returns whether it was known.
    fn clear_selector(&mut self, selector_name: &str) -> bool;
}
