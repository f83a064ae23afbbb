//! Sources backed by public placeholder-photo services.
//!
//! | Source | Strategy | Selector |
//! |---|---|---|
//! | [`LoremFlickr`] | selector memo | lock in 11111..=99999 |
//! | [`LoremPixel`] | selector memo | category + id in 1..=10 |
//! | [`PicsumPhotos`] | selector memo | seed in 11111..=99999 |
//! | [`PlaceKitten`] | selector memo | image in 1..=16 |
//! | [`PlaceImg`] | resize memo | none (bytes are cached) |
//! | [`Unsplash`] | selector memo | redirect target URL |
//!
//! Downloaded pictures are fitted to the requested size, so a service that
//! answers with slightly different dimensions still honours the contract.
//! Network calls are blocking; a failure surfaces as [`FetchError`] and
//! nothing is cached for the selector name.

pub mod fetch;
pub mod services;

use std::sync::Arc;

use image::DynamicImage;
use tracing::debug;

use super::{ImageSource, SourceContext, SourceError};
use crate::imaging::ResizeMode;

pub use fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, FetchError, Fetcher, HttpFetcher};
pub use services::{LoremFlickr, LoremPixel, PicsumPhotos, PlaceImg, PlaceKitten, Unsplash};

/// Registry names of every remote source, in registration order.
pub const REMOTE_SOURCE_NAMES: [&str; 6] = [
    LoremFlickr::NAME,
    LoremPixel::NAME,
    PicsumPhotos::NAME,
    PlaceKitten::NAME,
    PlaceImg::NAME,
    Unsplash::NAME,
];

/// Build the remote source registered under `name`.
pub fn remote_source(name: &str, fetcher: Arc<dyn Fetcher>) -> Option<Box<dyn ImageSource>> {
    let source: Box<dyn ImageSource> = match name {
        LoremFlickr::NAME => Box::new(LoremFlickr::source(fetcher)),
        LoremPixel::NAME => Box::new(LoremPixel::source(fetcher)),
        PicsumPhotos::NAME => Box::new(PicsumPhotos::source(fetcher)),
        PlaceKitten::NAME => Box::new(PlaceKitten::source(fetcher)),
        PlaceImg::NAME => Box::new(PlaceImg::source(fetcher)),
        Unsplash::NAME => Box::new(Unsplash::source(fetcher)),
        _ => return None,
    };
    Some(source)
}

/// Fetch `url`, decode it and fit it to `width`×`height`.
pub(crate) fn download(
    fetcher: &dyn Fetcher,
    ctx: &mut SourceContext<'_>,
    url: &str,
    width: u32,
    height: u32,
) -> Result<DynamicImage, SourceError> {
    let bytes = fetcher.fetch(url)?;
    let image = ctx.backend.decode(&bytes)?;
    if (image.width(), image.height()) != (width, height) {
        debug!(
            url,
            got = ?(image.width(), image.height()),
            "remote image size differs from request"
        );
    }
    Ok(ctx.backend.resize(&image, width, height, ResizeMode::Fit))
}
