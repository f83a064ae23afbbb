//! # Placeholder Gen
//!
//! Placeholder raster images on demand: flat colors, gradients, pictures from
//! a local directory, or photos from public placeholder services, at any size
//! and in any common format.
//!
//! # Architecture: Source → Session → Output
//!
//! ```text
//! ImageProvider ──get(name)──▶ ImageSource ──get_image(w, h, selector)──▶ DynamicImage
//!        │                                                                    │
//!        └──────────────── create_session ─────────────▶ ImageSession ◀───────┘
//!                                                            │ grayscale / blur / text / insert_image …
//!                                                            ▼
//!                                              encode · to_data_url · save
//! ```
//!
//! A *selector name* chosen by the caller (say `"user-42-avatar"`) pins the
//! content: asking the same source for the same name again, at any size,
//! yields the same logical picture. How that is remembered depends on the
//! source (see [`sources`]).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`provider`] | Registry of named sources; builds editing sessions |
//! | [`sources`] | The `ImageSource` trait, memoization strategies and every source |
//! | [`session`] | Chainable transforms and output (bytes, data URL, file) |
//! | [`imaging`] | Backend trait and the pure-Rust backend: codecs, resize, filters, text |
//! | [`color`] | `Rgb` values and `#rgb` / `#rrggbb` parsing |
//! | [`config`] | `placeholder.toml` loading and validation |
//! | [`error`] | Crate-level error taxonomy |
//!
//! # Design Decisions
//!
//! ## Injected Randomness
//!
//! Every random choice (colors, gradient direction, gallery pick, remote IDs,
//! output file names) draws from one generator owned by the provider. Seed it
//! with [`ImageProvider::with_seed`](provider::ImageProvider::with_seed) and a
//! whole run becomes reproducible.
//!
//! ## Synchronous Sources
//!
//! Every call blocks until the image is ready, including remote fetches.
//! Sources take `&mut self`, so a provider used from several threads must be
//! wrapped in a lock by the caller; nothing inside is shared.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for codecs and pixel work and
//! `resvg` for text, so no system image library is needed.

pub mod color;
pub mod config;
pub mod error;
pub mod imaging;
pub mod provider;
pub mod session;
pub mod sources;

pub use error::{Error, Result};
pub use provider::ImageProvider;
pub use session::{ImageSession, SessionOptions};

#[cfg(test)]
pub(crate) mod test_helpers;
