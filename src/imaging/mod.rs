//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` crate codecs (JPEG, PNG, GIF, BMP, TIFF, ICO) |
//! | **Resize / fit** | `resize_exact` (Lanczos3) + centered `crop_imm` |
//! | **Filters** | `DynamicImage` filters, per-pixel gamma and opacity |
//! | **Text** | SVG layout with `usvg`, rasterized with `resvg` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for placement and gradient math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Text**: outlined label rasterization used by the backend

pub mod backend;
pub mod calculations;
pub mod params;
pub mod rust_backend;
mod text;

pub use backend::{BackendError, ImageBackend};
pub use params::{
    Filter, HAlign, OutputFormat, Position, Quality, ResizeMode, TextParams, VAlign,
};
pub use rust_backend::RustBackend;
