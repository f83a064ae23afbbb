//! Shared test utilities.
//!
//! Synthetic images are generated with the `image` crate so tests never depend
//! on binary fixtures checked into the repository.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let dir = gallery_fixture();
//! let mut gallery = Gallery::new(dir.path());
//! assert_eq!(gallery.images(&RustBackend::new()).unwrap().len(), 3);
//! ```

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

// =========================================================================
// Synthetic images
// =========================================================================

fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// PNG-encoded solid image.
pub fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let mut buf = Vec::new();
    solid(width, height, rgb)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Write a solid PNG to `path`, creating parent directories.
pub fn write_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, png_bytes(width, height, rgb)).unwrap();
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Temp directory with three images of different sizes:
///
/// ```text
/// blue.png          16x8
/// nested/green.PNG  8x16   (upper-case extension)
/// red.png           12x12
/// ```
pub fn gallery_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("blue.png"), 16, 8, [0, 0, 255]);
    write_png(&tmp.path().join("nested/green.PNG"), 8, 16, [0, 255, 0]);
    write_png(&tmp.path().join("red.png"), 12, 12, [255, 0, 0]);
    tmp
}
