//! Pure Rust imaging backend on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, ICO) | `image::load_from_memory`, `ImageReader` |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode other formats | `DynamicImage::write_to` |
//! | Resize | `resize_exact` with `Lanczos3`; fit = fill + center crop |
//! | Blur / brightness / contrast / invert / grayscale | `DynamicImage` filters |
//! | Gamma / opacity | per-pixel lookup on RGBA8 |
//! | Text | `usvg` + `resvg` (see [`text`](super::text)) |
//! | Overlay | `image::imageops::overlay` |

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbaImage};

use super::backend::{BackendError, ImageBackend};
use super::calculations::{calculate_fill_crop, overlay_origin};
use super::params::{Filter, OutputFormat, Position, Quality, ResizeMode, TextParams};
use super::text::TextRasterizer;
use crate::color::Rgb;

/// Gaussian sigma per blur step; 100 maps to sigma 25.
const BLUR_SIGMA_PER_STEP: f32 = 0.25;

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    formats: &'static [OutputFormat],
    text: TextRasterizer,
}

impl RustBackend {
    /// Backend with the extended format set (adds BMP, TIFF, ICO).
    pub fn new() -> Self {
        Self {
            formats: OutputFormat::EXTENDED,
            text: TextRasterizer::new(),
        }
    }

    /// Backend restricted to JPEG, PNG and GIF.
    pub fn basic() -> Self {
        Self {
            formats: OutputFormat::BASIC,
            text: TextRasterizer::new(),
        }
    }

    pub fn with_extended_formats(extended: bool) -> Self {
        if extended { Self::new() } else { Self::basic() }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_error(format: OutputFormat, e: impl std::fmt::Display) -> BackendError {
    BackendError::Encode {
        format,
        message: e.to_string(),
    }
}

fn apply_filter(image: &DynamicImage, filter: Filter) -> Result<DynamicImage, BackendError> {
    let out = match filter {
        // Keep an RGBA buffer so later color filters and overlays behave the same.
        Filter::Grayscale => DynamicImage::ImageRgba8(image.grayscale().to_rgba8()),
        Filter::Blur(amount) => match amount.min(100) {
            0 => image.clone(),
            n => image.blur(f32::from(n) * BLUR_SIGMA_PER_STEP),
        },
        Filter::Opacity(percent) => {
            let percent = u16::from(percent.min(100));
            let mut rgba = image.to_rgba8();
            for px in rgba.pixels_mut() {
                px[3] = (u16::from(px[3]) * percent / 100) as u8;
            }
            DynamicImage::ImageRgba8(rgba)
        }
        Filter::Brightness(level) => {
            image.brighten(i32::from(level.clamp(-100, 100)) * 255 / 100)
        }
        Filter::Contrast(level) => image.adjust_contrast(f32::from(level.clamp(-100, 100))),
        Filter::Gamma(gamma) => {
            if !(gamma.is_finite() && gamma > 0.0) {
                return Err(BackendError::ProcessingFailed(format!(
                    "Gamma must be a positive number, got {gamma}"
                )));
            }
            let lut = gamma_table(gamma);
            let mut rgba = image.to_rgba8();
            for px in rgba.pixels_mut() {
                for channel in &mut px.0[..3] {
                    *channel = lut[usize::from(*channel)];
                }
            }
            DynamicImage::ImageRgba8(rgba)
        }
        Filter::Invert => {
            let mut out = image.clone();
            out.invert();
            out
        }
    };
    Ok(out)
}

/// `out = 255 * (in / 255) ^ (1 / gamma)`
fn gamma_table(gamma: f32) -> [u8; 256] {
    let exponent = 1.0 / gamma;
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let normalized = i as f32 / 255.0;
        *slot = (normalized.powf(exponent) * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

impl ImageBackend for RustBackend {
    fn supported_formats(&self) -> &[OutputFormat] {
        self.formats
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn open(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::Decode(format!("{}: {e}", path.display())))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        if !self.supports(format) {
            return Err(encode_error(format, "format not enabled in this backend"));
        }
        let mut buf = Vec::new();
        match format {
            // JPEG has no alpha channel; flatten to RGB first.
            OutputFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
                rgb.write_with_encoder(encoder)
                    .map_err(|e| encode_error(format, e))?;
            }
            other => {
                let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
                rgba.write_to(&mut Cursor::new(&mut buf), other.image_format())
                    .map_err(|e| encode_error(format, e))?;
            }
        }
        Ok(buf)
    }

    fn canvas(&self, width: u32, height: u32, color: Rgb) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, color.to_rgba()))
    }

    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        mode: ResizeMode,
    ) -> DynamicImage {
        if image.width() == width && image.height() == height {
            return image.clone();
        }
        match mode {
            ResizeMode::Resize => image.resize_exact(width, height, FilterType::Lanczos3),
            ResizeMode::Fit => {
                let plan = calculate_fill_crop((image.width(), image.height()), (width, height));
                image
                    .resize_exact(plan.fill.0, plan.fill.1, FilterType::Lanczos3)
                    .crop_imm(plan.offset.0, plan.offset.1, width, height)
            }
        }
    }

    fn apply(&self, image: &DynamicImage, filter: Filter) -> Result<DynamicImage, BackendError> {
        apply_filter(image, filter)
    }

    fn draw_text(
        &self,
        image: &DynamicImage,
        params: &TextParams,
    ) -> Result<DynamicImage, BackendError> {
        let layer = self.text.rasterize(image.width(), image.height(), params)?;
        let mut base = image.to_rgba8();
        image::imageops::overlay(&mut base, &layer, 0, 0);
        Ok(DynamicImage::ImageRgba8(base))
    }

    fn overlay(
        &self,
        image: &DynamicImage,
        overlay: &DynamicImage,
        position: Position,
        margin_x: u32,
        margin_y: u32,
    ) -> DynamicImage {
        let (x, y) = overlay_origin(
            (image.width(), image.height()),
            (overlay.width(), overlay.height()),
            position,
            margin_x,
            margin_y,
        );
        let mut base = image.to_rgba8();
        image::imageops::overlay(&mut base, &overlay.to_rgba8(), x, y);
        DynamicImage::ImageRgba8(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::{HAlign, VAlign};
    use image::{GenericImageView, ImageFormat, Rgba};

    fn red_canvas(w: u32, h: u32) -> DynamicImage {
        RustBackend::new().canvas(w, h, Rgb::new(255, 0, 0))
    }

    #[test]
    fn canvas_has_requested_size_and_color() {
        let img = red_canvas(30, 20);
        assert_eq!(img.dimensions(), (30, 20));
        assert_eq!(img.get_pixel(29, 19), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn encode_each_basic_format_round_trips_through_guess() {
        let backend = RustBackend::new();
        let img = red_canvas(16, 12);
        for (format, expected) in [
            (OutputFormat::Jpeg, ImageFormat::Jpeg),
            (OutputFormat::Png, ImageFormat::Png),
            (OutputFormat::Gif, ImageFormat::Gif),
            (OutputFormat::Bmp, ImageFormat::Bmp),
            (OutputFormat::Tiff, ImageFormat::Tiff),
            (OutputFormat::Ico, ImageFormat::Ico),
        ] {
            let bytes = backend.encode(&img, format, Quality::default()).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), expected, "{format}");
            let decoded = backend.decode(&bytes).unwrap();
            assert_eq!(decoded.dimensions(), (16, 12), "{format}");
        }
    }

    #[test]
    fn basic_backend_refuses_extended_formats() {
        let backend = RustBackend::basic();
        let err = backend
            .encode(&red_canvas(4, 4), OutputFormat::Bmp, Quality::default())
            .unwrap_err();
        assert!(matches!(err, BackendError::Encode { format: OutputFormat::Bmp, .. }));
    }

    #[test]
    fn decode_garbage_errors() {
        assert!(matches!(
            RustBackend::new().decode(b"definitely not an image"),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn open_nonexistent_file_errors() {
        let result = RustBackend::new().open(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn resize_modes_hit_exact_dimensions() {
        let backend = RustBackend::new();
        let img = red_canvas(80, 60);
        for mode in [ResizeMode::Fit, ResizeMode::Resize] {
            let out = backend.resize(&img, 40, 50, mode);
            assert_eq!(out.dimensions(), (40, 50), "{mode:?}");
        }
    }

    #[test]
    fn fit_crops_center_of_wide_source() {
        // Left half black, right half white: fitting to a square keeps the seam centered.
        let src = DynamicImage::ImageRgba8(RgbaImage::from_fn(200, 100, |x, _| {
            if x < 100 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        }));
        let out = RustBackend::new().resize(&src, 50, 50, ResizeMode::Fit);
        assert!(out.get_pixel(2, 25)[0] < 40);
        assert!(out.get_pixel(47, 25)[0] > 215);
    }

    #[test]
    fn grayscale_equalizes_channels() {
        let out = apply_filter(&red_canvas(10, 10), Filter::Grayscale).unwrap();
        for (_, _, px) in out.pixels() {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert!(px[0] < 255);
        }
    }

    #[test]
    fn opacity_scales_alpha() {
        let out = apply_filter(&red_canvas(2, 2), Filter::Opacity(50)).unwrap();
        assert_eq!(out.get_pixel(0, 0)[3], 127);
        let clear = apply_filter(&red_canvas(2, 2), Filter::Opacity(0)).unwrap();
        assert_eq!(clear.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn gamma_one_is_identity_and_invalid_gamma_errors() {
        let img = red_canvas(3, 3);
        let same = apply_filter(&img, Filter::Gamma(1.0)).unwrap();
        assert_eq!(same.to_rgba8(), img.to_rgba8());
        assert!(apply_filter(&img, Filter::Gamma(0.0)).is_err());
        assert!(apply_filter(&img, Filter::Gamma(f32::NAN)).is_err());
    }

    #[test]
    fn gamma_above_one_brightens_midtones() {
        let lut = gamma_table(2.0);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[255], 255);
        assert!(lut[64] > 64);
    }

    #[test]
    fn invert_flips_colors() {
        let out = apply_filter(&red_canvas(2, 2), Filter::Invert).unwrap();
        assert_eq!(out.get_pixel(0, 0), Rgba([0, 255, 255, 255]));
    }

    #[test]
    fn brightness_and_contrast_change_pixels() {
        let gray = RustBackend::new().canvas(4, 4, Rgb::new(100, 100, 100));
        let bright = apply_filter(&gray, Filter::Brightness(50)).unwrap();
        assert!(bright.get_pixel(0, 0)[0] > 100);
        let dark = apply_filter(&gray, Filter::Brightness(-50)).unwrap();
        assert!(dark.get_pixel(0, 0)[0] < 100);
        let flat = apply_filter(&gray, Filter::Contrast(-100)).unwrap();
        assert_eq!(flat.dimensions(), (4, 4));
    }

    #[test]
    fn blur_zero_is_noop() {
        let img = red_canvas(5, 5);
        let out = apply_filter(&img, Filter::Blur(0)).unwrap();
        assert_eq!(out.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn overlay_lands_in_top_right_corner() {
        let backend = RustBackend::new();
        let base = backend.canvas(20, 20, Rgb::BLACK);
        let logo = backend.canvas(5, 5, Rgb::WHITE);
        let out = backend.overlay(
            &base,
            &logo,
            Position::new(HAlign::Right, VAlign::Top),
            0,
            0,
        );
        assert_eq!(out.get_pixel(19, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(14, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(19, 5), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn draw_text_preserves_dimensions() {
        let backend = RustBackend::new();
        let params = TextParams {
            text: "Hello world".into(),
            size: 35.0,
            position: Position::new(HAlign::Left, VAlign::Top),
            margin: 30,
            angle: -90.0,
            font: None,
        };
        let out = backend.draw_text(&red_canvas(100, 100), &params).unwrap();
        assert_eq!(out.dimensions(), (100, 100));
    }
}
