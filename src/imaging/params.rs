//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the sources and editing session (which decide what image
//! to produce) and the [`backend`](super::backend) (which does the pixel work).
//! Keeping them as plain data lets tests swap in a recording mock backend.
//!
//! Keyword parsing (`"jpg"`, `"left"`, `"fit"`, ...) goes through `FromStr` and
//! fails with [`Error::Configuration`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use image::ImageFormat;

use crate::error::Error;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoded output formats.
///
/// Every backend writes JPEG, PNG and GIF. BMP, TIFF and ICO are the
/// "extended" set, only available when the backend reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    Ico,
}

impl OutputFormat {
    pub const BASIC: &'static [OutputFormat] =
        &[OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Gif];

    pub const EXTENDED: &'static [OutputFormat] = &[
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::Gif,
        OutputFormat::Bmp,
        OutputFormat::Tiff,
        OutputFormat::Ico,
    ];

    /// Resolve a file extension (without the dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "ico" => Some(Self::Ico),
            _ => None,
        }
    }

    /// All extensions that map to this format; the first is canonical.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Jpeg => &["jpg", "jpeg", "jpe"],
            Self::Png => &["png"],
            Self::Gif => &["gif"],
            Self::Bmp => &["bmp"],
            Self::Tiff => &["tif", "tiff"],
            Self::Ico => &["ico"],
        }
    }

    pub fn extension(self) -> &'static str {
        self.extensions()[0]
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Ico => "image/x-icon",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tiff => ImageFormat::Tiff,
            Self::Ico => ImageFormat::Ico,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s)
            .ok_or_else(|| Error::configuration(format!("Not supported image extension {s}")))
    }
}

/// How a source image is brought to the requested dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Preserve aspect ratio, then center-crop to exactly fill the box.
    #[default]
    Fit,
    /// Stretch to the exact box, ignoring aspect ratio.
    Resize,
}

impl FromStr for ResizeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fit" => Ok(Self::Fit),
            "resize" => Ok(Self::Resize),
            other => Err(Error::configuration(format!(
                "Unsupported resize mode {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

impl FromStr for HAlign {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(Error::configuration(format!("Invalid align value: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

impl FromStr for VAlign {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "middle" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            other => Err(Error::configuration(format!(
                "Invalid valign value: {other}"
            ))),
        }
    }
}

/// A cell of the 3×3 placement grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub align: HAlign,
    pub valign: VAlign,
}

impl Position {
    pub const fn new(align: HAlign, valign: VAlign) -> Self {
        Self { align, valign }
    }
}

/// A pixel filter applied by the backend.
///
/// Ranges follow the editing session's public contract; out-of-range values
/// are clamped by the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    Grayscale,
    /// Gaussian blur, 0 (none) to 100 (max).
    Blur(u8),
    /// Opacity percentage, 0 (transparent) to 100 (unchanged).
    Opacity(u8),
    /// -100 to 100.
    Brightness(i8),
    /// -100 to 100.
    Contrast(i8),
    /// Gamma correction factor; 1.0 is the identity.
    Gamma(f32),
    Invert,
}

/// Everything needed to draw one outlined text label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    pub text: String,
    /// Font size in pixels, including the outline border.
    pub size: f32,
    pub position: Position,
    pub margin: u32,
    /// Counter-clockwise rotation in degrees around the anchor.
    pub angle: f32,
    /// Font file to render with; `None` uses the system sans-serif face.
    pub font: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn jpeg_aliases_resolve() {
        for ext in ["jpg", "jpeg", "jpe", "JPG"] {
            assert_eq!(OutputFormat::from_extension(ext), Some(OutputFormat::Jpeg));
        }
        assert_eq!(OutputFormat::from_extension("tif"), Some(OutputFormat::Tiff));
    }

    #[test]
    fn unknown_extension_is_configuration_error() {
        let err = "txt".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("txt")));
    }

    #[test]
    fn canonical_extension_and_mime() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::Tiff.extension(), "tif");
    }

    #[test]
    fn basic_formats_are_a_prefix_of_extended() {
        assert_eq!(&OutputFormat::EXTENDED[..3], OutputFormat::BASIC);
    }

    #[test]
    fn resize_mode_keywords() {
        assert_eq!("fit".parse::<ResizeMode>().unwrap(), ResizeMode::Fit);
        assert_eq!("resize".parse::<ResizeMode>().unwrap(), ResizeMode::Resize);
        assert!(matches!(
            "crop".parse::<ResizeMode>(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn alignment_keywords() {
        assert_eq!("center".parse::<HAlign>().unwrap(), HAlign::Center);
        assert_eq!("bottom".parse::<VAlign>().unwrap(), VAlign::Bottom);
        assert!("middle".parse::<HAlign>().is_err());
        assert!("center".parse::<VAlign>().is_err());
    }
}
