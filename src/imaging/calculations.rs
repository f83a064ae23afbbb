//! Pure calculation functions for placement and color math.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{HAlign, Position, VAlign};
use crate::color::Rgb;

/// Most distinct colors a stepped gradient uses along its axis.
pub const MAX_GRADIENT_STEPS: u32 = 254;

/// Resize-then-crop plan for filling a target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillCrop {
    /// Intermediate size that covers the target box.
    pub fill: (u32, u32),
    /// Top-left corner of the centered crop inside the intermediate image.
    pub offset: (u32, u32),
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may
/// exceed it.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = ((h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = ((w as f64 / src_aspect).round() as u32).max(tgt_h);
        (w, h)
    }
}

/// Plan a fit: fill dimensions plus the centered crop offset.
pub fn calculate_fill_crop(source: (u32, u32), target: (u32, u32)) -> FillCrop {
    let fill = calculate_fill_dimensions(source, target);
    FillCrop {
        fill,
        offset: ((fill.0 - target.0) / 2, (fill.1 - target.1) / 2),
    }
}

/// Anchor point for a text label.
///
/// Edge alignments sit `margin` pixels inside the border; center/middle sit on
/// the midline and ignore the margin.
pub fn text_anchor(image: (u32, u32), position: Position, margin: u32) -> (i64, i64) {
    let (w, h) = (i64::from(image.0), i64::from(image.1));
    let margin = i64::from(margin);
    let x = match position.align {
        HAlign::Left => margin,
        HAlign::Center => w / 2,
        HAlign::Right => w - margin,
    };
    let y = match position.valign {
        VAlign::Top => margin,
        VAlign::Middle => h / 2,
        VAlign::Bottom => h - margin,
    };
    (x, y)
}

/// Top-left corner at which to draw an overlay inside a base image.
///
/// The result may be negative when the overlay is larger than the base; the
/// overlay is then clipped by the compositor.
pub fn overlay_origin(
    base: (u32, u32),
    overlay: (u32, u32),
    position: Position,
    margin_x: u32,
    margin_y: u32,
) -> (i64, i64) {
    let free_w = i64::from(base.0) - i64::from(overlay.0);
    let free_h = i64::from(base.1) - i64::from(overlay.1);
    let x = match position.align {
        HAlign::Left => i64::from(margin_x),
        HAlign::Center => free_w / 2,
        HAlign::Right => free_w - i64::from(margin_x),
    };
    let y = match position.valign {
        VAlign::Top => i64::from(margin_y),
        VAlign::Middle => free_h / 2,
        VAlign::Bottom => free_h - i64::from(margin_y),
    };
    (x, y)
}

/// Color of line `index` in a stepped gradient of `length` lines.
///
/// The axis is split into at most [`MAX_GRADIENT_STEPS`] bands of equal
/// width. The first band is exactly `start`, the last exactly `end`, and the
/// bands in between interpolate linearly per channel.
pub fn gradient_color(start: Rgb, end: Rgb, length: u32, index: u32) -> Rgb {
    let steps = length.clamp(1, MAX_GRADIENT_STEPS);
    if steps == 1 {
        return start;
    }
    let band = (u64::from(index.min(length - 1)) * u64::from(steps) / u64::from(length)) as u32;
    let t = band as f32 / (steps - 1) as f32;
    let lerp = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    Rgb::new(
        lerp(start.red, end.red),
        lerp(start.green, end.green),
        lerp(start.blue, end.blue),
    )
}
