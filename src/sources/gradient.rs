//! Two-color linear gradients.
//!
//! The fill is stepped: the axis is split into at most
//! [`MAX_GRADIENT_STEPS`](crate::imaging::calculations::MAX_GRADIENT_STEPS)
//! equal bands (see [`gradient_color`]). The first band is the start color and
//! the last band is exactly the end color.

use std::fmt;
use std::str::FromStr;

use image::{DynamicImage, RgbaImage};
use rand::Rng;

use super::memo::{Recipe, SelectorMemo, SelectorRecipe, image_from_random_selector};
use super::{Selector, SourceContext, SourceError};
use crate::color::{ColorError, Rgb};
use crate::error::Error;
use crate::imaging::calculations::gradient_color;

pub const NAME: &str = "Gradient";

/// Axis along which the color changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Top (start) to bottom (end).
    Vertical,
    /// Left (start) to right (end).
    Horizontal,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Vertical => "vertical",
            Direction::Horizontal => "horizontal",
        })
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vertical" | "v" => Ok(Direction::Vertical),
            "horizontal" | "h" => Ok(Direction::Horizontal),
            _ => Err(Error::configuration(format!(
                "Invalid gradient direction: {s}"
            ))),
        }
    }
}

/// Everything needed to redraw a gradient at any size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GradientSpec {
    pub start: Rgb,
    pub end: Rgb,
    pub direction: Direction,
}

impl GradientSpec {
    pub fn new(start: Rgb, end: Rgb, direction: Direction) -> Self {
        Self {
            start,
            end,
            direction,
        }
    }

    /// Build from `#rgb`/`#rrggbb` strings.
    pub fn from_hex(start: &str, end: &str, direction: Direction) -> Result<Self, ColorError> {
        Ok(Self::new(
            Rgb::from_hex(start)?,
            Rgb::from_hex(end)?,
            direction,
        ))
    }

    pub fn random(ctx: &mut SourceContext<'_>) -> Self {
        let start = Rgb::random(ctx.rng);
        let end = Rgb::random(ctx.rng);
        let direction = if ctx.rng.gen_range(0..2) == 0 {
            Direction::Vertical
        } else {
            Direction::Horizontal
        };
        Self::new(start, end, direction)
    }

    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        let length = match self.direction {
            Direction::Vertical => height,
            Direction::Horizontal => width,
        };
        let palette: Vec<_> = (0..length)
            .map(|i| gradient_color(self.start, self.end, length, i).to_rgba())
            .collect();
        RgbaImage::from_fn(width, height, |x, y| match self.direction {
            Direction::Vertical => palette[y as usize],
            Direction::Horizontal => palette[x as usize],
        })
    }
}

#[derive(Debug, Default)]
pub struct Gradient;

pub type GradientSource = SelectorMemo<Gradient>;

impl Gradient {
    pub fn source() -> GradientSource {
        SelectorMemo::new(Gradient)
    }
}

impl Recipe for Gradient {
    fn name(&self) -> &str {
        NAME
    }

    fn random_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, SourceError> {
        image_from_random_selector(self, ctx, width, height)
    }
}

impl SelectorRecipe for Gradient {
    fn random_selector(&mut self, ctx: &mut SourceContext<'_>) -> Result<Selector, SourceError> {
        Ok(Selector::Gradient(GradientSpec::random(ctx)))
    }

    fn image_by_selector(
        &mut self,
        _ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector: &Selector,
    ) -> Result<DynamicImage, SourceError> {
        match selector {
            Selector::Gradient(spec) => Ok(DynamicImage::ImageRgba8(spec.render(width, height))),
            other => Err(SourceError::mismatch(NAME, other)),
        }
    }
}
