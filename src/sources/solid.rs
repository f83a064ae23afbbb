//! Flat single-color images.

use image::DynamicImage;

use super::memo::{Recipe, SelectorMemo, SelectorRecipe, image_from_random_selector};
use super::{Selector, SourceContext, SourceError};
use crate::color::Rgb;

pub const NAME: &str = "SolidColor";

/// Fills the canvas with a uniformly random opaque color.
#[derive(Debug, Default)]
pub struct SolidColor;

pub type SolidColorSource = SelectorMemo<SolidColor>;

impl SolidColor {
    pub fn source() -> SolidColorSource {
        SelectorMemo::new(SolidColor)
    }
}

impl Recipe for SolidColor {
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

impl SelectorRecipe for SolidColor {
    fn random_selector(&mut self, ctx: &mut SourceContext<'_>) -> Result<Selector, SourceError> {
        Ok(Selector::Color(Rgb::random(ctx.rng)))
    }

    fn image_by_selector(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector: &Selector,
    ) -> Result<DynamicImage, SourceError> {
        match selector {
            Selector::Color(color) => Ok(ctx.backend.canvas(width, height, *color)),
            other => Err(SourceError::mismatch(NAME, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::sources::ImageSource;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn fills_whole_canvas_with_one_opaque_color() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ctx = SourceContext::new(&backend, &mut rng);

        let img = SolidColor::source()
            .get_image(&mut ctx, 9, 5, None)
            .unwrap()
            .to_rgba8();

        assert_eq!(img.dimensions(), (9, 5));
        let first = *img.get_pixel(0, 0);
        assert_eq!(first[3], 255);
        assert!(img.pixels().all(|p| *p == first));
    }

    #[test]
    fn named_selector_keeps_color_across_sizes() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let mut source = SolidColor::source();

        let small = source.get_image(&mut ctx, 4, 4, Some("bg")).unwrap();
        let large = source.get_image(&mut ctx, 30, 10, Some("bg")).unwrap();

        assert_eq!(
            small.to_rgba8().get_pixel(0, 0),
            large.to_rgba8().get_pixel(29, 9)
        );
        assert!(matches!(source.selector("bg"), Some(Selector::Color(_))));
    }

    #[test]
    fn pinned_color_is_rendered() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let mut source = SolidColor::source();

        source.pin_selector("brand", Selector::Color(Rgb::new(255, 0, 0)));
        let img = source.get_image(&mut ctx, 2, 2, Some("brand")).unwrap();
        assert_eq!(img.to_rgba8().get_pixel(1, 1).0, [255, 0, 0, 255]);
    }
}
