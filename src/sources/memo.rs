//! Selector memoization strategies.
//!
//! Both strategies keep a [`SelectorCache`] keyed by the caller's selector
//! name and implement [`ImageSource`] on top of a recipe:
//!
//! - [`SelectorMemo`] stores the [`Selector`] a recipe picked and asks the
//!   recipe to re-render it at each requested size. Cheap to store, exact at
//!   every size.
//! - [`ResizeMemo`] stores the first image it produced (PNG-encoded) and
//!   resizes that image for later requests of a different size. Used where the
//!   upstream has no replayable identifier.
//!
//! Entries are written once on first use and never expire; the last writer
//! wins if the same name is pinned twice.

use std::collections::HashMap;

use image::DynamicImage;
use tracing::debug;

use super::{ImageSource, Selector, SourceContext, SourceError};
use crate::imaging::{OutputFormat, Quality, ResizeMode};

/// Produces random images at a requested size.
pub trait Recipe: Send {
    fn name(&self) -> &str;

    fn random_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, SourceError>;
}

/// A recipe whose random content can be captured in a [`Selector`] and
/// rendered again later.
pub trait SelectorRecipe: Recipe {
    fn random_selector(&mut self, ctx: &mut SourceContext<'_>) -> Result<Selector, SourceError>;

    fn image_by_selector(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector: &Selector,
    ) -> Result<DynamicImage, SourceError>;
}

/// `random_image` for selector recipes: pick a selector, render it, forget it.
pub fn image_from_random_selector<R: SelectorRecipe + ?Sized>(
    recipe: &mut R,
    ctx: &mut SourceContext<'_>,
    width: u32,
    height: u32,
) -> Result<DynamicImage, SourceError> {
    let selector = recipe.random_selector(ctx)?;
    recipe.image_by_selector(ctx, width, height, &selector)
}

/// Name → value map owned by one source.
#[derive(Debug)]
pub struct SelectorCache<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for SelectorCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> SelectorCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    /// Store `value`, returning whatever was there before.
    pub fn insert(&mut self, name: &str, value: V) -> Option<V> {
        self.entries.insert(name.to_string(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<V> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Remembers the selector chosen for each name.
pub struct SelectorMemo<R> {
    recipe: R,
    cache: SelectorCache<Selector>,
}

impl<R: SelectorRecipe> SelectorMemo<R> {
    pub fn new(recipe: R) -> Self {
        Self {
            recipe,
            cache: SelectorCache::new(),
        }
    }

    pub fn recipe(&self) -> &R {
        &self.recipe
    }

    /// The selector currently remembered under `name`.
    pub fn selector(&self, name: &str) -> Option<&Selector> {
        self.cache.get(name)
    }

    /// Bind `name` to a caller-chosen selector, replacing any previous one.
    pub fn pin_selector(&mut self, name: &str, selector: Selector) {
        self.cache.insert(name, selector);
    }

    fn resolve(
        &mut self,
        ctx: &mut SourceContext<'_>,
        name: &str,
    ) -> Result<Selector, SourceError> {
        if let Some(selector) = self.cache.get(name) {
            debug!(source = self.recipe.name(), name, ?selector, "reusing selector");
            return Ok(selector.clone());
        }
        let selector = self.recipe.random_selector(ctx)?;
        debug!(source = self.recipe.name(), name, ?selector, "generated selector");
        self.cache.insert(name, selector.clone());
        Ok(selector)
    }
}

impl<R: SelectorRecipe> ImageSource for SelectorMemo<R> {
    fn name(&self) -> &str {
        self.recipe.name()
    }

    fn get_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector_name: Option<&str>,
    ) -> Result<DynamicImage, SourceError> {
        match named(selector_name) {
            None => self.recipe.random_image(ctx, width, height),
            Some(name) => {
                let selector = self.resolve(ctx, name)?;
                self.recipe.image_by_selector(ctx, width, height, &selector)
            }
        }
    }

    fn clear_selector(&mut self, selector_name: &str) -> bool {
        self.cache.remove(selector_name).is_some()
    }
}

/// An empty selector name counts as no name at all.
fn named(selector_name: Option<&str>) -> Option<&str> {
    selector_name.filter(|name| !name.is_empty())
}

/// An image kept in encoded form, with the dimensions it was encoded at.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Remembers the first image produced for each name and resizes it later.
pub struct ResizeMemo<R> {
    recipe: R,
    cache: SelectorCache<EncodedImage>,
}

impl<R: Recipe> ResizeMemo<R> {
    pub fn new(recipe: R) -> Self {
        Self {
            recipe,
            cache: SelectorCache::new(),
        }
    }

    pub fn recipe(&self) -> &R {
        &self.recipe
    }

    pub fn cached(&self, name: &str) -> Option<&EncodedImage> {
        self.cache.get(name)
    }
}

impl<R: Recipe> ImageSource for ResizeMemo<R> {
    fn name(&self) -> &str {
        self.recipe.name()
    }

    fn get_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector_name: Option<&str>,
    ) -> Result<DynamicImage, SourceError> {
        let Some(name) = named(selector_name) else {
            return self.recipe.random_image(ctx, width, height);
        };

        if let Some(entry) = self.cache.get(name) {
            let image = ctx.backend.decode(&entry.bytes)?;
            if (entry.width, entry.height) == (width, height) {
                debug!(source = self.recipe.name(), name, "reusing cached image");
                return Ok(image);
            }
            debug!(
                source = self.recipe.name(),
                name,
                from = ?(entry.width, entry.height),
                to = ?(width, height),
                "resizing cached image"
            );
            return Ok(ctx.backend.resize(&image, width, height, ResizeMode::Resize));
        }

        let image = self.recipe.random_image(ctx, width, height)?;
        let bytes = ctx
            .backend
            .encode(&image, OutputFormat::Png, Quality::default())?;
        debug!(
            source = self.recipe.name(),
            name,
            bytes = bytes.len(),
            "caching image"
        );
        self.cache.insert(
            name,
            EncodedImage {
                bytes,
                width,
                height,
            },
        );
        Ok(image)
    }

    fn clear_selector(&mut self, selector_name: &str) -> bool {
        self.cache.remove(selector_name).is_some()
    }
}
