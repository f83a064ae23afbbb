//! Registry of named image sources and factory for editing sessions.
//!
//! The provider owns the imaging backend, the random generator shared by all
//! sources, and the sources themselves. Sources are kept in registration
//! order; the first one registered is the default when no name is given.
//! Registering a second source under an existing name replaces the first in
//! place, keeping its position.

use std::sync::Arc;

use image::DynamicImage;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::imaging::{ImageBackend, RustBackend};
use crate::session::{ImageSession, SessionOptions};
use crate::sources::remote::{self, HttpFetcher};
use crate::sources::{Gallery, Gradient, ImageSource, SolidColor, SourceContext, SourceError};

pub struct ImageProvider {
    backend: Arc<dyn ImageBackend>,
    rng: Box<dyn RngCore + Send>,
    sources: Vec<Box<dyn ImageSource>>,
    session_options: SessionOptions,
}

impl ImageProvider {
    /// Provider with no sources, drawing randomness from OS entropy.
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self::with_rng(backend, Box::new(ChaCha8Rng::from_entropy()))
    }

    /// Provider whose random choices are reproducible.
    pub fn with_seed(backend: Arc<dyn ImageBackend>, seed: u64) -> Self {
        Self::with_rng(backend, Box::new(ChaCha8Rng::seed_from_u64(seed)))
    }

    pub fn with_rng(backend: Arc<dyn ImageBackend>, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            backend,
            rng,
            sources: Vec::new(),
            session_options: SessionOptions::default(),
        }
    }

    /// Build a provider from configuration: backend, seed, session defaults
    /// and sources (SolidColor and Gradient always, then Gallery and the
    /// remote services when configured).
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let backend: Arc<dyn ImageBackend> =
            Arc::new(RustBackend::with_extended_formats(config.backend.extended_formats));
        let mut provider = match config.seed {
            Some(seed) => Self::with_seed(backend, seed),
            None => Self::new(backend),
        };
        provider.set_session_options(config.session_options()?);

        provider.register(Box::new(SolidColor::source()));
        provider.register(Box::new(Gradient::source()));
        if let Some(path) = &config.gallery.path {
            let gallery = Gallery::new(path).with_resize_mode(config.gallery.resize_mode()?);
            provider.register(Box::new(gallery.into_source()));
        }
        if config.remote.enabled {
            let fetcher = Arc::new(
                HttpFetcher::new(config.remote.timeout(), &config.remote.user_agent)
                    .map_err(SourceError::from)?,
            );
            for name in &config.remote.sources {
                let source = remote::remote_source(name, fetcher.clone())
                    .ok_or_else(|| SourceError::NotFound(name.clone()))?;
                provider.register(source);
            }
        }
        Ok(provider)
    }

    pub fn backend(&self) -> &Arc<dyn ImageBackend> {
        &self.backend
    }

    pub fn session_options(&self) -> &SessionOptions {
        &self.session_options
    }

    pub fn set_session_options(&mut self, options: SessionOptions) -> &mut Self {
        self.session_options = options;
        self
    }

    /// Add a source, replacing any registered under the same name.
    pub fn register(&mut self, source: Box<dyn ImageSource>) -> &mut Self {
        match self.sources.iter().position(|s| s.name() == source.name()) {
            Some(index) => {
                debug!(source = source.name(), "replacing registered source");
                self.sources[index] = source;
            }
            None => {
                debug!(source = source.name(), "registered source");
                self.sources.push(source);
            }
        }
        self
    }

    /// Registered names, default first.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    fn index_of(&self, name: Option<&str>) -> std::result::Result<usize, SourceError> {
        match name {
            None if self.sources.is_empty() => Err(SourceError::NoSources),
            None => Ok(0),
            Some(name) => self
                .sources
                .iter()
                .position(|s| s.name() == name)
                .ok_or_else(|| SourceError::NotFound(name.to_string())),
        }
    }

    /// The source registered under `name`, or the default source.
    pub fn get(
        &mut self,
        name: Option<&str>,
    ) -> std::result::Result<&mut dyn ImageSource, SourceError> {
        let index = self.index_of(name)?;
        Ok(self.sources[index].as_mut())
    }

    /// Raw image from a source, without opening a session.
    #[tracing::instrument(skip(self))]
    pub fn get_image(
        &mut self,
        width: u32,
        height: u32,
        selector_name: Option<&str>,
        source_name: Option<&str>,
    ) -> Result<DynamicImage> {
        if width == 0 || height == 0 {
            return Err(Error::configuration(format!(
                "Image dimensions must be positive, got {width}x{height}"
            )));
        }
        let index = self.index_of(source_name)?;
        let mut ctx = SourceContext::new(self.backend.as_ref(), self.rng.as_mut());
        Ok(self.sources[index].get_image(&mut ctx, width, height, selector_name)?)
    }

    /// Open an editing session on a fresh image.
    pub fn create_session(
        &mut self,
        width: u32,
        height: u32,
        selector_name: Option<&str>,
        source_name: Option<&str>,
    ) -> Result<ImageSession> {
        let image = self.get_image(width, height, selector_name, source_name)?;
        let seed = self.rng.next_u64();
        Ok(ImageSession::with_seed(
            image,
            Arc::clone(&self.backend),
            self.session_options.clone(),
            seed,
        ))
    }

    /// Forget `selector_name` on a source. Returns whether it was known.
    pub fn clear_selector(
        &mut self,
        source_name: Option<&str>,
        selector_name: &str,
    ) -> Result<bool> {
        Ok(self.get(source_name)?.clear_selector(selector_name))
    }
}
