//! Images picked from a local directory tree.
//!
//! The directory is walked recursively the first time an image is needed, and
//! the list of candidate files is kept for the lifetime of the source. A file
//! is a candidate when its extension (case-insensitive) is one the backend
//! can handle. Files added or removed afterwards are not noticed.
//!
//! The root is made absolute before the walk, so the file selectors stay
//! valid if the working directory changes later.
//!
//! Pictures are adapted to the requested size with the configured
//! [`ResizeMode`]: `Fit` fills and center-crops, `Resize` stretches.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use rand::Rng;
use tracing::debug;
use walkdir::WalkDir;

use super::memo::{Recipe, SelectorMemo, SelectorRecipe, image_from_random_selector};
use super::{Selector, SourceContext, SourceError};
use crate::imaging::{ImageBackend, ResizeMode};

pub const NAME: &str = "Gallery";

pub struct Gallery {
    root: PathBuf,
    mode: ResizeMode,
    images: Option<Vec<PathBuf>>,
}

pub type GallerySource = SelectorMemo<Gallery>;

impl Gallery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: ResizeMode::default(),
            images: None,
        }
    }

    pub fn with_resize_mode(mut self, mode: ResizeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn into_source(self) -> GallerySource {
        SelectorMemo::new(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resize_mode(&self) -> ResizeMode {
        self.mode
    }

    /// Candidate files, scanning the tree on first use.
    pub fn images(&mut self, backend: &dyn ImageBackend) -> Result<&[PathBuf], SourceError> {
        if self.images.is_none() {
            let found = scan(&self.root, backend)?;
            debug!(root = %self.root.display(), count = found.len(), "scanned gallery");
            self.images = Some(found);
        }
        Ok(self.images.as_deref().unwrap_or_default())
    }
}

/// All files under `root` whose extension the backend supports, in a stable
/// order. An empty result is an error.
fn scan(root: &Path, backend: &dyn ImageBackend) -> Result<Vec<PathBuf>, SourceError> {
    let extensions = backend.supported_extensions();
    let base = std::fs::canonicalize(root).map_err(|source| SourceError::GalleryRoot {
        path: root.to_path_buf(),
        source,
    })?;
    let mut found = Vec::new();
    for entry in WalkDir::new(&base).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e.to_ascii_lowercase().as_str()));
        if matches {
            found.push(entry.into_path());
        }
    }
    if found.is_empty() {
        return Err(SourceError::EmptyGallery {
            path: root.to_path_buf(),
            extensions: extensions.join(", "),
        });
    }
    Ok(found)
}

impl Recipe for Gallery {
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

impl SelectorRecipe for Gallery {
    fn random_selector(&mut self, ctx: &mut SourceContext<'_>) -> Result<Selector, SourceError> {
        let images = self.images(ctx.backend)?;
        let index = ctx.rng.gen_range(0..images.len());
        Ok(Selector::File(images[index].clone()))
    }

    fn image_by_selector(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector: &Selector,
    ) -> Result<DynamicImage, SourceError> {
        let Selector::File(path) = selector else {
            return Err(SourceError::mismatch(NAME, selector));
        };
        let image = ctx.backend.open(path)?;
        Ok(ctx.backend.resize(&image, width, height, self.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::sources::ImageSource;
    use crate::test_helpers::{gallery_fixture, write_png};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tempfile::TempDir;

    #[test]
    fn scan_finds_supported_files_recursively() {
        let dir = gallery_fixture();
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();

        let mut gallery = Gallery::new(dir.path());
        let images = gallery.images(&MockBackend::new()).unwrap();

        let base = dir.path().canonicalize().unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.strip_prefix(&base).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["blue.png", "nested/green.PNG", "red.png"]);
    }

    #[test]
    fn scan_respects_backend_formats() {
        let dir = TempDir::new().unwrap();
        write_png(&dir.path().join("a.png"), 4, 4, [1, 2, 3]);
        std::fs::write(dir.path().join("b.bmp"), b"bmp").unwrap();

        let basic = MockBackend::new();
        let mut gallery = Gallery::new(dir.path());
        assert_eq!(gallery.images(&basic).unwrap().len(), 1);

        let mut gallery = Gallery::new(dir.path());
        assert_eq!(gallery.images(&RustBackend::new()).unwrap().len(), 2);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = SourceContext::new(&backend, &mut rng);

        let err = Gallery::new(dir.path())
            .into_source()
            .get_image(&mut ctx, 10, 10, None)
            .unwrap_err();
        match err {
            SourceError::EmptyGallery { path, extensions } => {
                assert_eq!(path, dir.path());
                assert!(extensions.contains("png"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_directory_is_a_root_error() {
        let backend = MockBackend::new();
        let mut gallery = Gallery::new("/nonexistent/gallery/root");
        assert!(matches!(
            gallery.images(&backend),
            Err(SourceError::GalleryRoot { .. })
        ));
    }

    #[test]
    fn relative_root_yields_absolute_selectors() {
        let dir = tempfile::Builder::new().tempdir_in(".").unwrap();
        write_png(&dir.path().join("a.png"), 4, 4, [1, 2, 3]);
        let relative = dir.path().strip_prefix(".").unwrap_or(dir.path());
        assert!(relative.is_relative());

        let backend = MockBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let mut source = Gallery::new(relative).into_source();
        source.get_image(&mut ctx, 4, 4, Some("pic")).unwrap();

        match source.selector("pic") {
            Some(Selector::File(path)) => {
                assert!(path.is_absolute(), "{}", path.display());
                assert!(path.ends_with("a.png"));
            }
            other => panic!("unexpected selector {other:?}"),
        }
    }

    #[test]
    fn picked_image_is_resized_with_configured_mode() {
        let dir = gallery_fixture();
        let backend = MockBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = SourceContext::new(&backend, &mut rng);

        let mut source = Gallery::new(dir.path())
            .with_resize_mode(ResizeMode::Resize)
            .into_source();
        let img = source.get_image(&mut ctx, 30, 20, None).unwrap();

        assert_eq!((img.width(), img.height()), (30, 20));
        let ops = backend.get_operations();
        assert!(matches!(ops[0], RecordedOp::Open(_)));
        assert_eq!(
            ops[1],
            RecordedOp::Resize {
                width: 30,
                height: 20,
                mode: ResizeMode::Resize
            }
        );
    }

    #[test]
    fn named_selector_returns_same_file() {
        let dir = gallery_fixture();
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let mut source = Gallery::new(dir.path()).into_source();

        let first = source.get_image(&mut ctx, 6, 6, Some("avatar")).unwrap();
        for _ in 0..5 {
            let again = source.get_image(&mut ctx, 6, 6, Some("avatar")).unwrap();
            assert_eq!(first.to_rgba8(), again.to_rgba8());
        }
        assert!(matches!(source.selector("avatar"), Some(Selector::File(_))));
    }

    #[test]
    fn fit_mode_fills_target_exactly() {
        let dir = gallery_fixture();
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut ctx = SourceContext::new(&backend, &mut rng);

        let img = Gallery::new(dir.path())
            .into_source()
            .get_image(&mut ctx, 13, 29, None)
            .unwrap();
        assert_eq!((img.width(), img.height()), (13, 29));
    }
}
