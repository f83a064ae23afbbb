//! Public placeholder-photo services.
//!
//! Each service is a recipe around one URL scheme. Selector IDs are drawn
//! from the ranges the services accept, so a remembered ID keeps pointing at
//! the same photo when requested at a different size.

use std::sync::Arc;

use image::DynamicImage;
use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::Url;

use super::download;
use super::fetch::{FetchError, Fetcher};
use crate::sources::memo::{
    Recipe, ResizeMemo, SelectorMemo, SelectorRecipe, image_from_random_selector,
};
use crate::sources::{Selector, SourceContext, SourceError};

/// Lock/seed range used by LoremFlickr, PicsumPhotos and PlaceImg.
const ID_RANGE: std::ops::RangeInclusive<u32> = 11111..=99999;

// ============================================================================
// LoremFlickr
// ============================================================================

pub struct LoremFlickr {
    fetcher: Arc<dyn Fetcher>,
}

impl LoremFlickr {
    pub const NAME: &'static str = "LoremFlickr";

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn source(fetcher: Arc<dyn Fetcher>) -> SelectorMemo<Self> {
        SelectorMemo::new(Self::new(fetcher))
    }

    pub fn url(width: u32, height: u32, lock: Option<u32>) -> String {
        match lock {
            Some(lock) => format!("https://loremflickr.com/{width}/{height}/all?lock={lock}"),
            None => format!("https://loremflickr.com/{width}/{height}/all"),
        }
    }
}

impl Recipe for LoremFlickr {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn random_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, SourceError> {
        download(&*self.fetcher, ctx, &Self::url(width, height, None), width, height)
    }
}

impl SelectorRecipe for LoremFlickr {
    fn random_selector(&mut self, ctx: &mut SourceContext<'_>) -> Result<Selector, SourceError> {
        Ok(Selector::Number(ctx.rng.gen_range(ID_RANGE)))
    }

    fn image_by_selector(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector: &Selector,
    ) -> Result<DynamicImage, SourceError> {
        let Selector::Number(lock) = selector else {
            return Err(SourceError::mismatch(Self::NAME, selector));
        };
        let url = Self::url(width, height, Some(*lock));
        download(&*self.fetcher, ctx, &url, width, height)
    }
}

// ============================================================================
// LoremPixel
// ============================================================================

pub struct LoremPixel {
    fetcher: Arc<dyn Fetcher>,
}

impl LoremPixel {
    pub const NAME: &'static str = "LoremPixel";

    pub const CATEGORIES: [&'static str; 13] = [
        "abstract",
        "animals",
        "business",
        "cats",
        "city",
        "food",
        "nightlife",
        "fashion",
        "people",
        "nature",
        "sports",
        "technics",
        "transport",
    ];

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn source(fetcher: Arc<dyn Fetcher>) -> SelectorMemo<Self> {
        SelectorMemo::new(Self::new(fetcher))
    }

    pub fn url(width: u32, height: u32, pick: Option<(&str, u32)>) -> String {
        match pick {
            Some((category, id)) => {
                format!("https://lorempixel.com/{width}/{height}/{category}/{id}/")
            }
            None => format!("https://lorempixel.com/{width}/{height}/"),
        }
    }
}

impl Recipe for LoremPixel {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn random_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, SourceError> {
        download(&*self.fetcher, ctx, &Self::url(width, height, None), width, height)
    }
}

impl SelectorRecipe for LoremPixel {
    fn random_selector(&mut self, ctx: &mut SourceContext<'_>) -> Result<Selector, SourceError> {
        let category = Self::CATEGORIES
            .choose(&mut *ctx.rng)
            .copied()
            .unwrap_or(Self::CATEGORIES[0]);
        Ok(Selector::Category {
            category: category.to_string(),
            id: ctx.rng.gen_range(1..=10),
        })
    }

    fn image_by_selector(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector: &Selector,
    ) -> Result<DynamicImage, SourceError> {
        let Selector::Category { category, id } = selector else {
            return Err(SourceError::mismatch(Self::NAME, selector));
        };
        let url = Self::url(width, height, Some((category, *id)));
        download(&*self.fetcher, ctx, &url, width, height)
    }
}

// ============================================================================
// PicsumPhotos
// ============================================================================

pub struct PicsumPhotos {
    fetcher: Arc<dyn Fetcher>,
}

impl PicsumPhotos {
    pub const NAME: &'static str = "PicsumPhotos";

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn source(fetcher: Arc<dyn Fetcher>) -> SelectorMemo<Self> {
        SelectorMemo::new(Self::new(fetcher))
    }

    pub fn url(width: u32, height: u32, seed: Option<u32>) -> String {
        match seed {
            Some(seed) => format!("https://picsum.photos/seed/{seed}/{width}/{height}.jpg"),
            None => format!("https://picsum.photos/{width}/{height}.jpg"),
        }
    }
}

impl Recipe for PicsumPhotos {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn random_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, SourceError> {
        download(&*self.fetcher, ctx, &Self::url(width, height, None), width, height)
    }
}

impl SelectorRecipe for PicsumPhotos {
    fn random_selector(&mut self, ctx: &mut SourceContext<'_>) -> Result<Selector, SourceError> {
        Ok(Selector::Number(ctx.rng.gen_range(ID_RANGE)))
    }

    fn image_by_selector(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector: &Selector,
    ) -> Result<DynamicImage, SourceError> {
        let Selector::Number(seed) = selector else {
            return Err(SourceError::mismatch(Self::NAME, selector));
        };
        let url = Self::url(width, height, Some(*seed));
        download(&*self.fetcher, ctx, &url, width, height)
    }
}

// ============================================================================
// PlaceKitten
// ============================================================================

pub struct PlaceKitten {
    fetcher: Arc<dyn Fetcher>,
}

impl PlaceKitten {
    pub const NAME: &'static str = "PlaceKitten";

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn source(fetcher: Arc<dyn Fetcher>) -> SelectorMemo<Self> {
        SelectorMemo::new(Self::new(fetcher))
    }

    pub fn url(width: u32, height: u32, image: u32) -> String {
        format!("http://placekitten.com/{width}/{height}?image={image}")
    }
}

impl Recipe for PlaceKitten {
    fn name(&self) -> &str {
        Self::NAME
    }

    // The service has no random endpoint of its own.
    fn random_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, SourceError> {
        image_from_random_selector(self, ctx, width, height)
    }
}

impl SelectorRecipe for PlaceKitten {
    fn random_selector(&mut self, ctx: &mut SourceContext<'_>) -> Result<Selector, SourceError> {
        Ok(Selector::Number(ctx.rng.gen_range(1..=16)))
    }

    fn image_by_selector(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector: &Selector,
    ) -> Result<DynamicImage, SourceError> {
        let Selector::Number(image) = selector else {
            return Err(SourceError::mismatch(Self::NAME, selector));
        };
        let url = Self::url(width, height, *image);
        download(&*self.fetcher, ctx, &url, width, height)
    }
}

// ============================================================================
// PlaceImg
// ============================================================================

/// Random photos with no replayable identifier; remembered by bytes.
pub struct PlaceImg {
    fetcher: Arc<dyn Fetcher>,
}

impl PlaceImg {
    pub const NAME: &'static str = "PlaceImg";

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn source(fetcher: Arc<dyn Fetcher>) -> ResizeMemo<Self> {
        ResizeMemo::new(Self::new(fetcher))
    }

    /// `nonce` only defeats upstream caching.
    pub fn url(width: u32, height: u32, nonce: u32) -> String {
        format!("https://placeimg.com/{width}/{height}/any?{nonce}")
    }
}

impl Recipe for PlaceImg {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn random_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, SourceError> {
        let url = Self::url(width, height, ctx.rng.gen_range(ID_RANGE));
        download(&*self.fetcher, ctx, &url, width, height)
    }
}

// ============================================================================
// Unsplash
// ============================================================================

/// Photo selectors are the URL Unsplash redirects a random request to, minus
/// its size parameters.
///
/// The redirect endpoint is best effort: the service may change or drop it,
/// in which case selector resolution fails with a [`FetchError`].
pub struct Unsplash {
    fetcher: Arc<dyn Fetcher>,
}

impl Unsplash {
    pub const NAME: &'static str = "Unsplash";

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn source(fetcher: Arc<dyn Fetcher>) -> SelectorMemo<Self> {
        SelectorMemo::new(Self::new(fetcher))
    }

    pub fn random_url(width: u32, height: u32, sig: u32) -> String {
        format!("https://source.unsplash.com/random/{width}x{height}?sig={sig}")
    }

    pub fn redirect_url(sig: u32) -> String {
        format!("https://source.unsplash.com/random/?sig={sig}")
    }

    /// `photo` with `w` and `h` query parameters appended.
    pub fn sized_url(photo: &str, width: u32, height: u32) -> Result<String, FetchError> {
        let mut url = parse_url(photo)?;
        url.query_pairs_mut()
            .append_pair("w", &width.to_string())
            .append_pair("h", &height.to_string());
        Ok(url.into())
    }
}

fn parse_url(value: &str) -> Result<Url, FetchError> {
    Url::parse(value).map_err(|e| FetchError::InvalidUrl {
        url: value.to_string(),
        message: e.to_string(),
    })
}

/// Drop `w`/`h` query parameters and any fragment, keeping the rest in order.
pub fn strip_size_params(location: &str) -> Result<String, FetchError> {
    let mut url = parse_url(location)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "w" && key != "h")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.set_query(None);
    url.set_fragment(None);
    if !kept.is_empty() {
        url.query_pairs_mut().extend_pairs(kept);
    }
    Ok(url.into())
}

impl Recipe for Unsplash {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn random_image(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, SourceError> {
        let url = Self::random_url(width, height, ctx.rng.gen_range(ID_RANGE));
        download(&*self.fetcher, ctx, &url, width, height)
    }
}

impl SelectorRecipe for Unsplash {
    fn random_selector(&mut self, ctx: &mut SourceContext<'_>) -> Result<Selector, SourceError> {
        let location = self
            .fetcher
            .resolve_redirect(&Self::redirect_url(ctx.rng.gen_range(1111..=9999)))?;
        Ok(Selector::Url(strip_size_params(&location)?))
    }

    fn image_by_selector(
        &mut self,
        ctx: &mut SourceContext<'_>,
        width: u32,
        height: u32,
        selector: &Selector,
    ) -> Result<DynamicImage, SourceError> {
        let Selector::Url(photo) = selector else {
            return Err(SourceError::mismatch(Self::NAME, selector));
        };
        let url = Self::sized_url(photo, width, height)?;
        download(&*self.fetcher, ctx, &url, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::sources::ImageSource;
    use crate::sources::remote::fetch::tests::MockFetcher;
    use crate::test_helpers::png_bytes;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mock(body: Vec<u8>) -> Arc<MockFetcher> {
        Arc::new(MockFetcher::with_body(body))
    }

    #[test]
    fn url_schemes() {
        assert_eq!(
            LoremFlickr::url(640, 480, Some(12345)),
            "https://loremflickr.com/640/480/all?lock=12345"
        );
        assert_eq!(
            LoremFlickr::url(640, 480, None),
            "https://loremflickr.com/640/480/all"
        );
        assert_eq!(
            LoremPixel::url(10, 20, Some(("cats", 3))),
            "https://lorempixel.com/10/20/cats/3/"
        );
        assert_eq!(LoremPixel::url(10, 20, None), "https://lorempixel.com/10/20/");
        assert_eq!(
            PicsumPhotos::url(300, 200, Some(55555)),
            "https://picsum.photos/seed/55555/300/200.jpg"
        );
        assert_eq!(
            PicsumPhotos::url(300, 200, None),
            "https://picsum.photos/300/200.jpg"
        );
        assert_eq!(
            PlaceKitten::url(200, 100, 7),
            "http://placekitten.com/200/100?image=7"
        );
        assert_eq!(
            PlaceImg::url(50, 60, 12121),
            "https://placeimg.com/50/60/any?12121"
        );
        assert_eq!(
            Unsplash::random_url(80, 90, 4242),
            "https://source.unsplash.com/random/80x90?sig=4242"
        );
    }

    #[test]
    fn strip_size_params_keeps_other_query_pairs() {
        let stripped = strip_size_params(
            "https://images.unsplash.com/photo-123?ixid=abc&w=1080&fm=jpg&h=720#frag",
        )
        .unwrap();
        assert_eq!(
            stripped,
            "https://images.unsplash.com/photo-123?ixid=abc&fm=jpg"
        );
        assert_eq!(
            Unsplash::sized_url(&stripped, 40, 30).unwrap(),
            "https://images.unsplash.com/photo-123?ixid=abc&fm=jpg&w=40&h=30"
        );
    }

    #[test]
    fn strip_size_params_without_other_pairs() {
        let stripped = strip_size_params("https://images.unsplash.com/p?w=1&h=2").unwrap();
        assert_eq!(stripped, "https://images.unsplash.com/p");
        assert_eq!(
            Unsplash::sized_url(&stripped, 5, 6).unwrap(),
            "https://images.unsplash.com/p?w=5&h=6"
        );
    }

    #[test]
    fn strip_size_params_rejects_garbage() {
        assert!(matches!(
            strip_size_params("not a url"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn selector_ids_stay_in_service_ranges() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let fetcher = mock(Vec::new());
        let mut flickr = LoremFlickr::new(fetcher.clone());
        let mut pixel = LoremPixel::new(fetcher.clone());
        let mut kitten = PlaceKitten::new(fetcher);

        for _ in 0..200 {
            match flickr.random_selector(&mut ctx).unwrap() {
                Selector::Number(n) => assert!(ID_RANGE.contains(&n)),
                other => panic!("unexpected {other:?}"),
            }
            match pixel.random_selector(&mut ctx).unwrap() {
                Selector::Category { category, id } => {
                    assert!(LoremPixel::CATEGORIES.contains(&category.as_str()));
                    assert!((1..=10).contains(&id));
                }
                other => panic!("unexpected {other:?}"),
            }
            match kitten.random_selector(&mut ctx).unwrap() {
                Selector::Number(n) => assert!((1..=16).contains(&n)),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn named_request_replays_same_lock() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let fetcher = mock(png_bytes(8, 8, [10, 20, 30]));
        let mut source = LoremFlickr::source(fetcher.clone());

        source.get_image(&mut ctx, 100, 50, Some("hero")).unwrap();
        source.get_image(&mut ctx, 200, 80, Some("hero")).unwrap();

        let Some(Selector::Number(lock)) = source.selector("hero").cloned() else {
            panic!("no lock remembered");
        };
        assert_eq!(
            fetcher.requests(),
            vec![
                LoremFlickr::url(100, 50, Some(lock)),
                LoremFlickr::url(200, 80, Some(lock)),
            ]
        );
    }

    #[test]
    fn downloaded_image_is_fitted_to_request() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let mut source = PicsumPhotos::source(mock(png_bytes(8, 8, [200, 0, 0])));

        let img = source.get_image(&mut ctx, 30, 12, None).unwrap();
        assert_eq!((img.width(), img.height()), (30, 12));
        assert_eq!(img.to_rgba8().get_pixel(15, 6).0, [200, 0, 0, 255]);
    }

    #[test]
    fn undecodable_body_is_a_backend_error() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let mut source = LoremPixel::source(mock(b"<html>gone</html>".to_vec()));

        assert!(matches!(
            source.get_image(&mut ctx, 10, 10, None),
            Err(SourceError::Backend(_))
        ));
    }

    #[test]
    fn place_img_caches_bytes_per_name() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let fetcher = mock(png_bytes(16, 16, [0, 90, 0]));
        let mut source = PlaceImg::source(fetcher.clone());

        let first = source.get_image(&mut ctx, 16, 16, Some("a")).unwrap();
        let again = source.get_image(&mut ctx, 16, 16, Some("a")).unwrap();
        let resized = source.get_image(&mut ctx, 4, 4, Some("a")).unwrap();

        assert_eq!(first.to_rgba8(), again.to_rgba8());
        assert_eq!((resized.width(), resized.height()), (4, 4));
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn unsplash_selector_comes_from_redirect() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let fetcher = Arc::new(
            MockFetcher::with_body(png_bytes(4, 4, [1, 1, 1]))
                .with_redirect("https://images.unsplash.com/photo-9?ixid=z&w=1080&h=720"),
        );
        let mut source = Unsplash::source(fetcher.clone());

        source.get_image(&mut ctx, 20, 10, Some("bg")).unwrap();

        assert_eq!(
            source.selector("bg"),
            Some(&Selector::Url(
                "https://images.unsplash.com/photo-9?ixid=z".to_string()
            ))
        );
        let requests = fetcher.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("https://source.unsplash.com/random/?sig="));
        assert_eq!(
            requests[1],
            "https://images.unsplash.com/photo-9?ixid=z&w=20&h=10"
        );
    }

    #[test]
    fn unsplash_without_redirect_fails() {
        let backend = RustBackend::new();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut ctx = SourceContext::new(&backend, &mut rng);
        let mut source = Unsplash::source(mock(Vec::new()));

        assert!(matches!(
            source.get_image(&mut ctx, 20, 10, Some("bg")),
            Err(SourceError::Fetch(FetchError::MissingRedirect { .. }))
        ));
        assert!(source.selector("bg").is_none());
    }
}
