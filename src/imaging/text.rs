//! Outlined text rendering through `usvg`/`resvg`.
//!
//! A label is described as a tiny SVG document: the string is drawn four times
//! in black at ±1px diagonal offsets, then once in white on top. The result is
//! a simple outline without a stroke primitive. `resvg` rasterizes the document
//! onto a transparent layer the size of the target image, and the backend
//! composites that layer over the picture.
//!
//! Fonts come from an explicit font file when [`TextParams::font`] is set,
//! otherwise from the system font database (loaded once per rasterizer).

use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use image::{Rgba, RgbaImage};
use usvg::fontdb;

use super::backend::BackendError;
use super::calculations::text_anchor;
use super::params::{HAlign, TextParams, VAlign};

/// Outline thickness in pixels.
const BORDER: i64 = 1;

const OUTLINE_OFFSETS: [(i64, i64); 4] = [
    (-BORDER, -BORDER),
    (-BORDER, BORDER),
    (BORDER, -BORDER),
    (BORDER, BORDER),
];

#[derive(Default)]
pub struct TextRasterizer {
    system_fonts: OnceLock<Arc<fontdb::Database>>,
}

impl TextRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `params` onto a transparent `width`×`height` layer.
    pub fn rasterize(
        &self,
        width: u32,
        height: u32,
        params: &TextParams,
    ) -> Result<RgbaImage, BackendError> {
        let fontdb = self.database(params.font.as_deref());
        let family = family_name(&fontdb).ok_or_else(|| {
            BackendError::ProcessingFailed(format!(
                "No font available to draw text {:?}",
                params.text
            ))
        })?;

        let svg = build_svg(width, height, params, &family);
        let opts = usvg::Options {
            fontdb,
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| BackendError::ProcessingFailed(format!("Failed to lay out text: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            BackendError::ProcessingFailed(format!("Invalid text layer size {width}x{height}"))
        })?;
        resvg::render(&tree, usvg::Transform::default(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha; the image crate expects straight alpha.
        let mut layer = RgbaImage::new(width, height);
        for (dst, src) in layer.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(layer)
    }

    fn database(&self, font: Option<&Path>) -> Arc<fontdb::Database> {
        if let Some(path) = font {
            let mut db = fontdb::Database::new();
            match db.load_font_file(path) {
                Ok(()) => return Arc::new(db),
                Err(e) => tracing::warn!(
                    "cannot load font {}: {e}; falling back to system fonts",
                    path.display()
                ),
            }
        }
        Arc::clone(self.system_fonts.get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!("loaded {} system font faces", db.len());
            Arc::new(db)
        }))
    }
}

/// Family to request: the generic sans-serif face if the database resolves
/// one, otherwise whatever face was loaded first.
fn family_name(db: &fontdb::Database) -> Option<String> {
    let query = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..Default::default()
    };
    let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
    db.face(id)
        .and_then(|face| face.families.first())
        .map(|(name, _)| name.clone())
}

fn build_svg(width: u32, height: u32, params: &TextParams, family: &str) -> String {
    let (x, y) = text_anchor((width, height), params.position, params.margin);
    let anchor = match params.position.align {
        HAlign::Left => "start",
        HAlign::Center => "middle",
        HAlign::Right => "end",
    };
    let baseline = match params.position.valign {
        VAlign::Top => "text-before-edge",
        VAlign::Middle => "central",
        VAlign::Bottom => "text-after-edge",
    };
    let size = (params.size - 2.0 * BORDER as f32).max(1.0);
    let text = escape_xml(&params.text);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">"#
    );
    let _ = write!(
        svg,
        r#"<g font-family="{}" font-size="{size}" text-anchor="{anchor}" dominant-baseline="{baseline}" transform="rotate({} {x} {y})">"#,
        escape_xml(family),
        -params.angle,
    );
    for (dx, dy) in OUTLINE_OFFSETS {
        let _ = write!(
            svg,
            r##"<text x="{}" y="{}" fill="#000000">{text}</text>"##,
            x + dx,
            y + dy
        );
    }
    let _ = write!(
        svg,
        r##"<text x="{x}" y="{y}" fill="#ffffff">{text}</text></g></svg>"##
    );
    svg
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
