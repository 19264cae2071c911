use std::path::Path;

use image::RgbaImage;
use rusttype::{Font, Scale, point};
use tracing::warn;

use crate::{assets, composite};

pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// The single face used for every text role (quote, accent glyphs, footer),
/// rendered at role-specific sizes. There is no built-in raster fallback
/// face; when no font file can be loaded, text layers are skipped and the
/// caller keeps its canvas dimensions.
pub struct FontBook {
    font: Option<Font<'static>>,
}

impl FontBook {
    /// Tries the preferred file first, then any other font in the fonts
    /// directory.
    pub fn load(preferred: &Path, fonts_dir: &Path) -> Self {
        if let Some(font) = load_font_file(preferred) {
            return Self { font: Some(font) };
        }

        for candidate in assets::list_assets(fonts_dir, FONT_EXTENSIONS) {
            if candidate == preferred {
                continue;
            }
            if let Some(font) = load_font_file(&candidate) {
                warn!(
                    preferred = %preferred.display(),
                    fallback = %candidate.display(),
                    "preferred font unavailable, using fallback"
                );
                return Self { font: Some(font) };
            }
        }

        warn!(
            preferred = %preferred.display(),
            "no usable font found, text layers will be skipped"
        );
        Self { font: None }
    }

    pub fn empty() -> Self {
        Self { font: None }
    }

    pub fn font(&self) -> Option<&Font<'static>> {
        self.font.as_ref()
    }
}

fn load_font_file(path: &Path) -> Option<Font<'static>> {
    let bytes = std::fs::read(path).ok()?;
    Font::try_from_vec(bytes)
}

/// Greedy word wrap on whitespace, counting characters rather than pixels.
/// Words longer than `width` are broken at the column boundary.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    assert!(width > 0);

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        while chars.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let head: String = chars.drain(..width).collect();
            lines.push(head);
        }
        if chars.is_empty() {
            continue;
        }

        let word_len = chars.len();
        if line_len == 0 {
            line = chars.into_iter().collect();
            line_len = word_len;
        } else if line_len + 1 + word_len <= width {
            line.push(' ');
            line.extend(chars);
            line_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut line));
            line = chars.into_iter().collect();
            line_len = word_len;
        }
    }

    if line_len > 0 {
        lines.push(line);
    }
    lines
}

/// Line height at `size`: ascent plus descent, the same quantity the quote
/// block layout is specified in.
pub fn line_height(font: &Font<'_>, size: f32) -> i64 {
    let vm = font.v_metrics(Scale::uniform(size));
    (vm.ascent - vm.descent).ceil() as i64
}

/// Rendered pixel width of `text` at `size`, from the rightmost glyph
/// bounding box of a layout starting at x = 0.
pub fn text_width(font: &Font<'_>, size: f32, text: &str) -> i64 {
    if text.is_empty() {
        return 0;
    }
    let scale = Scale::uniform(size);
    let vm = font.v_metrics(scale);
    let mut width = 0i64;
    for glyph in font.layout(text, scale, point(0.0, vm.ascent)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            width = width.max(i64::from(bb.max.x));
        }
    }
    width
}

/// Draws `text` with its top edge at `y`, blending coverage-scaled color into
/// the destination. Works on opaque canvases and transparent overlay layers
/// alike.
pub fn draw_text(
    img: &mut RgbaImage,
    font: &Font<'_>,
    size: f32,
    x: i64,
    y: i64,
    color: composite::Rgba8,
    text: &str,
) {
    let scale = Scale::uniform(size);
    let vm = font.v_metrics(scale);
    let baseline = y as f32 + vm.ascent;

    for glyph in font.layout(text, scale, point(x as f32, baseline)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let alpha = (coverage * f32::from(color[3])).round() as u8;
            if alpha == 0 {
                return;
            }
            composite::blend_pixel(
                img,
                i64::from(bb.min.x) + i64::from(gx),
                i64::from(bb.min.y) + i64::from(gy),
                [color[0], color[1], color[2], alpha],
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_reference_quote_into_two_lines() {
        let lines = wrap_text("A d\u{fa}vida \u{e9} o in\u{ed}cio da sabedoria.", 20);
        assert_eq!(
            lines,
            vec![
                "A d\u{fa}vida \u{e9} o in\u{ed}cio".to_string(),
                "da sabedoria.".to_string()
            ]
        );
    }

    #[test]
    fn wrap_counts_characters_not_bytes() {
        // 20 two-byte characters must stay on one line.
        let text = "\u{e9}".repeat(20);
        assert_eq!(wrap_text(&text, 20), vec![text.clone()]);
    }

    #[test]
    fn wrap_respects_the_column_everywhere() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        for line in wrap_text(text, 20) {
            assert!(line.chars().count() <= 20, "line too long: {line:?}");
        }
    }

    #[test]
    fn wrap_breaks_overlong_words() {
        let lines = wrap_text("abcdefghijklmnopqrstuvwxyz ok", 20);
        assert_eq!(
            lines,
            vec![
                "abcdefghijklmnopqrst".to_string(),
                "uvwxyz ok".to_string()
            ]
        );
    }

    #[test]
    fn wrap_of_empty_text_has_no_lines() {
        assert!(wrap_text("", 20).is_empty());
        assert!(wrap_text("   ", 20).is_empty());
    }

    #[test]
    fn font_book_without_files_is_empty() {
        let missing = std::env::temp_dir().join("quotecard_no_fonts_here");
        let book = FontBook::load(&missing.join("quote.ttf"), &missing);
        assert!(book.font().is_none());
    }
}
