use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{Rgb, RgbImage, Rgba, RgbaImage, imageops::FilterType};
use rand::Rng;
use tracing::{info, warn};

use crate::{
    assets, composite,
    config::{Config, OutputPaths, WatermarkRow},
    error::QuotecardResult,
    text::{self, FontBook},
};

pub const CARD_WIDTH: u32 = 1080;
pub const CARD_HEIGHT: u32 = 1080;
pub const THUMB_WIDTH: u32 = 1080;
pub const THUMB_HEIGHT: u32 = 1920;

const WRAP_COLUMNS: usize = 20;
const QUOTE_SIZE: f32 = 50.0;
const ACCENT_SIZE: f32 = 100.0;
const FOOTER_SIZE: f32 = 30.0;
const LINE_SPACING: i64 = 15;
const SHADOW_OFFSET: i64 = 3;
const ACCENT_TOP_MARGIN: i64 = 100;
const ACCENT_GLYPHS: &str = "\u{201c}\u{201d}";
const BACKGROUND_ALPHA: u8 = 80;
const ICON_SIZE: u32 = 32;
const ICON_TEXT_GAP: i64 = 42;
const ICON_RAISE: i64 = 5;
const FOOTER_BOTTOM_MARGIN: i64 = 100;
const FOOTER_ROW_STEP: i64 = 40;

const TEXT_COLOR: composite::Rgba8 = [255, 255, 255, 255];
const SHADOW_COLOR: composite::Rgba8 = [0, 0, 0, 255];
const ACCENT_COLOR: composite::Rgba8 = [255, 200, 100, 255];
const FOOTER_COLOR: composite::Rgba8 = [255, 255, 255, 200];

/// Paths of the freshly written square card and its vertical variant.
#[derive(Clone, Debug)]
pub struct CardArtifacts {
    pub card: PathBuf,
    pub thumbnail: PathBuf,
}

/// Renders the branded quote card: a random dimmed background under a
/// shadowed, centered quote block, decorative quotation marks, and a
/// watermark overlay, written as a 1080x1080 JPEG plus a letterboxed
/// 1080x1920 thumbnail. Missing backgrounds, icons, and fonts degrade
/// without failing; only output I/O errors propagate.
pub struct CardRenderer {
    backgrounds_dir: PathBuf,
    assets_dir: PathBuf,
    rows: Vec<WatermarkRow>,
    out: OutputPaths,
    fonts: FontBook,
}

impl CardRenderer {
    pub fn new(config: &Config) -> Self {
        let fonts = FontBook::load(&config.font_path(), &config.dirs.fonts());
        Self {
            backgrounds_dir: config.dirs.backgrounds(),
            assets_dir: config.dirs.assets(),
            rows: config.watermark_rows.clone(),
            out: config.output_paths(),
            fonts,
        }
    }

    pub fn output_paths(&self) -> &OutputPaths {
        &self.out
    }

    pub fn render(&self, quote: &str, rng: &mut impl Rng) -> QuotecardResult<CardArtifacts> {
        let background = self.load_background(rng);
        let rows: Vec<(Option<RgbaImage>, &str)> = self
            .rows
            .iter()
            .map(|row| {
                (
                    load_icon(&self.assets_dir.join(&row.icon)),
                    row.label.as_str(),
                )
            })
            .collect();

        let card = compose_card(quote, background.as_ref(), &rows, &self.fonts)?;
        let card_rgb = composite::flatten_over_black(&card);
        write_image(&card_rgb, &self.out.card)?;

        let thumb = build_thumbnail(&card_rgb);
        write_image(&thumb, &self.out.thumbnail)?;

        info!(
            card = %self.out.card.display(),
            thumbnail = %self.out.thumbnail.display(),
            "card written"
        );
        Ok(CardArtifacts {
            card: self.out.card.clone(),
            thumbnail: self.out.thumbnail.clone(),
        })
    }

    fn load_background(&self, rng: &mut impl Rng) -> Option<RgbaImage> {
        let path = assets::pick_asset(&self.backgrounds_dir, assets::IMAGE_EXTENSIONS, rng)?;
        match image::open(&path) {
            Ok(img) => Some(
                img.resize_exact(CARD_WIDTH, CARD_HEIGHT, FilterType::CatmullRom)
                    .to_rgba8(),
            ),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open background");
                None
            }
        }
    }
}

fn load_icon(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(img) => Some(
            img.resize_exact(ICON_SIZE, ICON_SIZE, FilterType::CatmullRom)
                .to_rgba8(),
        ),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "watermark icon unavailable");
            None
        }
    }
}

/// Builds the square composite. Layer order is part of the visual contract:
/// dimmed background over black, shadowed quote block, accent glyphs, then
/// the watermark overlay composited last.
pub fn compose_card(
    quote: &str,
    background: Option<&RgbaImage>,
    rows: &[(Option<RgbaImage>, &str)],
    fonts: &FontBook,
) -> QuotecardResult<RgbaImage> {
    let mut card = RgbaImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, Rgba([0, 0, 0, 255]));

    if let Some(bg) = background {
        let mut bg = bg.clone();
        composite::set_uniform_alpha(&mut bg, BACKGROUND_ALPHA);
        composite::composite_over(&mut card, &bg)?;
    }

    if let Some(font) = fonts.font() {
        let lines = text::wrap_text(quote, WRAP_COLUMNS);
        if !lines.is_empty() {
            let line_height = text::line_height(font, QUOTE_SIZE);
            let n = lines.len() as i64;
            let block_height = n * line_height + (n - 1) * LINE_SPACING;
            let mut y = (i64::from(CARD_HEIGHT) - block_height) / 2;

            for line in &lines {
                let w = text::text_width(font, QUOTE_SIZE, line);
                let x = (i64::from(CARD_WIDTH) - w) / 2;
                text::draw_text(
                    &mut card,
                    font,
                    QUOTE_SIZE,
                    x + SHADOW_OFFSET,
                    y + SHADOW_OFFSET,
                    SHADOW_COLOR,
                    line,
                );
                text::draw_text(&mut card, font, QUOTE_SIZE, x, y, TEXT_COLOR, line);
                y += line_height + LINE_SPACING;
            }
        }

        let accent_w = text::text_width(font, ACCENT_SIZE, ACCENT_GLYPHS);
        let accent_x = (i64::from(CARD_WIDTH) - accent_w) / 2;
        text::draw_text(
            &mut card,
            font,
            ACCENT_SIZE,
            accent_x,
            ACCENT_TOP_MARGIN,
            ACCENT_COLOR,
            ACCENT_GLYPHS,
        );
    } else {
        warn!("no font loaded, rendering card without text");
    }

    let mut overlay = RgbaImage::new(CARD_WIDTH, CARD_HEIGHT);
    for (i, (icon, label)) in rows.iter().enumerate() {
        let row_y = i64::from(CARD_HEIGHT)
            - FOOTER_SIZE as i64
            - FOOTER_BOTTOM_MARGIN
            + FOOTER_ROW_STEP * i as i64;
        let label_w = fonts
            .font()
            .map(|f| text::text_width(f, FOOTER_SIZE, label))
            .unwrap_or(0);
        let x = (i64::from(CARD_WIDTH) - (label_w + ICON_TEXT_GAP)) / 2;

        if let Some(icon) = icon {
            composite::blend_at(&mut overlay, icon, x, row_y - ICON_RAISE);
        }
        if let Some(font) = fonts.font() {
            text::draw_text(
                &mut overlay,
                font,
                FOOTER_SIZE,
                x + ICON_TEXT_GAP,
                row_y,
                FOOTER_COLOR,
                label,
            );
        }
    }
    composite::composite_over(&mut card, &overlay)?;

    Ok(card)
}

/// Letterboxes the square card onto a black 1080x1920 canvas, vertically
/// centered.
pub fn build_thumbnail(card: &RgbImage) -> RgbImage {
    let mut thumb = RgbImage::from_pixel(THUMB_WIDTH, THUMB_HEIGHT, Rgb([0, 0, 0]));
    let x = (THUMB_WIDTH - card.width()) / 2;
    let y = (THUMB_HEIGHT - card.height()) / 2;
    composite::paste_opaque(&mut thumb, card, x, y);
    thumb
}

fn write_image(img: &RgbImage, path: &Path) -> QuotecardResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save(path)
        .with_context(|| format!("write image '{}'", path.display()))?;
    Ok(())
}
