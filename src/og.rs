//! Open Graph card composition.
//!
//! Renders the fixed 1200×630 social preview card: a dark background with
//! an accent gradient toward the top-right corner, an optional site label
//! row, a large title block, and an optional muted description block.
//!
//! The renderer is constructed once from the resolved font bytes (see
//! [`crate::font::resolver`]) and is stateless per render, so pages can be
//! rendered concurrently from the same instance.
//!
//! Text layout is deliberately simple: greedy word wrap against the content
//! width, one style per block. This is a preview card, not a typesetting
//! engine.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Output dimensions required by the Open Graph consumers.
pub const OG_WIDTH: u32 = 1200;
pub const OG_HEIGHT: u32 = 630;

const PADDING: f32 = 64.0;
const SITE_PX: f32 = 56.0;
const TITLE_PX: f32 = 82.0;
const DESC_PX: f32 = 52.0;
/// Vertical gap between the site label row and the title.
const SITE_GAP: f32 = 12.0;
/// Peak opacity of the accent gradient, fading to transparent at top-right.
const GRADIENT_ALPHA: f32 = 0.3;

#[derive(Error, Debug)]
pub enum OgError {
    #[error("font unusable for rendering: {0}")]
    FontUnusable(String),
    #[error("PNG encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Everything the card displays for one page.
#[derive(Debug, Clone)]
pub struct Card {
    pub title: String,
    pub description: Option<String>,
    pub site: Option<String>,
}

/// Card colors, filled in from `[colors]` in config.toml.
#[derive(Debug, Clone, Copy)]
pub struct CardStyle {
    pub background: Rgba<u8>,
    pub accent: Rgba<u8>,
    pub title: Rgba<u8>,
    pub description: Rgba<u8>,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            background: Rgba([0x0c, 0x0c, 0x0c, 0xff]),
            accent: Rgba([0xff, 0x96, 0xff, 0xff]),
            title: Rgba([0xff, 0xff, 0xff, 0xff]),
            description: Rgba([0xf0, 0xf0, 0xf0, 0xcc]),
        }
    }
}

/// Renders OG cards with a single resolved font.
pub struct OgRenderer {
    font: fontdue::Font,
    style: CardStyle,
}

impl OgRenderer {
    /// Parses the resolved font bytes once for the life of the renderer.
    ///
    /// # Errors
    ///
    /// [`OgError::FontUnusable`] if the bytes do not parse as a font. The
    /// resolution pipeline validates its output with the same parser, so in
    /// practice this only fires if the renderer is handed unresolved bytes.
    pub fn new(font_bytes: &[u8], style: CardStyle) -> Result<Self, OgError> {
        let font = fontdue::Font::from_bytes(font_bytes, fontdue::FontSettings::default())
            .map_err(|e| OgError::FontUnusable(e.to_string()))?;
        Ok(Self { font, style })
    }

    /// Composites the card onto a fresh 1200×630 canvas.
    pub fn render(&self, card: &Card) -> RgbaImage {
        let mut canvas = RgbaImage::new(OG_WIDTH, OG_HEIGHT);
        self.paint_gradient(&mut canvas);

        let max_width = OG_WIDTH as f32 - 2.0 * PADDING;
        let mut y = PADDING;

        if let Some(site) = &card.site {
            y = self.draw_block(&mut canvas, site, SITE_PX, self.style.accent, y, max_width);
            y += SITE_GAP;
        }

        y = self.draw_block(&mut canvas, &card.title, TITLE_PX, self.style.title, y, max_width);

        if let Some(description) = &card.description {
            self.draw_block(
                &mut canvas,
                description,
                DESC_PX,
                self.style.description,
                y,
                max_width,
            );
        }

        canvas
    }

    /// Renders and PNG-encodes in one step.
    pub fn render_png(&self, card: &Card) -> Result<Vec<u8>, OgError> {
        let canvas = self.render(card);
        let mut encoded = Vec::new();
        DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;
        Ok(encoded)
    }

    /// Background fill plus the accent gradient: full strength at the
    /// bottom-left corner, transparent at the top-right.
    fn paint_gradient(&self, canvas: &mut RgbaImage) {
        let [br, bg, bb, _] = self.style.background.0;
        let [ar, ag, ab, _] = self.style.accent.0;
        let (w, h) = (OG_WIDTH as f32, OG_HEIGHT as f32);

        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            let progress = (x as f32 / w + (h - y as f32) / h) / 2.0;
            let alpha = GRADIENT_ALPHA * (1.0 - progress);
            let blend = |accent: u8, base: u8| -> u8 {
                (accent as f32 * alpha + base as f32 * (1.0 - alpha)).round() as u8
            };
            *pixel = Rgba([blend(ar, br), blend(ag, bg), blend(ab, bb), 0xff]);
        }
    }

    /// Draws one word-wrapped text block starting at `y_top`; returns the y
    /// coordinate just below the block.
    fn draw_block(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        px: f32,
        color: Rgba<u8>,
        y_top: f32,
        max_width: f32,
    ) -> f32 {
        let Some(line_metrics) = self.font.horizontal_line_metrics(px) else {
            return y_top;
        };
        let line_height = line_metrics.new_line_size;

        let lines = self.wrap(text, px, max_width);
        for (i, line) in lines.iter().enumerate() {
            let baseline = y_top + line_metrics.ascent + i as f32 * line_height;
            if baseline > OG_HEIGHT as f32 {
                break;
            }
            self.draw_line(canvas, line, px, color, PADDING, baseline);
        }

        y_top + lines.len() as f32 * line_height
    }

    /// Greedy word wrap by advance width. A single word wider than the
    /// content width gets its own (overflowing, clipped) line.
    fn wrap(&self, text: &str, px: f32, max_width: f32) -> Vec<String> {
        let space_width = self.font.metrics(' ', px).advance_width;
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in text.split_whitespace() {
            let word_width: f32 = word
                .chars()
                .map(|c| self.font.metrics(c, px).advance_width)
                .sum();

            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + space_width + word_width
            };

            if needed > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
                current_width = word_width;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width = needed;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        line: &str,
        px: f32,
        color: Rgba<u8>,
        x_start: f32,
        baseline: f32,
    ) {
        let mut pen_x = x_start;
        for c in line.chars() {
            let (metrics, coverage) = self.font.rasterize(c, px);
            let glyph_x = pen_x + metrics.xmin as f32;
            let glyph_y = baseline - (metrics.height as i32 + metrics.ymin) as f32;

            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let alpha = coverage[row * metrics.width + col];
                    if alpha == 0 {
                        continue;
                    }
                    let x = glyph_x + col as f32;
                    let y = glyph_y + row as f32;
                    if x < 0.0 || y < 0.0 || x >= OG_WIDTH as f32 || y >= OG_HEIGHT as f32 {
                        continue;
                    }
                    blend_pixel(canvas.get_pixel_mut(x as u32, y as u32), color, alpha);
                }
            }
            pen_x += metrics.advance_width;
        }
    }
}

/// Source-over blend of `color` at `coverage` onto an opaque destination.
fn blend_pixel(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: u8) {
    let alpha = (coverage as f32 / 255.0) * (color.0[3] as f32 / 255.0);
    for i in 0..3 {
        let src = color.0[i] as f32;
        let bg = dst.0[i] as f32;
        dst.0[i] = (src * alpha + bg * (1.0 - alpha)).round() as u8;
    }
    dst.0[3] = 0xff;
}
