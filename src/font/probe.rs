//! Trial-render validation of candidate font bytes.
//!
//! The [`RenderProbe`] trait is the seam between the resolution pipeline and
//! the image renderer: "prove these bytes render" without caring how. The
//! production implementation is [`TrialRender`] — parse the candidate with
//! the same rasterizer the OG renderer uses, rasterize a glyph, and force a
//! 1×1 PNG encode so every stage of the render path actually executes.
//!
//! Tests swap in [`tests::MockProbe`] to count invocations and force
//! rejections without touching real font data.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("trial render rejected font: {0}")]
    Rejected(String),
}

/// Validates that a byte buffer is usable as font data by the renderer.
pub trait RenderProbe: Send + Sync {
    fn validate(&self, font_bytes: &[u8]) -> Result<(), ProbeError>;
}

/// Production probe: a minimal end-to-end render with the candidate bytes
/// declared as the only font resource.
pub struct TrialRender;

impl RenderProbe for TrialRender {
    fn validate(&self, font_bytes: &[u8]) -> Result<(), ProbeError> {
        let font = fontdue::Font::from_bytes(font_bytes, fontdue::FontSettings::default())
            .map_err(|e| ProbeError::Rejected(e.to_string()))?;

        // Line metrics are required by the layout code; a font without
        // horizontal metrics would only fail later, so reject it here.
        font.horizontal_line_metrics(16.0)
            .ok_or_else(|| ProbeError::Rejected("no horizontal line metrics".to_string()))?;

        // Rasterize one glyph and force evaluation of the output bytes.
        let (_, coverage) = font.rasterize('A', 16.0);
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        if let Some(&alpha) = coverage.first() {
            canvas.get_pixel_mut(0, 0).0[0] = alpha;
        }
        let mut encoded = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|e| ProbeError::Rejected(e.to_string()))?;

        Ok(())
    }
}
