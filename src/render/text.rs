//! Text rasterisation with an embedded TrueType face
//!
//! Labels are laid out with rusttype and drawn by imageproc into a small
//! transparent buffer, which the figure composites onto its pixmap. The face
//! is compiled into the binary, so frames do not depend on installed fonts.

use crate::errors::{Result, SliceVisError};
use crate::render::colormap::Rgb;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tiny_skia::{IntSize, Pixmap};

/// Embedded font data - DejaVu Sans
const FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Height of capitals as a fraction of the font size
const CAP_HEIGHT_EM: f32 = 0.73;

/// Margin around rasterised text, in pixels
pub const PAD: u32 = 1;

/// The face all figure text is set in
#[derive(Clone)]
pub struct Typeface {
    font: Font<'static>,
}

impl Typeface {
    /// Loads the embedded face.
    ///
    /// # Errors
    ///
    /// Returns [`SliceVisError::RenderBackend`] if the font data cannot be parsed.
    pub fn embedded() -> Result<Self> {
        Font::try_from_bytes(FONT_DATA)
            .map(|font| Self { font })
            .ok_or_else(|| SliceVisError::RenderBackend("embedded font could not be parsed".to_string()))
    }

    /// Advance width of `text` in pixels at font size `px`
    pub fn width(&self, text: &str, px: f32) -> f32 {
        self.font
            .layout(text, Scale::uniform(px), point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    /// Offset from the top of a line to the middle of its capitals
    pub fn cap_middle(&self, px: f32) -> f32 {
        self.font.v_metrics(Scale::uniform(px)).ascent - CAP_HEIGHT_EM * px / 2.0
    }

    /// One line of `text` in `color` on a transparent buffer whose top-left
    /// corner sits `PAD` pixels above and left of the line's origin.
    ///
    /// Returns `None` for blank text.
    pub fn rasterize(&self, text: &str, px: f32, color: Rgb) -> Option<Pixmap> {
        if text.trim().is_empty() {
            return None;
        }

        let scale = Scale::uniform(px);
        let metrics = self.font.v_metrics(scale);
        let width = self.width(text, px).ceil() as u32 + 2 * PAD;
        let height = (metrics.ascent - metrics.descent).ceil() as u32 + 2 * PAD;

        let [r, g, b] = color;
        let mut canvas: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        // coverage blended onto transparent black is premultiplied RGBA
        draw_text_mut(
            &mut canvas,
            Rgba([r, g, b, 255]),
            PAD as i32,
            PAD as i32,
            scale,
            &self.font,
            text,
        );

        Pixmap::from_vec(canvas.into_raw(), IntSize::from_wh(width, height)?)
    }
}
