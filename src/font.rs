use crate::{
    error::{CoverError, CoverResult},
    model::Rgba,
    raster::{Raster, over_straight},
};

/// String-level metrics, PIL-compatible: the pen starts at x = 0 with the
/// line top at y = 0 and the baseline at the font ascent.
///
/// `width` is the rightmost ink x, `offset_x` the leftmost ink x (negative
/// when the first glyph overhangs the origin), `height` the bottommost ink
/// y and `offset_y` the topmost ink y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metrics {
    pub width: i32,
    pub height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Glyph metrics provider and rasterizer. The text layout only ever calls
/// `measure` with one- and two-character strings.
pub trait GlyphSource {
    fn measure(&self, text: &str) -> CoverResult<Metrics>;

    /// Draw one glyph with its intrinsic bearings, relative to pen position
    /// `x` and line top `y`. Pixels falling outside `dst` are dropped.
    fn rasterize(&self, ch: char, color: Rgba, dst: &mut Raster, x: i64, y: i64)
    -> CoverResult<()>;
}

pub struct FontdueSource {
    font: fontdue::Font,
    px: f32,
    ascent: f32,
}

impl FontdueSource {
    pub fn new(bytes: &[u8], px: f32) -> CoverResult<Self> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| CoverError::document(format!("failed to parse font: {e}")))?;
        let ascent = font
            .horizontal_line_metrics(px)
            .ok_or_else(|| CoverError::document("font has no horizontal line metrics"))?
            .ascent;
        Ok(Self { font, px, ascent })
    }
}

impl GlyphSource for FontdueSource {
    fn measure(&self, text: &str) -> CoverResult<Metrics> {
        if text.is_empty() {
            return Err(CoverError::document("cannot measure empty text"));
        }

        let mut pen = 0.0f32;
        let mut prev: Option<char> = None;
        let mut ink: Option<(f32, f32, f32, f32)> = None; // left, right, top, bottom

        for ch in text.chars() {
            if let Some(p) = prev {
                pen += self.font.horizontal_kern(p, ch, self.px).unwrap_or(0.0);
            }
            let m = self.font.metrics(ch, self.px);
            if m.width > 0 && m.height > 0 {
                let left = pen + m.xmin as f32;
                let right = left + m.width as f32;
                let top = self.ascent - (m.ymin + m.height as i32) as f32;
                let bottom = self.ascent - m.ymin as f32;
                ink = Some(match ink {
                    None => (left, right, top, bottom),
                    Some((l, r, t, b)) => (l.min(left), r.max(right), t.min(top), b.max(bottom)),
                });
            }
            pen += m.advance_width;
            prev = Some(ch);
        }

        Ok(match ink {
            Some((left, right, top, bottom)) => Metrics {
                width: right.round() as i32,
                height: bottom.round() as i32,
                offset_x: left.round() as i32,
                offset_y: top.round() as i32,
            },
            // Whitespace-only: no ink, only advance.
            None => Metrics {
                width: pen.round() as i32,
                height: 0,
                offset_x: 0,
                offset_y: 0,
            },
        })
    }

    fn rasterize(
        &self,
        ch: char,
        color: Rgba,
        dst: &mut Raster,
        x: i64,
        y: i64,
    ) -> CoverResult<()> {
        let (m, coverage) = self.font.rasterize(ch, self.px);
        if m.width == 0 || m.height == 0 {
            return Ok(());
        }

        let gx = x + i64::from(m.xmin);
        let gy = y + (self.ascent - (m.ymin + m.height as i32) as f32).round() as i64;

        for row in 0..m.height {
            for col in 0..m.width {
                let cov = coverage[row * m.width + col];
                if cov == 0 {
                    continue;
                }
                let px = gx + col as i64;
                let py = gy + row as i64;
                if px < 0 || py < 0 || px >= i64::from(dst.width()) || py >= i64::from(dst.height())
                {
                    continue;
                }
                let alpha = ((u16::from(cov) * u16::from(color.3)) / 255) as u8;
                let src = [color.0, color.1, color.2, alpha];
                let blended = over_straight(dst.pixel(px as u32, py as u32), src);
                dst.set_pixel(px as u32, py as u32, blended);
            }
        }
        Ok(())
    }
}
