use crate::error::{CoverError, CoverResult};

/// Owned straight-alpha RGBA8 pixel buffer, row-major, tightly packed.
///
/// Every pipeline stage consumes or exclusively mutates its raster; buffers
/// are never shared across stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, fill: [u8; 4]) -> Self {
        let px_count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(px_count * 4);
        for _ in 0..px_count {
            data.extend_from_slice(&fill);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn new_transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, [0, 0, 0, 0])
    }

    pub fn from_rgba8(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    pub fn into_rgba8(self) -> CoverResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| CoverError::geometry("raster buffer does not match its dimensions"))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn idx(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.idx(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = self.idx(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Extract the sub-rectangle at (x0, y0) with the given dimensions.
    /// The rectangle must lie within bounds.
    pub fn crop(&self, x0: u32, y0: u32, width: u32, height: u32) -> CoverResult<Raster> {
        if x0 + width > self.width || y0 + height > self.height {
            return Err(CoverError::geometry(format!(
                "crop {width}x{height}+{x0}+{y0} exceeds raster {}x{}",
                self.width, self.height
            )));
        }
        let mut out = Raster::new_transparent(width, height);
        for y in 0..height {
            let src = self.idx(x0, y0 + y);
            let dst = out.idx(0, y);
            out.data[dst..dst + (width as usize) * 4]
                .copy_from_slice(&self.data[src..src + (width as usize) * 4]);
        }
        Ok(out)
    }

    /// Overwrite a window of `self` with `src`, no blending. The window must
    /// lie within bounds.
    pub fn copy_from(&mut self, src: &Raster, x0: u32, y0: u32) -> CoverResult<()> {
        if x0 + src.width > self.width || y0 + src.height > self.height {
            return Err(CoverError::geometry(format!(
                "copy of {}x{} at +{x0}+{y0} exceeds raster {}x{}",
                src.width, src.height, self.width, self.height
            )));
        }
        for y in 0..src.height {
            let s = src.idx(0, y);
            let d = self.idx(x0, y0 + y);
            self.data[d..d + (src.width as usize) * 4]
                .copy_from_slice(&src.data[s..s + (src.width as usize) * 4]);
        }
        Ok(())
    }

    /// Mirror rows top-to-bottom in place.
    pub fn flip_ud(mut self) -> Raster {
        let row_len = (self.width as usize) * 4;
        let h = self.height as usize;
        for y in 0..h / 2 {
            let (top, bottom) = self.data.split_at_mut((h - 1 - y) * row_len);
            top[y * row_len..y * row_len + row_len]
                .swap_with_slice(&mut bottom[..row_len]);
        }
        self
    }

    /// Per-channel linear interpolation from `a` (t = 0) to `b` (t = 1).
    /// The rasters must have identical dimensions.
    pub fn blend(a: &Raster, b: &Raster, t: f64) -> CoverResult<Raster> {
        if a.width != b.width || a.height != b.height {
            return Err(CoverError::geometry(format!(
                "blend requires equal dimensions ({}x{} vs {}x{})",
                a.width, a.height, b.width, b.height
            )));
        }
        let t = t.clamp(0.0, 1.0);
        let tt = ((t * 255.0).round() as i32).clamp(0, 255) as u16;
        let it = 255u16 - tt;

        let mut out = Raster::new_transparent(a.width, a.height);
        for ((o, av), bv) in out
            .data
            .chunks_exact_mut(4)
            .zip(a.data.chunks_exact(4))
            .zip(b.data.chunks_exact(4))
        {
            for c in 0..4 {
                let lo = mul_div255(u16::from(av[c]), it);
                let hi = mul_div255(u16::from(bv[c]), tt);
                o[c] = lo.saturating_add(hi);
            }
        }
        Ok(out)
    }

    /// Paste `src` at (x, y) using `src`'s own alpha as the mask: every
    /// channel of the destination, alpha included, moves toward `src` in
    /// proportion to the mask. Regions of `src` outside `self` are clipped.
    pub fn paste_masked(&mut self, src: &Raster, x: i64, y: i64) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(src.width)).min(i64::from(self.width));
        let y1 = (y + i64::from(src.height)).min(i64::from(self.height));
        if x1 <= x0 || y1 <= y0 {
            return;
        }

        for dy in y0..y1 {
            for dx in x0..x1 {
                let sp = src.pixel((dx - x) as u32, (dy - y) as u32);
                let m = u16::from(sp[3]);
                if m == 0 {
                    continue;
                }
                let inv = 255u16 - m;
                let i = self.idx(dx as u32, dy as u32);
                for c in 0..4 {
                    let sv = mul_div255(u16::from(sp[c]), m);
                    let dv = mul_div255(u16::from(self.data[i + c]), inv);
                    self.data[i + c] = sv.saturating_add(dv);
                }
            }
        }
    }

    /// The alpha channel as a separate plane.
    pub fn alpha_plane(&self) -> Vec<u8> {
        self.data.chunks_exact(4).map(|px| px[3]).collect()
    }
}

/// Straight-alpha source-over for a single pixel. Used when glyphs overlap
/// under negative kerning.
pub fn over_straight(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let da = u32::from(dst[3]);
    let out_a = sa * 255 + da * (255 - sa); // scaled by 255
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let sc = u32::from(src[c]);
        let dc = u32::from(dst[c]);
        let num = sc * sa * 255 + dc * da * (255 - sa);
        out[c] = ((num + out_a / 2) / out_a) as u8;
    }
    out[3] = ((out_a + 127) / 255) as u8;
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
