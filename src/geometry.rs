use crate::{error::CoverResult, raster::Raster};

/// Pad a raster with a transparent margin of `border_x` / `border_y` pixels
/// on each side; the source ends up in the centered window.
pub fn expand_border(src: Raster, border_x: u32, border_y: u32) -> CoverResult<Raster> {
    if border_x == 0 && border_y == 0 {
        return Ok(src);
    }
    let mut out = Raster::new_transparent(src.width() + 2 * border_x, src.height() + 2 * border_y);
    out.copy_from(&src, border_x, border_y)?;
    Ok(out)
}

/// Clip a raster, placed with its top-left at (x, y), to the canvas.
///
/// Returns the overlapping sub-rectangle and the clamped placement; the
/// placement is always within bounds and the clipped raster always fits on
/// the canvas. A layer fully outside yields a zero-area raster, which the
/// caller treats as nothing to composite.
pub fn trim(
    src: &Raster,
    x: i64,
    y: i64,
    canvas_w: u32,
    canvas_h: u32,
) -> CoverResult<(Raster, u32, u32)> {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(src.width())).min(i64::from(canvas_w));
    let y1 = (y + i64::from(src.height())).min(i64::from(canvas_h));

    if x1 <= x0 || y1 <= y0 {
        let cx = x0.min(i64::from(canvas_w)) as u32;
        let cy = y0.min(i64::from(canvas_h)) as u32;
        return Ok((Raster::new_transparent(0, 0), cx, cy));
    }

    let cropped = src.crop(
        (x0 - x) as u32,
        (y0 - y) as u32,
        (x1 - x0) as u32,
        (y1 - y0) as u32,
    )?;
    Ok((cropped, x0 as u32, y0 as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(w: u32, h: u32) -> Raster {
        let mut r = Raster::new_transparent(w, h);
        for y in 0..h {
            for x in 0..w {
                r.set_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, 7, 255]);
            }
        }
        r
    }

    #[test]
    fn expand_border_centers_content() {
        let src = stamp(3, 2);
        let out = expand_border(src.clone(), 2, 1).unwrap();
        assert_eq!(out.width(), 7);
        assert_eq!(out.height(), 4);
        assert_eq!(out.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(out.pixel(2, 1), src.pixel(0, 0));
        assert_eq!(out.pixel(4, 2), src.pixel(2, 1));
    }

    #[test]
    fn expand_border_zero_is_identity() {
        let src = stamp(3, 3);
        assert_eq!(expand_border(src.clone(), 0, 0).unwrap(), src);
    }

    #[test]
    fn border_round_trip_restores_original() {
        let src = stamp(5, 4);
        let padded = expand_border(src.clone(), 3, 2).unwrap();
        // padded placed so that content sits back at (10, 10) on a roomy canvas
        let (trimmed, x, y) = trim(&padded, 10 - 3, 10 - 2, 100, 100).unwrap();
        assert_eq!(x, 7);
        assert_eq!(y, 8);
        let content = trimmed.crop(3, 2, 5, 4).unwrap();
        assert_eq!(content, src);
    }

    #[test]
    fn trim_inside_canvas_is_identity() {
        let src = stamp(4, 4);
        let (out, x, y) = trim(&src, 2, 3, 10, 10).unwrap();
        assert_eq!((x, y), (2, 3));
        assert_eq!(out, src);
    }

    #[test]
    fn trim_clamps_negative_placement() {
        let src = stamp(6, 5);
        let (out, x, y) = trim(&src, -2, -1, 10, 10).unwrap();
        assert_eq!((x, y), (0, 0));
        assert_eq!(out.width(), 4);
        assert_eq!(out.height(), 4);
        assert_eq!(out.pixel(0, 0), src.pixel(2, 1));
    }

    #[test]
    fn trim_clips_overflow_past_canvas_edge() {
        let src = stamp(8, 8);
        let (out, x, y) = trim(&src, 6, 7, 10, 10).unwrap();
        assert_eq!((x, y), (6, 7));
        assert_eq!(out.width(), 4);
        assert_eq!(out.height(), 3);
        assert!(x + out.width() <= 10);
        assert!(y + out.height() <= 10);
    }

    #[test]
    fn trim_never_exceeds_canvas() {
        let src = stamp(30, 30);
        let (out, x, y) = trim(&src, -5, -5, 10, 10).unwrap();
        assert_eq!((x, y), (0, 0));
        assert_eq!((out.width(), out.height()), (10, 10));
    }

    #[test]
    fn fully_outside_layer_is_zero_area() {
        let src = stamp(4, 4);
        let (out, _, _) = trim(&src, 50, 50, 10, 10).unwrap();
        assert!(out.is_empty());
        let (out, _, _) = trim(&src, -20, 2, 10, 10).unwrap();
        assert!(out.is_empty());
    }
}
