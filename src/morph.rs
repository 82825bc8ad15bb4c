use crate::{
    error::{CoverError, CoverResult},
    raster::Raster,
};

const EDGE_THRESHOLD: f64 = 128.0;

/// Alpha-weighted luma plane. For layers drawn on a transparent field the
/// silhouette lives in the alpha channel, so weighting by alpha makes the
/// edge detector see the shape outline rather than the fill color.
pub fn intensity_plane(r: &Raster) -> Vec<u8> {
    let mut out = Vec::with_capacity((r.width() as usize) * (r.height() as usize));
    for px in r.data().chunks_exact(4) {
        let luma =
            0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2]);
        out.push(((luma * f64::from(px[3])) / 255.0).round().min(255.0) as u8);
    }
    out
}

/// Binary edge mask (0 or 255) from Sobel gradient magnitude.
pub fn edge_mask(plane: &[u8], width: u32, height: u32) -> Vec<u8> {
    let w = width as i32;
    let h = height as i32;
    let at = |x: i32, y: i32| -> i32 {
        let x = x.clamp(0, w - 1);
        let y = y.clamp(0, h - 1);
        i32::from(plane[(y * w + x) as usize])
    };

    let mut out = vec![0u8; plane.len()];
    for y in 0..h {
        for x in 0..w {
            let gx = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
            let gy = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));
            let mag = f64::from(gx * gx + gy * gy).sqrt();
            if mag >= EDGE_THRESHOLD {
                out[(y * w + x) as usize] = 255;
            }
        }
    }
    out
}

/// Grayscale dilation by an elliptical structuring element `size` pixels
/// across (anchor at the center).
pub fn dilate(plane: &[u8], width: u32, height: u32, size: u32) -> CoverResult<Vec<u8>> {
    if size == 0 {
        return Err(CoverError::geometry(
            "dilate structuring element size must be > 0",
        ));
    }
    if size == 1 || plane.is_empty() {
        return Ok(plane.to_vec());
    }

    let offsets = ellipse_offsets(size);
    let w = width as i32;
    let h = height as i32;

    let mut out = vec![0u8; plane.len()];
    for y in 0..h {
        for x in 0..w {
            let mut best = 0u8;
            for &(dx, dy) in &offsets {
                let sx = x + dx;
                let sy = y + dy;
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                best = best.max(plane[(sy * w + sx) as usize]);
                if best == 255 {
                    break;
                }
            }
            out[(y * w + x) as usize] = best;
        }
    }
    Ok(out)
}

fn ellipse_offsets(size: u32) -> Vec<(i32, i32)> {
    let c = (size as f64 - 1.0) / 2.0;
    let r = size as f64 / 2.0;
    let mut offsets = Vec::new();
    for dy in 0..size as i32 {
        for dx in 0..size as i32 {
            let nx = (f64::from(dx) - c) / r;
            let ny = (f64::from(dy) - c) / r;
            if nx * nx + ny * ny <= 1.0 {
                offsets.push((dx - c.round() as i32, dy - c.round() as i32));
            }
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_weights_by_alpha() {
        let mut r = Raster::new_transparent(2, 1);
        r.set_pixel(0, 0, [255, 255, 255, 255]);
        r.set_pixel(1, 0, [255, 255, 255, 0]);
        let plane = intensity_plane(&r);
        assert_eq!(plane[0], 255);
        assert_eq!(plane[1], 0);
    }

    #[test]
    fn edge_mask_fires_on_step_edge() {
        let (w, h) = (6u32, 3u32);
        let mut plane = vec![0u8; (w * h) as usize];
        for y in 0..h {
            for x in 3..w {
                plane[(y * w + x) as usize] = 255;
            }
        }
        let edges = edge_mask(&plane, w, h);
        assert_eq!(edges[(w + 3) as usize], 255);
        assert_eq!(edges[w as usize], 0);
    }

    #[test]
    fn edge_mask_is_quiet_on_flat_field() {
        let plane = vec![200u8; 5 * 5];
        assert!(edge_mask(&plane, 5, 5).iter().all(|&v| v == 0));
    }

    #[test]
    fn dilate_grows_single_pixel() {
        let (w, h) = (7u32, 7u32);
        let mut plane = vec![0u8; (w * h) as usize];
        plane[(3 * w + 3) as usize] = 255;

        let out = dilate(&plane, w, h, 3).unwrap();
        assert_eq!(out[(3 * w + 3) as usize], 255);
        assert_eq!(out[(3 * w + 2) as usize], 255);
        assert_eq!(out[(2 * w + 3) as usize], 255);
        assert_eq!(out[0], 0);
    }

    #[test]
    fn dilate_size_1_is_identity() {
        let plane = vec![0u8, 255, 0, 0];
        assert_eq!(dilate(&plane, 2, 2, 1).unwrap(), plane);
    }

    #[test]
    fn dilate_size_0_is_rejected() {
        assert!(dilate(&[0u8; 4], 2, 2, 0).is_err());
    }
}
