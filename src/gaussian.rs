use crate::{error::CoverResult, model::GaussianLayer, raster::Raster};

/// Render a radial-falloff blot. Intensity at row `i`, column `j` is
/// `amplitude * exp(-((j-cx)^2/(2*sx^2) + (i-cy)^2/(2*sy^2)))`, clamped to
/// [0, 255] and truncated.
///
/// Transparent blots are black with alpha `255 - intensity`, so the paint
/// is strongest at the center and fades out toward the edges; opaque blots
/// are grayscale at the intensity value.
pub fn render(layer: &GaussianLayer) -> CoverResult<Raster> {
    let w = layer.width;
    let h = layer.height;
    let cx = layer.center_x.unwrap_or(f64::from(w) * 0.5);
    let cy = layer.center_y.unwrap_or(f64::from(h) * 0.5);
    let sigma_x = layer.sigma_x.unwrap_or(f64::from(w) * 0.75);
    let sigma_y = layer.sigma_y.unwrap_or(f64::from(h) * 0.75);

    let dx = 2.0 * sigma_x * sigma_x;
    let dy = 2.0 * sigma_y * sigma_y;

    let mut out = Raster::new_transparent(w, h);
    for i in 0..h {
        for j in 0..w {
            let ex = (f64::from(j) - cx).powi(2) / dx;
            let ey = (f64::from(i) - cy).powi(2) / dy;
            let v = (layer.amplitude * (-(ex + ey)).exp()).clamp(0.0, 255.0) as u8;
            let px = if layer.transparent {
                [0, 0, 0, 255 - v]
            } else {
                [v, v, v, 255]
            };
            out.set_pixel(j, i, px);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Placement;

    fn blot(transparent: bool) -> GaussianLayer {
        GaussianLayer {
            width: 100,
            height: 100,
            amplitude: 255.0,
            center_x: None,
            center_y: None,
            sigma_x: Some(50.0),
            sigma_y: Some(50.0),
            transparent,
            placement: Placement::default(),
        }
    }

    #[test]
    fn transparent_blot_is_opaque_center_clear_corners() {
        let r = render(&blot(true)).unwrap();
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 100);

        let center = r.pixel(50, 50);
        assert_eq!(&center[..3], &[0, 0, 0]);
        assert!(center[3] <= 1, "center alpha {} should be ~0", center[3]);

        let corner = r.pixel(0, 0);
        assert!(corner[3] >= 150, "corner alpha {} should be high", corner[3]);
    }

    #[test]
    fn opaque_blot_is_grayscale() {
        let r = render(&blot(false)).unwrap();
        let center = r.pixel(50, 50);
        assert_eq!(center, [255, 255, 255, 255]);
        let corner = r.pixel(0, 0);
        assert_eq!(corner[0], corner[1]);
        assert_eq!(corner[1], corner[2]);
        assert_eq!(corner[3], 255);
        assert!(corner[0] < 120);
    }

    #[test]
    fn explicit_center_moves_the_peak() {
        let mut layer = blot(false);
        layer.center_x = Some(10.0);
        layer.center_y = Some(10.0);
        let r = render(&layer).unwrap();
        assert!(r.pixel(10, 10)[0] > r.pixel(90, 90)[0]);
    }

    #[test]
    fn sigma_defaults_follow_dimensions() {
        let mut layer = blot(true);
        layer.sigma_x = None;
        layer.sigma_y = None;
        // sigma = 75 spreads wider than sigma = 50, so corners hold more paint
        let wide = render(&layer).unwrap();
        let narrow = render(&blot(true)).unwrap();
        assert!(wide.pixel(0, 0)[3] < narrow.pixel(0, 0)[3]);
    }
}
