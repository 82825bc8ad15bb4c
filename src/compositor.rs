use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context as _;

use crate::{
    error::CoverResult,
    fx::apply_effects,
    geometry::{expand_border, trim},
    layer::{RenderContext, render_layer},
    model::Document,
    raster::Raster,
};

#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Also write each laid-out text raster into the output directory.
    pub dump_text_rasters: bool,
}

/// Render every layer of `doc` in document order onto a shared canvas,
/// writing each (possibly trimmed) layer raster as `NNN.png` and the
/// composed canvas as `final.png` under `out_dir`.
///
/// The first fatal error aborts the remaining layers; outputs already
/// written stay on disk. Returns the path of the final image.
pub fn render_document(
    doc: &Document,
    out_dir: &Path,
    opts: &RenderOptions,
) -> CoverResult<PathBuf> {
    doc.validate()?;
    let start = Instant::now();

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

    let bg = doc.background;
    let mut canvas = Raster::new(doc.width, doc.height, [bg.0, bg.1, bg.2, 255]);

    let ctx = RenderContext {
        resources_dir: &doc.resources_dir,
        text_dump_dir: opts.dump_text_rasters.then_some(out_dir),
    };

    for (idx, layer) in doc.layers.iter().enumerate() {
        tracing::info!(layer = idx, "rendering layer");

        let rendered = render_layer(layer, &ctx)?;
        let p = layer.placement();

        let bordered = expand_border(rendered, p.border_x, p.border_y)?;
        let fxed = apply_effects(bordered, &p.effects)?;

        // x/y position the content region, i.e. the raster minus its border
        let content_w = i64::from(fxed.width()) - 2 * i64::from(p.border_x);
        let content_h = i64::from(fxed.height()) - 2 * i64::from(p.border_y);
        let x = p
            .x
            .unwrap_or((i64::from(doc.width) - content_w) / 2);
        let y = p
            .y
            .unwrap_or((i64::from(doc.height) - content_h) / 2);

        let (trimmed, cx, cy) = trim(
            &fxed,
            x - i64::from(p.border_x),
            y - i64::from(p.border_y),
            doc.width,
            doc.height,
        )?;

        if trimmed.is_empty() {
            tracing::info!(layer = idx, "layer lies fully outside the canvas, skipping");
            continue;
        }

        tracing::debug!(
            layer = idx,
            width = trimmed.width(),
            height = trimmed.height(),
            x = cx,
            y = cy,
            "compositing"
        );

        canvas.paste_masked(&trimmed, i64::from(cx), i64::from(cy));

        let layer_path = out_dir.join(format!("{idx:03}.png"));
        trimmed
            .into_rgba8()?
            .save(&layer_path)
            .with_context(|| format!("write layer '{}'", layer_path.display()))?;
    }

    let final_path = out_dir.join("final.png");
    let rgb = image::DynamicImage::ImageRgba8(canvas.into_rgba8()?).to_rgb8();
    rgb.save(&final_path)
        .with_context(|| format!("write final '{}'", final_path.display()))?;

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        layers = doc.layers.len(),
        "document rendered"
    );

    Ok(final_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GaussianLayer, Layer, Placement, Rgb};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "coverlay_compositor_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn blot_layer(placement: Placement) -> Layer {
        Layer::Gaussian(GaussianLayer {
            width: 20,
            height: 10,
            amplitude: 255.0,
            center_x: None,
            center_y: None,
            sigma_x: Some(10.0),
            sigma_y: Some(5.0),
            transparent: false,
            placement,
        })
    }

    fn doc(layers: Vec<Layer>) -> Document {
        Document {
            resources_dir: PathBuf::from("."),
            width: 60,
            height: 40,
            background: Rgb::WHITE,
            layers,
        }
    }

    #[test]
    fn writes_layer_and_final_outputs() {
        let out = temp_dir("outputs");
        let final_path =
            render_document(&doc(vec![blot_layer(Placement::default())]), &out, &RenderOptions::default())
                .unwrap();

        assert_eq!(final_path, out.join("final.png"));
        assert!(out.join("000.png").is_file());

        let final_img = image::open(&final_path).unwrap().to_rgb8();
        assert_eq!(final_img.dimensions(), (60, 40));

        let _ = std::fs::remove_dir_all(&out);
    }

    #[test]
    fn default_placement_centers_content() {
        let out = temp_dir("centered");
        render_document(&doc(vec![blot_layer(Placement::default())]), &out, &RenderOptions::default())
            .unwrap();

        let final_img = image::open(out.join("final.png")).unwrap().to_rgb8();
        // 20x10 blot centered on 60x40: content occupies x 20..40, y 15..25.
        // The opaque blot is darkest at its corners, so probe one.
        assert_ne!(final_img.get_pixel(20, 15), &image::Rgb([255, 255, 255]));
        assert_eq!(final_img.get_pixel(10, 20), &image::Rgb([255, 255, 255]));
        assert_eq!(final_img.get_pixel(30, 5), &image::Rgb([255, 255, 255]));

        let _ = std::fs::remove_dir_all(&out);
    }

    #[test]
    fn fully_offscreen_layer_is_skipped_not_fatal() {
        let out = temp_dir("offscreen");
        let placement = Placement {
            x: Some(500),
            y: Some(500),
            ..Placement::default()
        };
        render_document(&doc(vec![blot_layer(placement)]), &out, &RenderOptions::default())
            .unwrap();

        assert!(!out.join("000.png").exists());
        let final_img = image::open(out.join("final.png")).unwrap().to_rgb8();
        assert!(final_img.pixels().all(|p| p == &image::Rgb([255, 255, 255])));

        let _ = std::fs::remove_dir_all(&out);
    }

    #[test]
    fn negative_placement_trims_and_clamps() {
        let out = temp_dir("negative");
        let placement = Placement {
            x: Some(-10),
            y: Some(-3),
            ..Placement::default()
        };
        render_document(&doc(vec![blot_layer(placement)]), &out, &RenderOptions::default())
            .unwrap();

        let layer_img = image::open(out.join("000.png")).unwrap().to_rgba8();
        assert_eq!(layer_img.dimensions(), (10, 7));

        let _ = std::fs::remove_dir_all(&out);
    }

    #[test]
    fn earlier_outputs_survive_a_later_fatal_layer() {
        let out = temp_dir("partial");
        let bad = Layer::Image(crate::model::ImageLayer {
            filename: "missing.png".to_string(),
            placement: Placement::default(),
        });
        let err = render_document(
            &doc(vec![blot_layer(Placement::default()), bad]),
            &out,
            &RenderOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, crate::error::CoverError::ResourceNotFound { .. }));
        assert!(out.join("000.png").is_file());
        assert!(!out.join("final.png").exists());

        let _ = std::fs::remove_dir_all(&out);
    }
}
