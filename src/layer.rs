use std::path::Path;

use anyhow::Context as _;

use crate::{
    error::{CoverError, CoverResult},
    font::FontdueSource,
    gaussian,
    model::Layer,
    raster::Raster,
    text,
};

#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    pub resources_dir: &'a Path,
    /// Write intermediate text rasters here when set.
    pub text_dump_dir: Option<&'a Path>,
}

/// Render one layer to a raster. Image inputs without an alpha channel are
/// promoted to fully opaque RGBA.
pub fn render_layer(layer: &Layer, ctx: &RenderContext) -> CoverResult<Raster> {
    match layer {
        Layer::Image(l) => {
            let path = ctx.resources_dir.join(&l.filename);
            if !path.is_file() {
                return Err(CoverError::resource(path));
            }
            let img = image::open(&path)
                .with_context(|| format!("decode image '{}'", path.display()))?;
            Ok(Raster::from_rgba8(img.to_rgba8()))
        }
        Layer::Gaussian(l) => gaussian::render(l),
        Layer::Text(l) => {
            let path = ctx.resources_dir.join(&l.font);
            if !path.is_file() {
                return Err(CoverError::resource(path));
            }
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read font '{}'", path.display()))?;
            let source = FontdueSource::new(&bytes, l.size)?;
            text::layout_text(&source, &l.text, l.color, l.kern_add, ctx.text_dump_dir)
        }
    }
}
