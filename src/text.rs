use std::path::Path;

use anyhow::Context as _;

use crate::{
    error::{CoverError, CoverResult},
    font::GlyphSource,
    model::Rgba,
    raster::Raster,
};

/// Lay out `text` with the font's own pair kerning plus a uniform
/// `kern_add` pixels between consecutive glyphs, and render it into the
/// smallest raster that holds the ink.
///
/// Pair kerning is reconstructed from individual and two-character
/// metrics: the effective advance of character `i` is the horizontal space
/// it must occupy so that character `i + 1`, drawn immediately after, lands
/// where the font's pairwise layout would put it. This assumes metrics are
/// additive across substrings of length <= 2; fonts with contextual
/// shaping beyond simple pair kerning are outside this model.
///
/// When `dump_dir` is set, the laid-out raster is also written there as a
/// PNG for inspection.
pub fn layout_text(
    source: &dyn GlyphSource,
    text: &str,
    color: Rgba,
    kern_add: i32,
    dump_dir: Option<&Path>,
) -> CoverResult<Raster> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    if n == 0 {
        return Err(CoverError::document("cannot lay out empty text"));
    }

    let mut singles = Vec::with_capacity(n);
    for &ch in &chars {
        singles.push(source.measure(&ch.to_string())?);
    }

    let mut advances = Vec::with_capacity(n);
    for i in 0..n - 1 {
        let mut pair = String::with_capacity(8);
        pair.push(chars[i]);
        pair.push(chars[i + 1]);
        let pm = source.measure(&pair)?;
        let next = &singles[i + 1];
        advances.push((pm.width + pm.offset_x) - (next.width + next.offset_x));
    }
    let last = &singles[n - 1];
    advances.push(last.width + last.offset_x);

    let offset_x_first = singles[0].offset_x;
    let width = advances.iter().sum::<i32>() - offset_x_first
        + (n as i32 - 1) * kern_add;
    let height = singles.iter().map(|m| m.height).max().unwrap_or(0);

    if width <= 0 || height <= 0 {
        return Err(CoverError::geometry(format!(
            "text '{text}' lays out to a non-positive raster ({width}x{height})"
        )));
    }

    tracing::debug!(text, width, height, kern_add, "text layout");

    let mut raster = Raster::new_transparent(width as u32, height as u32);
    let mut cursor = i64::from(0 - offset_x_first);
    for (i, &ch) in chars.iter().enumerate() {
        source.rasterize(ch, color, &mut raster, cursor, 0)?;
        cursor += i64::from(advances[i] + kern_add);
    }

    if let Some(dir) = dump_dir {
        let path = dir.join(format!("text_{}.png", sanitize(text)));
        raster
            .clone()
            .into_rgba8()?
            .save(&path)
            .with_context(|| format!("write text dump '{}'", path.display()))?;
    }

    Ok(raster)
}

fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
