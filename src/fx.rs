use crate::{
    blur,
    error::{CoverError, CoverResult},
    model::{EffectSpec, Rgb},
    morph,
    raster::Raster,
};

const GLOW_DILATE_DEFAULT: u32 = 16;
const GLOW_BLUR_DEFAULT: u32 = 127;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    FlipUd,
    Blend { opacity: f64 },
    Glow { dilate_size: u32, blur_size: u32, color: Rgb },
}

/// Parse an effect invocation. Known kinds are validated strictly; an
/// unknown kind yields `Ok(None)` so the pipeline can warn and pass the
/// raster through.
pub fn parse_effect(spec: &EffectSpec) -> CoverResult<Option<Effect>> {
    let kind = spec.kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(CoverError::document("effect type must be non-empty"));
    }

    match kind.as_str() {
        "flip_ud" => Ok(Some(Effect::FlipUd)),
        "blend" => {
            let opacity = get_f64(&spec.params, "opacity")?;
            if !(0.0..=1.0).contains(&opacity) {
                return Err(CoverError::document(
                    "blend.opacity must be within [0, 1]",
                ));
            }
            Ok(Some(Effect::Blend { opacity }))
        }
        "glow" => {
            let dilate_size =
                get_u32_opt(&spec.params, &["dilate", "dilate_size"])?.unwrap_or(GLOW_DILATE_DEFAULT);
            if dilate_size == 0 {
                return Err(CoverError::geometry("glow.dilate must be > 0"));
            }
            let blur_size =
                get_u32_opt(&spec.params, &["blur", "blur_size"])?.unwrap_or(GLOW_BLUR_DEFAULT);
            if blur_size == 0 || blur_size % 2 == 0 {
                return Err(CoverError::geometry(format!(
                    "glow.blur must be odd and > 0, got {blur_size}"
                )));
            }
            let color = match spec.params.get("color") {
                Some(v) => serde_json::from_value::<Rgb>(v.clone())
                    .map_err(|_| CoverError::document("glow.color must be [r, g, b]"))?,
                None => Rgb::BLACK,
            };
            Ok(Some(Effect::Glow {
                dilate_size,
                blur_size,
                color,
            }))
        }
        _ => Ok(None),
    }
}

/// Apply the listed effects in order, each consuming the previous raster.
/// Unrecognized effect types are skipped with a warning.
pub fn apply_effects(mut raster: Raster, specs: &[EffectSpec]) -> CoverResult<Raster> {
    for spec in specs {
        raster = match parse_effect(spec)? {
            Some(Effect::FlipUd) => raster.flip_ud(),
            Some(Effect::Blend { opacity }) => {
                let transparent =
                    Raster::new(raster.width(), raster.height(), [255, 255, 255, 0]);
                Raster::blend(&transparent, &raster, opacity)?
            }
            Some(Effect::Glow {
                dilate_size,
                blur_size,
                color,
            }) => glow(&raster, dilate_size, blur_size, color)?,
            None => {
                tracing::warn!(kind = %spec.kind, "unrecognized effect type, passing layer through");
                raster
            }
        };
    }
    Ok(raster)
}

/// Halo built from the raster's silhouette: edge-detect, dilate, blur,
/// tint, then paste the original on top using its own alpha as the mask.
fn glow(src: &Raster, dilate_size: u32, blur_size: u32, color: Rgb) -> CoverResult<Raster> {
    let (w, h) = (src.width(), src.height());

    let plane = morph::intensity_plane(src);
    let edges = morph::edge_mask(&plane, w, h);
    let dilated = morph::dilate(&edges, w, h, dilate_size)?;
    let blurred = blur::blur_plane(&dilated, w, h, blur_size)?;

    let mut halo = Raster::new_transparent(w, h);
    for y in 0..h {
        for x in 0..w {
            let a = blurred[(y as usize) * (w as usize) + (x as usize)];
            halo.set_pixel(x, y, [color.0, color.1, color.2, a]);
        }
    }

    halo.paste_masked(src, 0, 0);
    Ok(halo)
}

fn get_f64(params: &serde_json::Value, key: &str) -> CoverResult<f64> {
    let Some(v) = params.get(key) else {
        return Err(CoverError::document(format!(
            "missing effect param '{key}'"
        )));
    };
    let Some(n) = v.as_f64() else {
        return Err(CoverError::document(format!(
            "effect param '{key}' must be a number"
        )));
    };
    if !n.is_finite() {
        return Err(CoverError::document(format!(
            "effect param '{key}' must be finite"
        )));
    }
    Ok(n)
}

fn get_u32_opt(params: &serde_json::Value, keys: &[&str]) -> CoverResult<Option<u32>> {
    for key in keys {
        let Some(v) = params.get(key) else {
            continue;
        };
        let Some(n) = v.as_u64() else {
            return Err(CoverError::document(format!(
                "effect param '{key}' must be a non-negative integer"
            )));
        };
        let n = u32::try_from(n).map_err(|_| {
            CoverError::document(format!("effect param '{key}' is out of range"))
        })?;
        return Ok(Some(n));
    }
    Ok(None)
}
