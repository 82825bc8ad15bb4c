use std::path::PathBuf;

use crate::error::{CoverError, CoverResult};

/// A cover document: a canvas plus an ordered stack of layers, composited
/// bottom to top.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub resources_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    #[serde(default = "Rgb::white")]
    pub background: Rgb,
    pub layers: Vec<Layer>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    Image(ImageLayer),
    Gaussian(GaussianLayer),
    Text(TextLayer),
}

impl Layer {
    pub fn placement(&self) -> &Placement {
        match self {
            Layer::Image(l) => &l.placement,
            Layer::Gaussian(l) => &l.placement,
            Layer::Text(l) => &l.placement,
        }
    }
}

/// Fields common to every layer kind. `x`/`y` position the layer's content
/// region (raster minus borders) on the canvas; absent means centered.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    #[serde(default)]
    pub border_x: u32,
    #[serde(default)]
    pub border_y: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectSpec>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageLayer {
    pub filename: String,
    #[serde(flatten)]
    pub placement: Placement,
}

/// Procedural radial-falloff blot. `center_*` and `sigma_*` default to
/// half and 0.75x the corresponding dimension.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GaussianLayer {
    pub width: u32,
    pub height: u32,
    pub amplitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma_y: Option<f64>,
    #[serde(default = "default_true")]
    pub transparent: bool,
    #[serde(flatten)]
    pub placement: Placement,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextLayer {
    /// Font file path, resolved against `Document.resources_dir`.
    pub font: String,
    pub size: f32,
    pub text: String,
    #[serde(default = "Rgba::opaque_black")]
    pub color: Rgba,
    /// Extra pixels between consecutive glyphs; negative overlaps.
    #[serde(default)]
    pub kern_add: i32,
    #[serde(flatten)]
    pub placement: Placement,
}

/// An effect invocation by name. Unknown kinds survive decode so the
/// pipeline can warn and pass the raster through instead of failing.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EffectSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: serde_json::Value,
}

/// Straight-alpha color, serialized as `[r, g, b, a]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const BLACK: Rgba = Rgba(0, 0, 0, 255);

    fn opaque_black() -> Rgba {
        Rgba::BLACK
    }
}

/// Opaque color, serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    fn white() -> Rgb {
        Rgb::WHITE
    }
}

fn default_true() -> bool {
    true
}

impl Document {
    /// Cheap structural checks, run before any raster work begins.
    pub fn validate(&self) -> CoverResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoverError::geometry("canvas width/height must be > 0"));
        }

        for (idx, layer) in self.layers.iter().enumerate() {
            match layer {
                Layer::Image(l) => {
                    if l.filename.is_empty() {
                        return Err(CoverError::document(format!(
                            "layer {idx}: image filename must be non-empty"
                        )));
                    }
                }
                Layer::Gaussian(l) => {
                    if l.width == 0 || l.height == 0 {
                        return Err(CoverError::geometry(format!(
                            "layer {idx}: gaussian width/height must be > 0"
                        )));
                    }
                    if !l.amplitude.is_finite() {
                        return Err(CoverError::document(format!(
                            "layer {idx}: gaussian amplitude must be finite"
                        )));
                    }
                }
                Layer::Text(l) => {
                    if l.font.is_empty() {
                        return Err(CoverError::document(format!(
                            "layer {idx}: text font must be non-empty"
                        )));
                    }
                    if l.text.is_empty() {
                        return Err(CoverError::document(format!(
                            "layer {idx}: text must be non-empty"
                        )));
                    }
                    if !l.size.is_finite() || l.size <= 0.0 {
                        return Err(CoverError::geometry(format!(
                            "layer {idx}: text size must be > 0"
                        )));
                    }
                }
            }

            for spec in &layer.placement().effects {
                crate::fx::parse_effect(spec)
                    .map_err(|e| CoverError::document(format!("layer {idx}: {e}")))?;
            }
        }

        Ok(())
    }
}
