#![forbid(unsafe_code)]

pub mod blur;
pub mod compositor;
pub mod error;
pub mod font;
pub mod fx;
pub mod gaussian;
pub mod geometry;
pub mod layer;
pub mod model;
pub mod morph;
pub mod raster;
pub mod text;

pub use compositor::{RenderOptions, render_document};
pub use error::{CoverError, CoverResult};
pub use font::{FontdueSource, GlyphSource, Metrics};
pub use model::{Document, EffectSpec, Layer, Rgb, Rgba};
pub use raster::Raster;
