//! Map layers and their display parameters.

use litterscope_core::Image;
use serde::{Deserialize, Serialize};

/// How a layer is stretched and colored.
///
/// Multi-band layers list their `bands` (red, green, blue order) and are
/// stretched between `min` and `max` per band. Single-band layers use a
/// `palette` of CSS colors spread between `min` and `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<String>,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<String>,
}

impl VisParams {
    pub fn rgb(bands: Vec<String>, min: f64, max: f64) -> Self {
        Self {
            bands,
            min,
            max,
            palette: Vec::new(),
        }
    }

    pub fn palette(palette: Vec<String>, min: f64, max: f64) -> Self {
        Self {
            bands: Vec::new(),
            min,
            max,
            palette,
        }
    }
}

/// A labelled image with display parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub label: String,
    pub image: Image,
    pub vis: VisParams,
    pub shown: bool,
}

impl Layer {
    pub fn new(label: impl Into<String>, image: Image, vis: VisParams) -> Self {
        Self {
            label: label.into(),
            image,
            vis,
            shown: true,
        }
    }
}
