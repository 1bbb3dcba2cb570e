//! Global style updates. Every field is optional; `None` leaves the current
//! value in place.

use serde::{Deserialize, Serialize};

/// World background rectangle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldStyle {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridStyle {
    pub spacing: Option<f64>,
    pub color: Option<String>,
    pub line_width: Option<f64>,
    pub opacity: Option<f64>,
}

/// Drop shadow shared by every card body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardShadowStyle {
    pub color: Option<String>,
    pub blur: Option<f64>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub opacity: Option<f64>,
}
