//! Board configuration.
//!
//! Every field has a default, so a host can deserialize a partial JSON object
//! and override only what it cares about.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::camera::Size;
use crate::consts::{
    DEFAULT_CARD_HEIGHT, DEFAULT_CARD_WIDTH, DRAG_THRESHOLD_PX, HARD_MIN_ZOOM, HEADER_HEIGHT, IMAGE_SLOT, MAX_ZOOM,
    PAN_MAX_DURATION_MS, PAN_MIN_DURATION_MS, PAN_SPEED_PX_PER_MS, WHEEL_SENSITIVITY, WORLD_HEIGHT, WORLD_WIDTH,
    ZOOM_DURATION_MS,
};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    pub world: Size,
    /// Zoom floor independent of viewport size.
    pub hard_min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom applied on construction, clamped into range.
    pub initial_zoom: f64,
    /// Wheel delta that changes zoom by a factor of two.
    pub wheel_sensitivity: f64,
    pub drag_threshold_px: f64,
    pub zoom_duration_ms: f64,
    pub pan_min_duration_ms: f64,
    pub pan_max_duration_ms: f64,
    pub pan_speed_px_per_ms: f64,
    pub card: CardDefaults,
}

/// Geometry applied to cards that do not specify it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardDefaults {
    pub width: f64,
    pub height: f64,
    pub header_height: f64,
    pub image_slot: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            world: Size::new(WORLD_WIDTH, WORLD_HEIGHT),
            hard_min_zoom: HARD_MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            initial_zoom: 1.0,
            wheel_sensitivity: WHEEL_SENSITIVITY,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            zoom_duration_ms: ZOOM_DURATION_MS,
            pan_min_duration_ms: PAN_MIN_DURATION_MS,
            pan_max_duration_ms: PAN_MAX_DURATION_MS,
            pan_speed_px_per_ms: PAN_SPEED_PX_PER_MS,
            card: CardDefaults::default(),
        }
    }
}

impl Default for CardDefaults {
    fn default() -> Self {
        Self {
            width: DEFAULT_CARD_WIDTH,
            height: DEFAULT_CARD_HEIGHT,
            header_height: HEADER_HEIGHT,
            image_slot: IMAGE_SLOT,
        }
    }
}

impl BoardConfig {
    /// Parse a config from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed JSON, or the first validation failure.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the controllers.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.world.width) || !is_positive(self.world.height) {
            return Err(ConfigError::InvalidWorld { width: self.world.width, height: self.world.height });
        }
        if !is_positive(self.hard_min_zoom) || !self.max_zoom.is_finite() || self.hard_min_zoom > self.max_zoom {
            return Err(ConfigError::InvalidZoomRange { min: self.hard_min_zoom, max: self.max_zoom });
        }
        positive("initialZoom", self.initial_zoom)?;
        positive("wheelSensitivity", self.wheel_sensitivity)?;
        positive("panSpeedPxPerMs", self.pan_speed_px_per_ms)?;
        positive("card.width", self.card.width)?;
        positive("card.height", self.card.height)?;
        non_negative("dragThresholdPx", self.drag_threshold_px)?;
        non_negative("zoomDurationMs", self.zoom_duration_ms)?;
        non_negative("panMinDurationMs", self.pan_min_duration_ms)?;
        non_negative("panMaxDurationMs", self.pan_max_duration_ms)?;
        non_negative("card.headerHeight", self.card.header_height)?;
        non_negative("card.imageSlot", self.card.image_slot)?;
        if self.pan_min_duration_ms > self.pan_max_duration_ms {
            return Err(ConfigError::InvalidPanRange { min: self.pan_min_duration_ms, max: self.pan_max_duration_ms });
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if is_positive(value) { Ok(()) } else { Err(ConfigError::NotPositive { name, value }) }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 { Ok(()) } else { Err(ConfigError::Negative { name, value }) }
}
