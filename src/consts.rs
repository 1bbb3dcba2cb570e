//! Shared numeric constants for the board crate.

// ── World & camera ──────────────────────────────────────────────

/// Default world width in world units.
pub const WORLD_WIDTH: f64 = 6000.0;

/// Default world height in world units.
pub const WORLD_HEIGHT: f64 = 6000.0;

/// Configured hard floor for zoom; the effective floor also depends on viewport size.
pub const HARD_MIN_ZOOM: f64 = 0.1;

/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 4.0;

/// Wheel delta that doubles (or halves) the zoom level.
pub const WHEEL_SENSITIVITY: f64 = 500.0;

// ── Gestures ────────────────────────────────────────────────────

/// Screen-space distance a pan candidate must travel before the camera moves.
pub const DRAG_THRESHOLD_PX: f64 = 4.0;

// ── Animation ───────────────────────────────────────────────────

/// Duration of an animated zoom change.
pub const ZOOM_DURATION_MS: f64 = 220.0;

/// Shortest animated pan.
pub const PAN_MIN_DURATION_MS: f64 = 120.0;

/// Longest animated pan.
pub const PAN_MAX_DURATION_MS: f64 = 450.0;

/// Screen pixels covered per millisecond when sizing a pan duration.
pub const PAN_SPEED_PX_PER_MS: f64 = 4.0;

// ── Cards ───────────────────────────────────────────────────────

/// Width applied to a new card that arrives without one.
pub const DEFAULT_CARD_WIDTH: f64 = 300.0;

/// Height applied to a new card that arrives without one.
pub const DEFAULT_CARD_HEIGHT: f64 = 150.0;

/// Height of the header strip drawn across the top of a card.
pub const HEADER_HEIGHT: f64 = 32.0;

/// Side of the square slot an image is fitted into.
pub const IMAGE_SLOT: f64 = 72.0;

/// Horizontal inset of the title inside the header.
pub const TITLE_PADDING: f64 = 10.0;

/// Title font size in world units.
pub const TITLE_FONT_SIZE: f64 = 14.0;

/// Stroke width drawn around the selected card.
pub const SELECTION_STROKE_WIDTH: f64 = 3.0;

/// Stroke color drawn around the selected card.
pub const SELECTION_STROKE: &str = "#2F80ED";

// ── Default colors ──────────────────────────────────────────────

pub const DEFAULT_STYLE_KEY: &str = "classic";
pub const DEFAULT_STROKE: &str = "#1F1A17";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;
pub const DEFAULT_BODY_FILL: &str = "#FFFDF7";
pub const DEFAULT_HEADER_FILL: &str = "#F3D36B";
pub const DEFAULT_WORLD_FILL: &str = "#EDE6DA";
pub const DEFAULT_GRID_COLOR: &str = "#D6CCBC";
pub const DEFAULT_GRID_SPACING: f64 = 40.0;
pub const DEFAULT_SHADOW_COLOR: &str = "#000000";
pub const DEFAULT_SHADOW_BLUR: f64 = 8.0;
pub const DEFAULT_SHADOW_OFFSET_Y: f64 = 2.0;
pub const DEFAULT_SHADOW_OPACITY: f64 = 0.2;
